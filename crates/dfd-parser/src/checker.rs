//! Checker: structural validation of the parsed statement list.
//!
//! Validates item-name uniqueness, connection endpoints and the
//! control/signal rule, and frame membership, and returns the name→item
//! table used by the filter engine and code generator.

use indexmap::IndexMap;
use log::debug;
use std::collections::HashSet;

use dfd_core::error::{Diagnostic, ErrorKind};
use dfd_core::identifier::Name;
use dfd_core::model::{ConnectionKind, Item, ItemKind, Statement};
use dfd_core::source::{SourceMap, pack};

/// Validate all statements: no duplicate items, valid connection endpoints,
/// valid frames. Returns the items keyed by name, in declaration order.
pub fn check(
    map: &SourceMap,
    statements: &[Statement],
) -> Result<IndexMap<Name, Item>, Diagnostic> {
    let items_by_name = check_items(map, statements)?;
    check_connections(map, statements, &items_by_name)?;
    check_frames(map, statements, &items_by_name)?;
    debug!(items = items_by_name.len(); "Checked statements");
    Ok(items_by_name)
}

/// Collect items and reject duplicates.
fn check_items(
    map: &SourceMap,
    statements: &[Statement],
) -> Result<IndexMap<Name, Item>, Diagnostic> {
    let mut items_by_name: IndexMap<Name, Item> = IndexMap::new();
    for statement in statements {
        let Statement::Item(item) = statement else {
            continue;
        };

        let Some(other) = items_by_name.get(&item.name) else {
            items_by_name.insert(item.name, item.clone());
            continue;
        };

        let other_text = pack(&map.get(other.source).text);
        return Err(Diagnostic::new(
            ErrorKind::Semantic,
            format!(
                "Name \"{}\" already exists at line {}: {}",
                item.name,
                map.display_line_number(other.source),
                other_text
            ),
        )
        .with_source(map, item.source));
    }
    Ok(items_by_name)
}

/// Validate connection endpoints and type constraints.
fn check_connections(
    map: &SourceMap,
    statements: &[Statement],
    items_by_name: &IndexMap<Name, Item>,
) -> Result<(), Diagnostic> {
    for statement in statements {
        let Statement::Connection(conn) = statement else {
            continue;
        };

        let mut nb_stars = 0;
        for endpoint in [conn.src, conn.dst] {
            let Some(name) = endpoint.name() else {
                nb_stars += 1;
                continue;
            };
            let Some(item) = items_by_name.get(&name) else {
                return Err(Diagnostic::new(
                    ErrorKind::Semantic,
                    format!(
                        "Connection \"{}\" connects to \"{}\", which is not defined",
                        conn.kind, name
                    ),
                )
                .with_source(map, conn.source));
            };
            if item.kind == ItemKind::Control && conn.kind != ConnectionKind::Signal {
                return Err(Diagnostic::new(
                    ErrorKind::Semantic,
                    format!(
                        "Connection to {} \"{}\" is of type \"{}\", however only \
                         connections of type \"{}\" are allowed",
                        ItemKind::Control,
                        name,
                        conn.kind,
                        ConnectionKind::Signal
                    ),
                )
                .with_source(map, conn.source));
            }
        }

        if nb_stars == 2 {
            return Err(Diagnostic::new(
                ErrorKind::Semantic,
                format!(
                    "Connection \"{}\" may not connect two anonymous endpoints",
                    conn.kind
                ),
            )
            .with_source(map, conn.source));
        }
    }
    Ok(())
}

/// Validate frame membership: members must exist and belong to one frame
/// only.
fn check_frames(
    map: &SourceMap,
    statements: &[Statement],
    items_by_name: &IndexMap<Name, Item>,
) -> Result<(), Diagnostic> {
    let mut framed_items: HashSet<Name> = HashSet::new();
    for statement in statements {
        let Statement::Frame(frame) = statement else {
            continue;
        };

        if frame.members.is_empty() {
            return Err(Diagnostic::new(ErrorKind::Semantic, "Frame is empty")
                .with_source(map, frame.source));
        }
        for &name in &frame.members {
            if !items_by_name.contains_key(&name) {
                return Err(Diagnostic::new(
                    ErrorKind::Semantic,
                    format!("Frame includes \"{name}\", which is not defined"),
                )
                .with_source(map, frame.source));
            }
            if !framed_items.insert(name) {
                return Err(Diagnostic::new(
                    ErrorKind::Semantic,
                    format!("Item \"{name}\" is in multiple frames"),
                )
                .with_source(map, frame.source));
            }
        }
    }
    Ok(())
}
