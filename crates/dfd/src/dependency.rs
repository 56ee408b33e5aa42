//! Cross-graph dependency checker.
//!
//! Each external reference (`GRAPH:ITEM` or `GRAPH:`) recorded by the parser
//! is resolved here: the referred graph's text is loaded (snippet or file),
//! scanned and parsed, and the referred item looked up and compared against
//! the declared kind. Resolution goes one level deep only: referred graphs
//! are not dependency-checked in turn.
//!
//! All failures are accumulated and raised as one aggregated error, so a
//! single report surfaces every broken reference.

use std::fs;
use std::io;

use log::debug;

use dfd_core::error::{Diagnostic, DiagnosticCollector, DfdError, ErrorKind};
use dfd_core::model::{Dependency, Item, ItemKind, SNIPPET_PREFIX, SnippetMap, Statement};
use dfd_core::source::SourceMap;
use dfd_parser::{parser, scanner};

/// Verify that all dependencies refer to existing items of compatible type.
pub fn check(
    map: &mut SourceMap,
    dependencies: &[Dependency],
    snippets: Option<&SnippetMap>,
) -> Result<(), DfdError> {
    let mut errors = DiagnosticCollector::with_header("Dependency error(s) found:");

    for dep in dependencies {
        debug!(graph = dep.to_graph, item:? = dep.to_item; "Checking dependency");

        // load the referred graph's source text
        let resolved = if let Some(name) = dep.to_graph.strip_prefix(SNIPPET_PREFIX) {
            match snippets.and_then(|m| m.get(name)) {
                Some(snippet) => Some((snippet.text.clone(), "snippet", name.to_string())),
                None => {
                    errors.emit(
                        Diagnostic::new(
                            ErrorKind::Dependency,
                            format!("Referring to unknown snippet \"{name}\""),
                        )
                        .with_source(map, dep.source),
                    );
                    None
                }
            }
        } else {
            let name = &dep.to_graph;
            match fs::read_to_string(name) {
                Ok(text) => Some((text, "file", name.clone())),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    let known_snippet = snippets.is_some_and(|m| m.contains_key(name.as_str()));
                    let message = if known_snippet {
                        format!(
                            "File \"{name}\" not found. Did you mean \"{SNIPPET_PREFIX}{name}\" ?"
                        )
                    } else {
                        format!("File \"{name}\" not found")
                    };
                    errors.emit(
                        Diagnostic::new(ErrorKind::Dependency, message)
                            .with_source(map, dep.source),
                    );
                    None
                }
                Err(err) => return Err(err.into()),
            }
        };
        let Some((text, what, name)) = resolved else {
            continue;
        };

        // whole-graph reference: only check that the item kind is "none"
        let Some(to_item) = &dep.to_item else {
            if dep.to_kind != ItemKind::None {
                errors.emit(
                    Diagnostic::new(
                        ErrorKind::Dependency,
                        format!(
                            "A whole graph may only be referred to by an item of type \
                             \"{}\", and not \"{}\"",
                            ItemKind::None,
                            dep.to_kind
                        ),
                    )
                    .with_source(map, dep.source),
                );
            }
            continue;
        };

        // scan and parse the referred graph to look up the item
        let lines = scanner::scan(map, Some(dep.source), &text, snippets)?;
        let (statements, _, _) = parser::parse(map, &lines).map_err(DfdError::from)?;

        // verify the referred item exists and has the expected kind
        match find_item(to_item, &statements) {
            Some(item) => {
                if item.kind != dep.to_kind {
                    errors.emit(
                        Diagnostic::new(
                            ErrorKind::Dependency,
                            format!(
                                "Referred item \"{to_item}\" is of type \"{}\", \
                                 but is referred to as type \"{}\"",
                                item.kind, dep.to_kind
                            ),
                        )
                        .with_source(map, dep.source),
                    );
                }
            }
            None => {
                errors.emit(
                    Diagnostic::new(
                        ErrorKind::Dependency,
                        format!(
                            "Referring to unknown item name \"{to_item}\" of {what} \"{name}\""
                        ),
                    )
                    .with_source(map, dep.source),
                );
            }
        }
    }

    // raise all accumulated errors at once
    errors.finish().map_err(DfdError::from)
}

fn find_item<'a>(name: &str, statements: &'a [Statement]) -> Option<&'a Item> {
    statements.iter().find_map(|statement| match statement {
        Statement::Item(item) if item.name == name => Some(item),
        _ => None,
    })
}
