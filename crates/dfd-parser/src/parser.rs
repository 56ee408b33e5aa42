//! Parser: source lines to statements.
//!
//! Each line is desugared if needed, then dispatched on its first token
//! through the closed keyword table. Items whose name carries a `:` external
//! reference contribute a [`Dependency`] record; `attrib` statements are
//! additionally collected into the alias table consumed by the code
//! generator.

use indexmap::IndexMap;
use log::{debug, trace};

use dfd_core::error::{Diagnostic, ErrorKind};
use dfd_core::identifier::Name;
use dfd_core::model::{
    Attrib, Connection, ConnectionKind, Dependency, Endpoint, FilterMode, Frame,
    FRAME_DEFAULT_ATTRS, ITEM_EXTERNAL_ATTRS, Item, ItemKind, SNIPPET_PREFIX, Statement, Style,
};
use dfd_core::source::{LineId, SourceMap};

use crate::filter_spec;
use crate::sugar;

/// Alias table: attrib name to its definition, in declaration order.
pub type Attribs = IndexMap<String, Attrib>;

/// A recognized statement keyword, with connection modifiers resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Style,
    Attrib,
    Frame,
    Only,
    Without,
    Item(ItemKind),
    Connection {
        kind: ConnectionKind,
        reversed: bool,
        relaxed: bool,
    },
}

/// The closed keyword table. Every recognized keyword, including every
/// modifier combination, maps to exactly one entry; anything else is a
/// syntax error at the dispatch site.
fn lookup(word: &str) -> Option<Keyword> {
    use ConnectionKind::*;

    let connection = |kind, reversed, relaxed| Keyword::Connection {
        kind,
        reversed,
        relaxed,
    };

    Some(match word {
        "style" => Keyword::Style,
        "attrib" => Keyword::Attrib,
        "frame" => Keyword::Frame,
        "!" => Keyword::Only,
        "~" => Keyword::Without,

        "process" => Keyword::Item(ItemKind::Process),
        "control" => Keyword::Item(ItemKind::Control),
        "entity" => Keyword::Item(ItemKind::Entity),
        "store" => Keyword::Item(ItemKind::Store),
        "channel" => Keyword::Item(ItemKind::Channel),
        "none" => Keyword::Item(ItemKind::None),

        "flow" => connection(Flow, false, false),
        "flow.r" => connection(Flow, true, false),
        "flow?" => connection(Flow, false, true),
        "flow.r?" => connection(Flow, true, true),
        "bflow" => connection(Bflow, false, false),
        "bflow?" => connection(Bflow, false, true),
        "cflow" => connection(Cflow, false, false),
        "cflow.r" => connection(Cflow, true, false),
        "cflow?" => connection(Cflow, false, true),
        "cflow.r?" => connection(Cflow, true, true),
        "uflow" => connection(Uflow, false, false),
        "uflow?" => connection(Uflow, false, true),
        "signal" => connection(Signal, false, false),
        "signal.r" => connection(Signal, true, false),
        "signal?" => connection(Signal, false, true),
        "signal.r?" => connection(Signal, true, true),
        "constraint" => connection(Constraint, false, false),
        "constraint.r" => connection(Constraint, true, false),

        _ => return None,
    })
}

/// Parse the scanned source lines into statements, dependencies, and the
/// attrib-alias table.
pub fn parse(
    map: &mut SourceMap,
    lines: &[LineId],
) -> Result<(Vec<Statement>, Vec<Dependency>, Attribs), Diagnostic> {
    let mut statements: Vec<Statement> = Vec::new();
    let mut dependencies: Vec<Dependency> = Vec::new();
    let mut attribs: Attribs = IndexMap::new();

    for &line_id in lines {
        let text = map.get(line_id).text.trim().to_string();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        // syntactic sugars may rewrite the line
        let text = normalize_filter_sigil(&text);
        let text = sugar::apply_syntactic_sugars(&text).unwrap_or(text);
        map.set_text(line_id, text.clone());

        let Some(word) = text.split_whitespace().next() else {
            continue;
        };
        let Some(keyword) = lookup(word) else {
            return Err(Diagnostic::new(
                ErrorKind::Syntax,
                format!("Unrecognized keyword \"{word}\""),
            )
            .with_source(map, line_id));
        };
        trace!(keyword:? = word, line:% = line_id; "Dispatching statement");

        let mut statement = match keyword {
            Keyword::Style => parse_style(map, line_id, &text)?,
            Keyword::Attrib => parse_attrib(map, line_id, &text)?,
            Keyword::Item(kind) => parse_item(map, line_id, kind, &text)?,
            Keyword::Connection {
                kind,
                reversed,
                relaxed,
            } => parse_connection(map, line_id, kind, reversed, relaxed, &text)?,
            Keyword::Frame => parse_frame(line_id, &text),
            Keyword::Only => filter_spec::parse_filter(map, line_id, FilterMode::Only, &text)?,
            Keyword::Without => {
                filter_spec::parse_filter(map, line_id, FilterMode::Without, &text)?
            }
        };

        if let Statement::Item(item) = &mut statement {
            parse_item_external(item, &mut dependencies);
            if item.label.is_empty() {
                item.label = item.name.resolve();
            }
        }

        parse_drawable_attrs(&mut statement);

        if let Statement::Attrib(attrib) = &statement {
            attribs.insert(attrib.alias.clone(), attrib.clone());
        }

        statements.push(statement);
    }

    debug!(
        statements = statements.len(),
        dependencies = dependencies.len();
        "Parsed source lines"
    );
    Ok((statements, dependencies, attribs))
}

/// Split on whitespace runs like Python's `str.split(maxsplit=n)`: at most
/// `maxsplit` splits, the final element keeping the remainder of the line.
pub(crate) fn split_limit(text: &str, maxsplit: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut rest = text.trim_start();
    while parts.len() < maxsplit && !rest.is_empty() {
        match rest.find(char::is_whitespace) {
            Some(pos) => {
                parts.push(rest[..pos].to_string());
                rest = rest[pos..].trim_start();
            }
            None => {
                parts.push(rest.to_string());
                rest = "";
            }
        }
    }
    if !rest.is_empty() {
        parts.push(rest.trim_end().to_string());
    }
    parts
}

/// Split a statement line into its `n` arguments after the keyword, the last
/// one optionally defaulting to empty.
fn split_args(
    map: &SourceMap,
    source: LineId,
    text: &str,
    n: usize,
    last_is_optional: bool,
) -> Result<Vec<String>, Diagnostic> {
    let mut terms = split_limit(text, n);
    if terms.len() == n && last_is_optional {
        terms.push(String::new());
    }
    if terms.len() != n + 1 {
        let message = if last_is_optional {
            format!("Expected {} or {} argument", n - 1, n)
        } else {
            format!("Expected {n} argument(s)")
        };
        return Err(Diagnostic::new(ErrorKind::Syntax, message).with_source(map, source));
    }
    terms.remove(0);
    Ok(terms)
}

/// A filter sigil with its first argument attached (`!foo`) gets a
/// separating space inserted.
fn normalize_filter_sigil(line: &str) -> String {
    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (Some(sigil @ ('!' | '~')), Some(next)) if !next.is_whitespace() => {
            format!("{sigil} {}", &line[sigil.len_utf8()..])
        }
        _ => line.to_string(),
    }
}

/// Strip a `?` suffix marking the item as hidable.
fn parse_item_name(name: &str) -> (&str, bool) {
    match name.strip_suffix('?') {
        Some(stripped) => (stripped, true),
        None => (name, false),
    }
}

fn parse_style(map: &SourceMap, source: LineId, text: &str) -> Result<Statement, Diagnostic> {
    let mut args = split_args(map, source, text, 2, true)?;
    let value = args.pop().unwrap_or_default();
    let name = args.pop().unwrap_or_default();
    Ok(Statement::Style(Style {
        source,
        name,
        value,
    }))
}

fn parse_attrib(map: &SourceMap, source: LineId, text: &str) -> Result<Statement, Diagnostic> {
    let mut args = split_args(map, source, text, 2, true)?;
    let text_value = args.pop().unwrap_or_default();
    let alias = args.pop().unwrap_or_default();
    Ok(Statement::Attrib(Attrib {
        source,
        alias,
        text: text_value,
    }))
}

fn parse_item(
    map: &SourceMap,
    source: LineId,
    kind: ItemKind,
    text: &str,
) -> Result<Statement, Diagnostic> {
    let args = split_args(map, source, text, 2, true)?;
    let (name, hidable) = parse_item_name(&args[0]);
    Ok(Statement::Item(Item {
        source,
        kind,
        name: Name::new(name),
        label: args[1].clone(),
        attrs: String::new(),
        hidable,
    }))
}

fn parse_connection(
    map: &SourceMap,
    source: LineId,
    kind: ConnectionKind,
    reversed: bool,
    relaxed: bool,
    text: &str,
) -> Result<Statement, Diagnostic> {
    let args = split_args(map, source, text, 3, true)?;
    Ok(Statement::Connection(Connection {
        source,
        kind,
        src: Endpoint::parse(&args[0]),
        dst: Endpoint::parse(&args[1]),
        label: args[2].clone(),
        attrs: String::new(),
        reversed,
        relaxed,
    }))
}

fn parse_frame(source: LineId, text: &str) -> Statement {
    let (head, label) = match text.split_once('=') {
        Some((head, label)) => (head, label.trim().to_string()),
        None => (text, String::new()),
    };
    let members = head.split_whitespace().skip(1).map(Name::new).collect();
    Statement::Frame(Frame {
        source,
        label,
        attrs: FRAME_DEFAULT_ATTRS.to_string(),
        members,
    })
}

/// Split a leading `[attrs]` prefix off a drawable's label; an item whose
/// label becomes empty falls back to its own name.
fn parse_drawable_attrs(statement: &mut Statement) {
    let (label, attrs) = match statement {
        Statement::Item(item) => (&mut item.label, &mut item.attrs),
        Statement::Connection(conn) => (&mut conn.label, &mut conn.attrs),
        Statement::Frame(frame) => (&mut frame.label, &mut frame.attrs),
        _ => return,
    };
    if let Some(rest) = label.strip_prefix('[') {
        if let Some((bracket, remainder)) = rest.split_once(']') {
            *attrs = bracket.to_string();
            *label = remainder.trim().to_string();
        }
    }
    if let Statement::Item(item) = statement {
        if item.label.is_empty() {
            item.label = item.name.resolve();
        }
    }
}

/// Resolve an external-reference item name (`GRAPH:ITEM` or `GRAPH:`),
/// recording a dependency and restyling the item as external.
fn parse_item_external(item: &mut Item, dependencies: &mut Vec<Dependency>) {
    let full = item.name.resolve();
    let Some((graph, rest)) = full.split_once(':') else {
        return;
    };

    item.attrs = ITEM_EXTERNAL_ATTRS.to_string();

    // trailing-colon shorthand: fall back to the graph segment as the name
    let raw_name = if !rest.is_empty() { rest } else { graph };
    let name = match raw_name.strip_prefix(SNIPPET_PREFIX) {
        Some(stripped) => stripped.to_string(),
        None => strip_extension(raw_name),
    };

    item.name = Name::new(&name);
    if item.label.is_empty() {
        item.label = name;
    }

    dependencies.push(Dependency {
        to_graph: graph.to_string(),
        to_item: if rest.is_empty() {
            None
        } else {
            Some(rest.to_string())
        },
        to_kind: item.kind,
        source: item.source,
    });
}

/// Drop the extension of a path-like name, leaving directories untouched.
fn strip_extension(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !stem.ends_with('/') && !ext.contains('/') => {
            stem.to_string()
        }
        _ => name.to_string(),
    }
}
