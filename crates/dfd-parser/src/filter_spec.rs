//! Filter statement parsing: neighbor specs, replacers, name lists.
//!
//! A filter line starts with `!` (only) or `~` (without). The tokens that
//! follow are consumed left-to-right while they match the neighbor-spec
//! grammar
//!
//! ```text
//! (<> | < | > | [ | ]) (x|f)* (digits | *)
//! ```
//!
//! or the replacer grammar `=NAME` (without filters only); the first token
//! matching neither starts the name list, which must be non-empty.
//!
//! `<` selects downstream neighbours, `>` upstream, `<>` both; `[` and `]`
//! are the layout-direction variants of `<` and `>`. Flags: `x` excludes the
//! anchors, `f` suppresses frames. A `*` distance is unbounded.

use winnow::Parser;
use winnow::ascii::digit1;
use winnow::combinator::alt;
use winnow::error::{ContextError, ErrMode};
use winnow::token::take_while;

use dfd_core::error::{Diagnostic, ErrorKind};
use dfd_core::identifier::Name;
use dfd_core::model::{Filter, FilterMode, NeighborSpec, Statement};
use dfd_core::source::{LineId, SourceMap};

type TokenResult<O> = Result<O, ErrMode<ContextError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpecDirection {
    Both,
    Down,
    Up,
}

#[derive(Debug, Clone, Copy)]
struct ParsedSpec {
    direction: SpecDirection,
    layout_dir: bool,
    no_anchors: bool,
    no_frames: bool,
    distance: i32,
}

fn spec(input: &mut &str) -> TokenResult<ParsedSpec> {
    let (direction, layout_dir) = alt((
        "<>".value((SpecDirection::Both, false)),
        "<".value((SpecDirection::Down, false)),
        ">".value((SpecDirection::Up, false)),
        "[".value((SpecDirection::Down, true)),
        "]".value((SpecDirection::Up, true)),
    ))
    .parse_next(input)?;

    let flags: &str = take_while(0.., ('x', 'f')).parse_next(input)?;

    let distance = alt(("*".value(-1i32), digit1.try_map(str::parse::<i32>))).parse_next(input)?;

    Ok(ParsedSpec {
        direction,
        layout_dir,
        no_anchors: flags.contains('x'),
        no_frames: flags.contains('f'),
        distance,
    })
}

/// Parse one token as a neighbor spec; `None` when it is not one.
fn neighbor_spec(token: &str) -> Option<ParsedSpec> {
    spec.parse(token).ok()
}

/// Parse one token as a replacer (`=NAME`); `None` when it is not one.
fn replacer(token: &str) -> Option<&str> {
    match token.strip_prefix('=') {
        Some(name) if !name.is_empty() => Some(name),
        _ => None,
    }
}

fn apply_spec(up: &mut NeighborSpec, down: &mut NeighborSpec, parsed: &ParsedSpec) {
    let assign = |spec: &mut NeighborSpec| {
        spec.distance = parsed.distance;
        spec.layout_dir = parsed.layout_dir;
        spec.no_anchors = parsed.no_anchors;
        spec.no_frames = parsed.no_frames;
    };
    match parsed.direction {
        SpecDirection::Both => {
            assign(up);
            assign(down);
        }
        SpecDirection::Down => assign(down),
        SpecDirection::Up => assign(up),
    }
}

/// Parse a whole filter line (`text` starts with the sigil token).
pub(crate) fn parse_filter(
    map: &SourceMap,
    source: LineId,
    mode: FilterMode,
    text: &str,
) -> Result<Statement, Diagnostic> {
    let tokens: Vec<&str> = text.split_whitespace().collect();

    let mut up = NeighborSpec::default();
    let mut down = NeighborSpec::default();
    let mut replaced_by = None;

    let mut index = 1; // tokens[0] is the sigil
    while index < tokens.len() {
        let token = tokens[index];
        if let Some(parsed) = neighbor_spec(token) {
            apply_spec(&mut up, &mut down, &parsed);
        } else if let Some(name) = replacer(token) {
            if mode == FilterMode::Only {
                return Err(Diagnostic::new(
                    ErrorKind::Filter,
                    format!("A replacer \"{token}\" is only allowed on a \"~\" (without) filter"),
                )
                .with_source(map, source));
            }
            replaced_by = Some(Name::new(name));
        } else {
            break;
        }
        index += 1;
    }

    let names: Vec<Name> = tokens[index..].iter().map(|t| Name::new(t)).collect();
    if names.is_empty() {
        return Err(
            Diagnostic::new(ErrorKind::Filter, "Filter requires at least one item name")
                .with_source(map, source),
        );
    }

    Ok(Statement::Filter(Filter {
        source,
        mode,
        names,
        neighbors_up: up,
        neighbors_down: down,
        replaced_by,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(text: &str, mode: FilterMode) -> Result<Filter, Diagnostic> {
        let mut map = SourceMap::new();
        let root = map.root("<test>");
        let line = map.line(text, root, 0);
        match parse_filter(&map, line, mode, text)? {
            Statement::Filter(f) => Ok(f),
            _ => unreachable!("parse_filter returns a filter"),
        }
    }

    #[test]
    fn test_plain_names() {
        let f = filter("! A B", FilterMode::Only).unwrap();
        assert_eq!(f.names.len(), 2);
        assert_eq!(f.neighbors_up.distance, 0);
        assert_eq!(f.neighbors_down.distance, 0);
        assert!(f.replaced_by.is_none());
    }

    #[test]
    fn test_downstream_spec() {
        let f = filter("! <2 A", FilterMode::Only).unwrap();
        assert_eq!(f.neighbors_down.distance, 2);
        assert_eq!(f.neighbors_up.distance, 0);
        assert!(!f.neighbors_down.layout_dir);
    }

    #[test]
    fn test_upstream_unbounded_with_flags() {
        let f = filter("~ >xf* A", FilterMode::Without).unwrap();
        assert_eq!(f.neighbors_up.distance, -1);
        assert!(f.neighbors_up.no_anchors);
        assert!(f.neighbors_up.no_frames);
        assert_eq!(f.neighbors_down.distance, 0);
    }

    #[test]
    fn test_both_directions() {
        let f = filter("! <>3 A", FilterMode::Only).unwrap();
        assert_eq!(f.neighbors_down.distance, 3);
        assert_eq!(f.neighbors_up.distance, 3);
    }

    #[test]
    fn test_layout_direction_brackets() {
        let f = filter("! [1 ]2 A", FilterMode::Only).unwrap();
        assert_eq!(f.neighbors_down.distance, 1);
        assert!(f.neighbors_down.layout_dir);
        assert_eq!(f.neighbors_up.distance, 2);
        assert!(f.neighbors_up.layout_dir);
    }

    #[test]
    fn test_replacer_on_without() {
        let f = filter("~ =R A B", FilterMode::Without).unwrap();
        assert_eq!(f.replaced_by.map(|n| n.resolve()), Some("R".to_string()));
        assert_eq!(f.names.len(), 2);
    }

    #[test]
    fn test_replacer_on_only_rejected() {
        let err = filter("! =R A", FilterMode::Only).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Filter);
        assert!(err.message().contains("only allowed"));
    }

    #[test]
    fn test_names_required() {
        let err = filter("! <2", FilterMode::Only).unwrap_err();
        assert!(err.message().contains("at least one item name"));
    }

    #[test]
    fn test_spec_must_consume_whole_token() {
        // "<2x" has trailing flags after the distance: not a spec, so it
        // becomes a (bogus) name.
        let f = filter("! <2x A", FilterMode::Only).unwrap();
        assert_eq!(f.names.first().map(|n| n.resolve()), Some("<2x".to_string()));
        assert_eq!(f.neighbors_down.distance, 0);
    }
}
