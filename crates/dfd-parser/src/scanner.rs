//! Scanner: source text to provenance-tracked source lines.
//!
//! The scanner joins backslash-continued lines, skips blank lines, and
//! resolves `#include TARGET` directives recursively. A target starting with
//! `#` names a snippet of the host markdown document; anything else is a
//! file path. A per-scan set of already-included targets turns include
//! cycles into errors instead of infinite loops.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use log::{debug, trace};
use regex::Regex;

use dfd_core::error::{Diagnostic, DfdError, ErrorKind};
use dfd_core::model::{INCLUDE_DIRECTIVE, SNIPPET_PREFIX, SnippetMap};
use dfd_core::source::{LineId, SourceMap};

use crate::parser::split_limit;

// Joins lines like:
//   abc\
//   def
// into:
//   abcdef
static RX_LINE_CONT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\\s*\n\s*").expect("line-continuation pattern is valid"));

/// Scan `input` into source lines appended to `map`.
///
/// `provenance` is the synthetic root to attach lines to; when `None` a
/// fresh `<input>` root is created. `snippets` is the snippet table of the
/// host markdown document, if any.
///
/// # Errors
///
/// Returns a build error for unresolvable or recursive includes; file read
/// failures other than non-existence propagate as I/O errors.
pub fn scan(
    map: &mut SourceMap,
    provenance: Option<LineId>,
    input: &str,
    snippets: Option<&SnippetMap>,
) -> Result<Vec<LineId>, DfdError> {
    let mut output = Vec::new();
    let mut includes: HashSet<String> = HashSet::new();

    // stitch continuation lines (trailing backslash)
    let input = RX_LINE_CONT.replace_all(input, "").into_owned();

    let parent = match provenance {
        Some(id) => id,
        None => map.root("<input>"),
    };
    scan_fragment(map, &input, parent, &mut output, snippets, &mut includes)?;

    debug!(lines = output.len(); "Scanned source");
    Ok(output)
}

/// Process each non-blank line: dispatch includes, collect the rest.
fn scan_fragment(
    map: &mut SourceMap,
    input: &str,
    parent: LineId,
    output: &mut Vec<LineId>,
    snippets: Option<&SnippetMap>,
    includes: &mut HashSet<String>,
) -> Result<(), DfdError> {
    for (nr, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let pair = split_limit(line, 1);
        let line_id = map.line(line, parent, nr);
        if pair.len() == 2 && pair[0] == INCLUDE_DIRECTIVE {
            include(map, &pair[1], line_id, output, snippets, includes)?;
        } else {
            output.push(line_id);
        }
    }
    Ok(())
}

/// Resolve one include target and scan its text in place of the directive.
fn include(
    map: &mut SourceMap,
    target: &str,
    parent: LineId,
    output: &mut Vec<LineId>,
    snippets: Option<&SnippetMap>,
    includes: &mut HashSet<String>,
) -> Result<(), DfdError> {
    // guard against recursion (exact target string equality)
    if !includes.insert(target.to_string()) {
        return Err(Diagnostic::new(
            ErrorKind::Syntax,
            format!("Recursive include of \"{target}\""),
        )
        .with_source(map, parent)
        .into());
    }
    trace!(target; "Resolving include");

    let caller = map.fragment(format!("<snippet {target}>"), parent);

    if let Some(name) = target.strip_prefix(SNIPPET_PREFIX) {
        // include from a markdown snippet
        let Some(snippets_map) = snippets else {
            return Err(Diagnostic::new(
                ErrorKind::Syntax,
                format!("source is not markdown, cannot include snippet \"{target}\"."),
            )
            .with_source(map, parent)
            .into());
        };
        let snippet = snippets_map.get(name).or_else(|| snippets_map.get(target));
        let Some(snippet) = snippet else {
            return Err(Diagnostic::new(
                ErrorKind::Syntax,
                format!("included snippet \"{name}\" not found."),
            )
            .with_source(map, parent)
            .into());
        };
        let text = snippet.text.clone();
        scan_fragment(map, &text, caller, output, snippets, includes)
    } else {
        // include from a file
        if !Path::new(target).exists() {
            return Err(Diagnostic::new(
                ErrorKind::Syntax,
                format!("included file \"{target}\" not found."),
            )
            .with_source(map, parent)
            .into());
        }
        let text = fs::read_to_string(target)?;
        scan_fragment(map, &text, caller, output, snippets, includes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dfd_core::model::Snippet;
    use std::io::Write as _;

    fn snippet_map(entries: &[(&str, &str)]) -> SnippetMap {
        entries
            .iter()
            .map(|(name, text)| {
                (
                    name.to_string(),
                    Snippet {
                        text: text.to_string(),
                        name: name.to_string(),
                        output: format!("{name}.svg"),
                        line_nr: 0,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_scan_skips_blank_lines() {
        let mut map = SourceMap::new();
        let lines = scan(&mut map, None, "\nprocess P\n\n\nentity E\n", None).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(map.get(lines[0]).text, "process P");
        assert_eq!(map.get(lines[1]).text, "entity E");
    }

    #[test]
    fn test_scan_joins_continuation_lines() {
        let mut map = SourceMap::new();
        let lines = scan(&mut map, None, "process P A \\\n   long label", None).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(map.get(lines[0]).text, "process P A long label");
    }

    #[test]
    fn test_include_nonexistent_file() {
        let mut map = SourceMap::new();
        let err = scan(
            &mut map,
            None,
            "#include __nonexistent_file_that_does_not_exist__.dfd",
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_include_snippet_not_markdown() {
        let mut map = SourceMap::new();
        let err = scan(&mut map, None, "#include #my_snippet", None).unwrap_err();
        assert!(err.to_string().contains("not markdown"));
    }

    #[test]
    fn test_include_snippet_not_found() {
        let snippets = snippet_map(&[("other", "process X")]);

        // sanity check: a valid snippet name must succeed
        let mut map = SourceMap::new();
        scan(&mut map, None, "#include #other", Some(&snippets)).unwrap();

        let mut map = SourceMap::new();
        let err = scan(&mut map, None, "#include #nosuchsnippet", Some(&snippets)).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_include_file_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "process Q Included").unwrap();

        let mut map = SourceMap::new();
        let text = format!("#include {}\nentity E Ent", file.path().display());
        let lines = scan(&mut map, None, &text, None).unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(map.get(lines[0]).text, "process Q Included");
        assert_eq!(map.get(lines[1]).text, "entity E Ent");
    }

    #[test]
    fn test_include_recursive() {
        // A file that includes itself must be detected, not looped on.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("self.dfd");
        std::fs::write(&path, format!("#include {}\nprocess P Proc", path.display())).unwrap();

        let mut map = SourceMap::new();
        let err = scan(
            &mut map,
            None,
            &std::fs::read_to_string(&path).unwrap(),
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Recursive"));
    }

    #[test]
    fn test_include_provenance_chain() {
        let snippets = snippet_map(&[("sub", "floww A B")]);
        let mut map = SourceMap::new();
        let lines = scan(&mut map, None, "#include #sub", Some(&snippets)).unwrap();

        assert_eq!(lines.len(), 1);
        let trace = map.trace(lines[0]);
        assert_eq!(trace[0], "  line 1: floww A B");
        assert_eq!(trace[1], "  line 1: <snippet #sub>");
        assert_eq!(trace[2], "  line 1: #include #sub");
    }
}
