//! Provenance-tracked source lines.
//!
//! Every statement in the model points back to the source line it was parsed
//! from, and every source line points back to the line that included it (if
//! any). The chain is stored in an arena ([`SourceMap`]) and walked only
//! upward, to render the "most recent first" location stack in error
//! messages.

use std::fmt;

/// Index of a [`SourceLine`] in a [`SourceMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineId(u32);

/// One logical source line, or a synthetic provenance node (input root,
/// include fragment, markdown snippet).
#[derive(Debug, Clone)]
pub struct SourceLine {
    /// Line text, possibly rewritten by the parser's sugar desugaring.
    pub text: String,
    /// Line text as scanned, before any rewriting. For synthetic nodes this
    /// is the provenance label (e.g. `<file:x.dfd>`).
    pub raw_text: String,
    /// The line this one was included from, if any.
    pub parent: Option<LineId>,
    /// Offset of the line within its fragment. `None` for synthetic roots
    /// that do not correspond to a position in any text.
    pub line_index: Option<usize>,
    /// True for markdown-snippet roots: child line numbers are then reported
    /// relative to the host document rather than to the snippet.
    pub is_container: bool,
}

/// Arena of [`SourceLine`]s for one build.
///
/// Lines are only ever appended; parents always precede their children.
#[derive(Debug, Default)]
pub struct SourceMap {
    lines: Vec<SourceLine>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, line: SourceLine) -> LineId {
        let id = LineId(self.lines.len() as u32);
        self.lines.push(line);
        id
    }

    /// Add a synthetic root node labelled e.g. `<file:diagram.dfd>`.
    pub fn root(&mut self, label: impl Into<String>) -> LineId {
        self.push(SourceLine {
            text: String::new(),
            raw_text: label.into(),
            parent: None,
            line_index: None,
            is_container: false,
        })
    }

    /// Add a markdown-snippet root. `line_index` is the snippet's offset in
    /// the host document, so that child lines report host-relative numbers.
    pub fn container(&mut self, label: impl Into<String>, line_index: usize) -> LineId {
        self.push(SourceLine {
            text: String::new(),
            raw_text: label.into(),
            parent: None,
            line_index: Some(line_index),
            is_container: true,
        })
    }

    /// Add the synthetic node representing an `#include` expansion, child of
    /// the including line.
    pub fn fragment(&mut self, label: impl Into<String>, parent: LineId) -> LineId {
        self.push(SourceLine {
            text: String::new(),
            raw_text: label.into(),
            parent: Some(parent),
            line_index: Some(0),
            is_container: false,
        })
    }

    /// Add a real scanned line.
    pub fn line(&mut self, text: &str, parent: LineId, line_index: usize) -> LineId {
        self.push(SourceLine {
            text: text.to_string(),
            raw_text: text.to_string(),
            parent: Some(parent),
            line_index: Some(line_index),
            is_container: false,
        })
    }

    pub fn get(&self, id: LineId) -> &SourceLine {
        &self.lines[id.0 as usize]
    }

    /// Rewrite the post-processing text of a line (sugar desugaring).
    /// `raw_text` is left untouched for error reporting.
    pub fn set_text(&mut self, id: LineId, text: String) {
        self.lines[id.0 as usize].text = text;
    }

    /// One-based line number of `id` for use in messages, accounting for
    /// markdown containers.
    pub fn display_line_number(&self, id: LineId) -> usize {
        let line = self.get(id);
        let Some(n) = line.line_index else { return 0 };
        match line.parent.map(|p| self.get(p)) {
            Some(parent) if parent.is_container => {
                let base = parent.line_index.unwrap_or(0) + 1;
                base + n + 1
            }
            _ => n + 1,
        }
    }

    /// Render the provenance chain of `id`, most recent first, one entry per
    /// line of the chain.
    pub fn trace(&self, id: LineId) -> Vec<String> {
        let mut stack = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            let line = self.get(cur);
            match line.line_index {
                None => stack.push(format!("  {}", pack(&line.raw_text))),
                Some(_) => stack.push(format!(
                    "  line {}: {}",
                    self.display_line_number(cur),
                    pack(&line.raw_text)
                )),
            }
            current = line.parent;
        }
        stack
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Collapse all whitespace runs in a line to single spaces, for display in
/// error messages.
pub fn pack(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_single_line() {
        let mut map = SourceMap::new();
        let root = map.root("<stdin>");
        let line = map.line("process\tP\tProc", root, 3);

        let trace = map.trace(line);
        assert_eq!(trace, vec!["  line 4: process P Proc", "  <stdin>"]);
    }

    #[test]
    fn test_trace_through_include() {
        let mut map = SourceMap::new();
        let root = map.root("<file:main.dfd>");
        let including = map.line("#include sub.dfd", root, 0);
        let fragment = map.fragment("<snippet sub.dfd>", including);
        let inner = map.line("flow A B", fragment, 2);

        let trace = map.trace(inner);
        assert_eq!(
            trace,
            vec![
                "  line 3: flow A B",
                "  line 1: <snippet sub.dfd>",
                "  line 1: #include sub.dfd",
                "  <file:main.dfd>",
            ]
        );
    }

    #[test]
    fn test_container_offsets_line_numbers() {
        // A snippet starting at line 7 of a markdown file: its first line is
        // reported as host line 9 (offset + 1 + index + 1).
        let mut map = SourceMap::new();
        let root = map.container("<snippet:diagram2.svg>", 7);
        let line = map.line("process P", root, 0);

        assert_eq!(map.display_line_number(line), 9);
    }

    #[test]
    fn test_pack_collapses_whitespace() {
        assert_eq!(pack("a \t b\t\tc"), "a b c");
        assert_eq!(pack("  "), "");
    }
}
