//! The core diagnostic type.

use std::fmt;

use crate::error::ErrorKind;
use crate::source::{LineId, SourceMap};

/// A single build failure: a categorized message with an optional source
/// provenance chain.
///
/// The provenance chain is captured (already rendered) at construction time,
/// so a diagnostic can be displayed long after the [`SourceMap`] is gone.
///
/// # Example
///
/// ```
/// # use dfd_core::error::{Diagnostic, ErrorKind};
/// # use dfd_core::source::SourceMap;
/// let mut map = SourceMap::new();
/// let root = map.root("<stdin>");
/// let line = map.line("floww A B", root, 0);
///
/// let diag = Diagnostic::new(ErrorKind::Syntax, "Unrecognized keyword \"floww\"")
///     .with_source(&map, line);
/// assert!(diag.to_string().starts_with("(most recent first)"));
/// assert!(diag.to_string().ends_with("Error: Unrecognized keyword \"floww\""));
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    kind: ErrorKind,
    message: String,
    trace: Vec<String>,
}

impl Diagnostic {
    /// Create a diagnostic without source context.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            trace: Vec::new(),
        }
    }

    /// Attach the provenance chain of `source`, replacing any previous one.
    pub fn with_source(mut self, map: &SourceMap, source: LineId) -> Self {
        self.trace = map.trace(source);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The rendered provenance entries, most recent first. Empty when the
    /// diagnostic has no source context.
    pub fn trace(&self) -> &[String] {
        &self.trace
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.trace.is_empty() {
            return write!(f, "{}", self.message);
        }
        writeln!(f, "(most recent first)")?;
        for entry in &self.trace {
            writeln!(f, "{entry}")?;
        }
        write!(f, "Error: {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_without_source() {
        let diag = Diagnostic::new(ErrorKind::Style, "Unsupported style \"bogus\"");
        assert_eq!(diag.to_string(), "Unsupported style \"bogus\"");
    }

    #[test]
    fn test_display_with_source() {
        let mut map = SourceMap::new();
        let root = map.root("<file:x.dfd>");
        let line = map.line("process\tP\tProc", root, 4);

        let diag =
            Diagnostic::new(ErrorKind::Semantic, "Frame is empty").with_source(&map, line);

        assert_eq!(
            diag.to_string(),
            "(most recent first)\n  line 5: process P Proc\n  <file:x.dfd>\nError: Frame is empty"
        );
    }

    #[test]
    fn test_kind_accessor() {
        let diag = Diagnostic::new(ErrorKind::Filter, "Name(s) unknown: X");
        assert_eq!(diag.kind(), ErrorKind::Filter);
        assert_eq!(diag.message(), "Name(s) unknown: X");
    }
}
