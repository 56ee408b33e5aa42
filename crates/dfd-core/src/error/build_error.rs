//! The BuildError type wrapping one or more diagnostics.

use std::fmt;

use crate::error::Diagnostic;

/// Error type for a failed build: one or more [`Diagnostic`]s.
///
/// Most stages fail on the first violated invariant and produce a single
/// diagnostic; the dependency checker aggregates every broken reference into
/// one `BuildError` so that a report surfaces them all. Aggregated errors
/// render as a double-newline-joined concatenation of each diagnostic's own
/// provenance-prefixed message, optionally preceded by a header line.
#[derive(Debug)]
pub struct BuildError {
    header: Option<String>,
    diagnostics: Vec<Diagnostic>,
}

impl BuildError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            header: None,
            diagnostics,
        }
    }

    /// Create an aggregated error introduced by a header line, e.g.
    /// `Dependency error(s) found:`.
    pub fn with_header(header: impl Into<String>, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            header: Some(header.into()),
            diagnostics,
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if let Some(header) = &self.header {
            parts.push(header.clone());
        }
        parts.extend(self.diagnostics.iter().map(|d| d.to_string()));
        write!(f, "{}", parts.join("\n\n"))
    }
}

impl std::error::Error for BuildError {}

impl From<Diagnostic> for BuildError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::new(vec![diagnostic])
    }
}
