//! Collector for accumulating diagnostics during a processing phase.

use crate::error::{BuildError, Diagnostic};

/// Accumulates diagnostics so a phase can report every failure at once
/// instead of stopping at the first.
///
/// Used by the dependency checker, which scans every declared dependency
/// before failing.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    header: Option<String>,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collector whose eventual [`BuildError`] is introduced by a
    /// header line.
    pub fn with_header(header: impl Into<String>) -> Self {
        Self {
            header: Some(header.into()),
            diagnostics: Vec::new(),
        }
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Finish collection: `Ok(())` when nothing was emitted, otherwise a
    /// [`BuildError`] carrying every diagnostic.
    pub fn finish(self) -> Result<(), BuildError> {
        if self.diagnostics.is_empty() {
            return Ok(());
        }
        Err(match self.header {
            Some(header) => BuildError::with_header(header, self.diagnostics),
            None => BuildError::new(self.diagnostics),
        })
    }
}
