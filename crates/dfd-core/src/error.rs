//! Error and diagnostic system for the dfd pipeline.
//!
//! The system is built around [`Diagnostic`]: one failed invariant, with a
//! closed [`ErrorKind`] category and the rendered source provenance chain.
//! Stages that surface several independent failures at once (the dependency
//! checker) accumulate diagnostics in a [`DiagnosticCollector`] and return a
//! [`BuildError`]. The top-level [`DfdError`] adds the I/O and render
//! failure modes of the surrounding tooling.
//!
//! # Rendering contract
//!
//! A diagnostic with a source renders as the include/snippet stack, most
//! recent first, terminated by the message:
//!
//! ```text
//! (most recent first)
//!   line 4: flow A B data
//!   line 2: #include sub.dfd
//!   <file:main.dfd>
//! Error: Connection "flow" connects to "B", which is not defined
//! ```

mod build_error;
mod collector;
mod diagnostic;
mod kind;

pub use build_error::BuildError;
pub use collector::DiagnosticCollector;
pub use diagnostic::Diagnostic;
pub use kind::ErrorKind;

use thiserror::Error;

/// The top-level error type for dfd operations.
#[derive(Debug, Error)]
pub enum DfdError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("Render error: {0}")]
    Render(String),
}

impl From<Diagnostic> for DfdError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::Build(BuildError::from(diagnostic))
    }
}
