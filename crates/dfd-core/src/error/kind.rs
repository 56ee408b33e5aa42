//! Closed categorization of build failures.

use std::fmt;

/// The category of a [`Diagnostic`](super::Diagnostic).
///
/// Kinds exist for programmatic inspection (tests, tooling); the rendered
/// message does not include them, preserving the plain-text error contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input: unknown keyword, wrong argument count, unresolvable
    /// include, malformed filter spec.
    Syntax,
    /// Structurally invalid diagram: duplicate name, undefined reference,
    /// wrong connection target kind, malformed frame.
    Semantic,
    /// Broken reference to another graph.
    Dependency,
    /// Invalid filter statement: unknown or no-longer-available name,
    /// replacer outside a without filter.
    Filter,
    /// Unknown style name or invalid style value.
    Style,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorKind::Syntax => "syntax",
            ErrorKind::Semantic => "semantic",
            ErrorKind::Dependency => "dependency",
            ErrorKind::Filter => "filter",
            ErrorKind::Style => "style",
        };
        write!(f, "{text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ErrorKind::Syntax.to_string(), "syntax");
        assert_eq!(ErrorKind::Dependency.to_string(), "dependency");
    }
}
