//! # dfd Parser
//!
//! DSL front end for the dfd data-flow-diagram language: from source text to
//! a checked statement list.
//!
//! The front end runs in three stages:
//!
//! 1. **Scan** — [`scanner::scan`] resolves `#include` directives (files and
//!    markdown snippets, with recursion detection), joins continuation
//!    lines, and produces provenance-tracked source lines.
//! 2. **Parse** — [`parser::parse`] desugars arrow shorthand, dispatches on
//!    the statement keyword, and produces the statement list together with
//!    the external-graph dependency list and the attrib-alias table.
//! 3. **Check** — [`checker::check`] validates name uniqueness, connection
//!    endpoints and type constraints, and frame membership, returning the
//!    name→item table used by later stages.
//!
//! ## Usage
//!
//! ```
//! use dfd_core::source::SourceMap;
//! use dfd_parser::{checker, parser, scanner};
//!
//! let mut map = SourceMap::new();
//! let lines = scanner::scan(&mut map, None, "process P Proc", None).unwrap();
//! let (statements, _deps, _attribs) = parser::parse(&mut map, &lines).unwrap();
//! let items = checker::check(&map, &statements).unwrap();
//! assert_eq!(items.len(), 1);
//! ```

pub mod checker;
pub mod parser;
pub mod scanner;

mod filter_spec;
mod sugar;
