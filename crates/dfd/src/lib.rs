//! dfd - generate data flow diagrams from a textual DSL.
//!
//! This crate is the middle and back end of the dfd pipeline. Building on
//! the front end from [`dfd_parser`], it checks cross-graph dependencies,
//! applies visibility filters, resolves style options, generates Graphviz
//! DOT text, and invokes the external renderer.
//!
//! The pipeline stages run strictly in sequence; each stage consumes its
//! input fully before the next one starts:
//!
//! ```text
//! Source Text
//!     ↓ scan             (dfd-parser)
//! Source Lines
//!     ↓ parse            (dfd-parser)
//! Statements + Dependencies + Attribs
//!     ↓ check            (dfd-parser), dependency check
//! Checked Statements
//!     ↓ filter, prune hidables, resolve options
//! Filtered Statements + GraphOptions
//!     ↓ generate
//! DOT text
//!     ↓ render           (external Graphviz process)
//! Output File
//! ```
//!
//! The main entry point is [`pipeline::build`], which takes the diagram
//! source text and returns the generated DOT text together with the
//! resolved [`GraphOptions`](dfd_core::model::GraphOptions).
//!
//! # Example
//!
//! ```
//! use dfd::pipeline::{BuildOptions, build};
//! use dfd_core::source::SourceMap;
//!
//! let mut map = SourceMap::new();
//! let options = BuildOptions::default();
//! let (dot_text, _graph_options) = build(
//!     &mut map,
//!     None,
//!     "process P Process\nentity E Entity\nP --> E data",
//!     "example",
//!     &options,
//!     None,
//! )
//! .expect("build failed");
//! assert!(dot_text.contains("digraph"));
//! ```

pub mod dependency;
pub mod export;
pub mod filters;
pub mod pipeline;

pub use dfd_core::error::DfdError;
pub use pipeline::{BuildOptions, build};
