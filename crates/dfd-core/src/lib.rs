//! dfd Core Types and Definitions
//!
//! This crate provides the foundational types for the dfd data-flow-diagram
//! language. It includes:
//!
//! - **Identifiers**: string-interned item names ([`identifier::Name`])
//! - **Source lines**: the provenance-tracked source-line arena ([`source`] module)
//! - **Model**: the statement model shared by every pipeline stage ([`model`] module)
//! - **Errors**: the diagnostic and error system ([`error`] module)

pub mod error;
pub mod identifier;
pub mod model;
pub mod source;
