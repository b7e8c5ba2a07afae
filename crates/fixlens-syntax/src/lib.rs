//! Syntax-side machinery: parsing, the node-kind taxonomy, hunk-to-declaration
//! resolution, and structural classification.
//!
//! Java snapshots are parsed with tree-sitter into owned trees, cached per
//! change-set, and walked by two table-driven traversals: a role table maps
//! edited line ranges to their innermost enclosing method-level declaration,
//! and policy tables decide whether a declaration contains (or avoids) the
//! constructs a survey tracks. Both tables are exhaustive over a closed kind
//! enum, so grammar drift is a compile-time or loud runtime event, never a
//! silent miscount.

pub mod cache;
pub mod classify;
pub mod kinds;
pub mod parse;
pub mod policy;
pub mod resolve;
pub mod tree;
