//! Git history extraction via git2.
//!
//! Walks commit history, extracts zero-context diff hunks per commit, and
//! enumerates the source files of a branch tip, all in terms of blob ids so
//! the rest of the pipeline never touches a working tree.

pub mod commits;
pub mod diffs;
pub mod filter;
pub mod headwalk;
pub mod repo;
