//! The survey pipeline: fix commits in, classification counts out.
//!
//! Ties the other crates together. For each fix commit the pipeline maps
//! zero-context hunks to their innermost enclosing declarations, classifies
//! each declaration once, and aggregates the counts into a report. A census
//! over the tip tree provides the matching baseline.

pub mod census;
pub mod pipeline;
pub mod report;
