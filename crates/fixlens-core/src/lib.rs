//! Core types, configuration, and error handling for fixlens.
//!
//! This crate provides the shared foundation used by all other fixlens crates:
//! - [`FixlensError`] — unified error type using `thiserror`
//! - [`FixlensConfig`] — configuration loaded from `.fixlens.toml`
//! - Shared types: [`LineSpan`], [`Hunk`], [`DeclKey`], [`PolicyChoice`],
//!   [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{ClassifyConfig, FilterConfig, FixlensConfig, SurveyConfig};
pub use error::FixlensError;
pub use types::{DeclKey, Hunk, LineSpan, OutputFormat, PolicyChoice};

/// A convenience `Result` type for fixlens operations.
pub type Result<T> = std::result::Result<T, FixlensError>;
