use std::path::PathBuf;

use crate::types::LineSpan;

/// Errors that can occur across the fixlens pipeline.
///
/// Each variant wraps a specific error domain. Library crates use this type
/// directly; the binary crate converts to `miette` diagnostics at the boundary.
///
/// # Examples
///
/// ```
/// use fixlens_core::FixlensError;
///
/// let err = FixlensError::Config("missing keyword list".into());
/// assert!(err.to_string().contains("missing keyword list"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum FixlensError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Git operation failure.
    #[error("git error: {0}")]
    Git(String),

    /// Grammar loading or parser setup failure.
    #[error("parse error: {0}")]
    Parse(String),

    /// A syntax node whose grammar kind is not in the node-kind taxonomy.
    ///
    /// The taxonomy is a closed enum over the Java grammar; meeting a kind
    /// outside it means the grammar and the taxonomy have drifted apart, and
    /// every classification produced afterwards would be untrustworthy. This
    /// error is fatal and must be propagated, never swallowed.
    #[error("unknown syntax node kind `{kind}` in {} (lines {span})", .file.display())]
    UnknownNodeKind {
        /// The grammar kind string tree-sitter reported.
        kind: String,
        /// File whose tree contained the node.
        file: PathBuf,
        /// Line range of the offending node.
        span: LineSpan,
    },

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: FixlensError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn config_error_displays_message() {
        let err = FixlensError::Config("bad keyword".into());
        assert_eq!(err.to_string(), "configuration error: bad keyword");
    }

    #[test]
    fn unknown_node_kind_names_kind_and_location() {
        let err = FixlensError::UnknownNodeKind {
            kind: "quantum_statement".into(),
            file: PathBuf::from("src/Main.java"),
            span: LineSpan::new(3, 7),
        };
        let msg = err.to_string();
        assert!(msg.contains("quantum_statement"));
        assert!(msg.contains("src/Main.java"));
        assert!(msg.contains("3-7"));
    }
}
