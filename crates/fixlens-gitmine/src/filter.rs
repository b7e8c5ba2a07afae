//! Source file selection.
//!
//! Decides which paths of a diff or tree count as source code: an extension
//! allow-list plus glob patterns for paths to skip (generated code, vendored
//! trees, and similar).

use std::path::Path;

use fixlens_core::{FilterConfig, FixlensError, Result};

/// Path predicate shared by diff extraction and the tree census.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use fixlens_gitmine::filter::SourceFilter;
///
/// let filter = SourceFilter::default();
/// assert!(filter.is_source(Path::new("src/Main.java")));
/// assert!(!filter.is_source(Path::new("README.md")));
/// ```
#[derive(Debug)]
pub struct SourceFilter {
    extensions: Vec<String>,
    skip_patterns: Vec<glob::Pattern>,
}

impl Default for SourceFilter {
    fn default() -> Self {
        // The default config carries no skip patterns, so pattern
        // compilation cannot fail.
        Self::from_config(&FilterConfig::default()).expect("default filter config is valid")
    }
}

impl SourceFilter {
    /// Build a filter from configuration.
    ///
    /// A malformed skip pattern is a configuration error, not something to
    /// silently drop: a typo would otherwise widen the survey unnoticed.
    ///
    /// # Errors
    ///
    /// Returns [`FixlensError::Config`] if any skip pattern is not a valid
    /// glob.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use fixlens_core::FilterConfig;
    /// use fixlens_gitmine::filter::SourceFilter;
    ///
    /// let config = FilterConfig {
    ///     extensions: vec!["java".into()],
    ///     skip_patterns: vec!["**/generated/**".into()],
    /// };
    /// let filter = SourceFilter::from_config(&config).unwrap();
    /// assert!(filter.is_source(Path::new("src/Main.java")));
    /// assert!(!filter.is_source(Path::new("src/generated/Stub.java")));
    /// ```
    pub fn from_config(config: &FilterConfig) -> Result<Self> {
        let mut skip_patterns = Vec::new();
        for pat in &config.skip_patterns {
            let compiled = glob::Pattern::new(pat)
                .map_err(|e| FixlensError::Config(format!("invalid skip pattern '{pat}': {e}")))?;
            skip_patterns.push(compiled);
        }

        Ok(Self {
            extensions: config.extensions.clone(),
            skip_patterns,
        })
    }

    /// Returns `true` if `path` has an allowed extension and matches no skip
    /// pattern.
    pub fn is_source(&self, path: &Path) -> bool {
        let Some(extension) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        if !self.extensions.iter().any(|e| e == extension) {
            return false;
        }
        !self.skip_patterns.iter().any(|p| p.matches_path(path))
    }
}
