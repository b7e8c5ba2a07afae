use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FixlensError;
use crate::types::PolicyChoice;

/// Top-level configuration loaded from `.fixlens.toml`.
///
/// CLI flags override anything set here; the file overrides built-in
/// defaults.
///
/// # Examples
///
/// ```
/// use fixlens_core::FixlensConfig;
///
/// let config = FixlensConfig::default();
/// assert_eq!(config.survey.fix_keywords, vec!["fix"]);
/// assert_eq!(config.filter.extensions, vec!["java"]);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixlensConfig {
    /// History mining settings.
    #[serde(default)]
    pub survey: SurveyConfig,
    /// Classification policy settings.
    #[serde(default)]
    pub classify: ClassifyConfig,
    /// Source file selection settings.
    #[serde(default)]
    pub filter: FilterConfig,
}

impl FixlensConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FixlensError::Io`] if the file cannot be read, or
    /// [`FixlensError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use fixlens_core::FixlensConfig;
    /// use std::path::Path;
    ///
    /// let config = FixlensConfig::from_file(Path::new(".fixlens.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, FixlensError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`FixlensError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use fixlens_core::FixlensConfig;
    ///
    /// let toml = r#"
    /// [survey]
    /// fix_keywords = ["fix", "bug"]
    /// "#;
    /// let config = FixlensConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.survey.fix_keywords.len(), 2);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, FixlensError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// History mining configuration.
///
/// # Examples
///
/// ```
/// use fixlens_core::SurveyConfig;
///
/// let config = SurveyConfig::default();
/// assert_eq!(config.fix_keywords, vec!["fix"]);
/// assert!(config.branch.is_none());
/// assert!(config.max_commits.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyConfig {
    /// Substrings that mark a commit summary as a fix (matched
    /// case-insensitively; default: `["fix"]`).
    #[serde(default = "default_fix_keywords")]
    pub fix_keywords: Vec<String>,
    /// Branch to walk instead of `HEAD`.
    pub branch: Option<String>,
    /// Stop after this many commits, newest first.
    pub max_commits: Option<usize>,
}

fn default_fix_keywords() -> Vec<String> {
    vec!["fix".into()]
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            fix_keywords: default_fix_keywords(),
            branch: None,
            max_commits: None,
        }
    }
}

/// Classification policy configuration.
///
/// # Examples
///
/// ```
/// use fixlens_core::{ClassifyConfig, PolicyChoice};
///
/// let config = ClassifyConfig::default();
/// assert_eq!(config.policy, PolicyChoice::Assert);
/// assert_eq!(config.throw_type, "IllegalArgumentException");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyConfig {
    /// Which policy to apply (default: `assert`).
    #[serde(default)]
    pub policy: PolicyChoice,
    /// Exception type whose direct `throw new` counts as assertion-like
    /// under the assert policy (default: `IllegalArgumentException`).
    #[serde(default = "default_throw_type")]
    pub throw_type: String,
}

fn default_throw_type() -> String {
    "IllegalArgumentException".into()
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            policy: PolicyChoice::default(),
            throw_type: default_throw_type(),
        }
    }
}

/// Source file selection configuration.
///
/// # Examples
///
/// ```
/// use fixlens_core::FilterConfig;
///
/// let config = FilterConfig::default();
/// assert_eq!(config.extensions, vec!["java"]);
/// assert!(config.skip_patterns.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// File extensions to treat as source files (default: `["java"]`).
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Glob patterns for paths to skip (e.g. `"**/generated/**"`).
    #[serde(default)]
    pub skip_patterns: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    vec!["java".into()]
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            skip_patterns: Vec::new(),
        }
    }
}
