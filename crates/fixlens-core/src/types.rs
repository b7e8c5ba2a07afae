use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An inclusive, 1-indexed range of source lines.
///
/// Spans follow editor conventions: the first line of a file is line 1, and
/// `end` is the last line the construct occupies, not one past it.
///
/// # Examples
///
/// ```
/// use fixlens_core::LineSpan;
///
/// let span = LineSpan::new(10, 20);
/// assert!(span.contains(10));
/// assert!(span.contains(20));
/// assert!(!span.contains(21));
/// assert_eq!(span.to_string(), "10-20");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSpan {
    /// First line of the range.
    pub begin: u32,
    /// Last line of the range (inclusive).
    pub end: u32,
}

impl LineSpan {
    /// Create a span from its first and last line.
    pub fn new(begin: u32, end: u32) -> Self {
        Self { begin, end }
    }

    /// Returns `true` if `line` falls within the span.
    pub fn contains(&self, line: u32) -> bool {
        self.begin <= line && line <= self.end
    }
}

impl fmt::Display for LineSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.begin, self.end)
    }
}

/// A contiguous edited region from one file of a change-set, in new-side
/// coordinates.
///
/// Hunks are extracted with zero context lines, so `new_start`/`new_lines`
/// describe exactly the replacement region in the post-change file. A pure
/// deletion has `new_lines == 0` and anchors at the line where the removed
/// code used to sit.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use fixlens_core::{Hunk, LineSpan};
///
/// let hunk = Hunk {
///     file_path: PathBuf::from("src/Main.java"),
///     new_start: 14,
///     new_lines: 2,
/// };
/// assert!(hunk.overlaps(LineSpan::new(10, 20)));
/// assert!(!hunk.overlaps(LineSpan::new(30, 40)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunk {
    /// Path of the affected file, relative to the repository root.
    pub file_path: PathBuf,
    /// First line of the edited region in the new version.
    pub new_start: u32,
    /// Number of lines the region occupies in the new version.
    pub new_lines: u32,
}

impl Hunk {
    /// Returns `true` if the hunk's edited region overlaps `span`.
    ///
    /// The test is the interval check
    /// `new_start <= span.end && new_start + new_lines >= span.begin`.
    /// It intentionally over-approximates by one line on the high side for
    /// non-empty hunks, and it lets a zero-length deletion hunk sitting on a
    /// span boundary count as touching the span.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use fixlens_core::{Hunk, LineSpan};
    ///
    /// let deletion = Hunk {
    ///     file_path: PathBuf::from("src/Main.java"),
    ///     new_start: 10,
    ///     new_lines: 0,
    /// };
    /// assert!(deletion.overlaps(LineSpan::new(10, 20)));
    /// assert!(!deletion.overlaps(LineSpan::new(12, 20)));
    /// ```
    pub fn overlaps(&self, span: LineSpan) -> bool {
        self.new_start <= span.end && self.new_start + self.new_lines >= span.begin
    }
}

/// Stable identity of a declaration within one snapshot.
///
/// Two resolutions that land in the same declaration of the same file version
/// produce equal keys, which is what lets a change-set count a declaration
/// once no matter how many of its hunks hit it.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use fixlens_core::{DeclKey, LineSpan};
///
/// let a = DeclKey::new(PathBuf::from("src/Main.java"), LineSpan::new(10, 20));
/// let b = DeclKey::new(PathBuf::from("src/Main.java"), LineSpan::new(10, 20));
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "src/Main.java:10-20");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclKey {
    /// File the declaration lives in.
    pub file: PathBuf,
    /// Line range of the whole declaration.
    pub span: LineSpan,
}

impl DeclKey {
    /// Create a key from a file path and the declaration's span.
    pub fn new(file: PathBuf, span: LineSpan) -> Self {
        Self { file, span }
    }
}

impl fmt::Display for DeclKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.span)
    }
}

/// Which classification policy a run applies to resolved declarations.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument
/// parsing and in `.fixlens.toml`.
///
/// # Examples
///
/// ```
/// use fixlens_core::PolicyChoice;
///
/// let choice: PolicyChoice = "assert".parse().unwrap();
/// assert_eq!(choice, PolicyChoice::Assert);
/// assert_eq!(choice.to_string(), "assert");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyChoice {
    /// Assertion-like constructs: `assert` statements and guard throws.
    #[default]
    Assert,
    /// Branching constructs: `if` and `switch`.
    Conditional,
    /// Iteration constructs: `while` and classic `for`.
    Loop,
    /// Universal membership in a restricted value-oriented subset.
    Subset,
}

impl fmt::Display for PolicyChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyChoice::Assert => write!(f, "assert"),
            PolicyChoice::Conditional => write!(f, "conditional"),
            PolicyChoice::Loop => write!(f, "loop"),
            PolicyChoice::Subset => write!(f, "subset"),
        }
    }
}

impl FromStr for PolicyChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "assert" => Ok(PolicyChoice::Assert),
            "conditional" => Ok(PolicyChoice::Conditional),
            "loop" => Ok(PolicyChoice::Loop),
            "subset" => Ok(PolicyChoice::Subset),
            other => Err(format!("unknown policy: {other}")),
        }
    }
}

/// Output format for CLI subcommands.
///
/// Implements [`FromStr`] so it can be used directly with `clap` argument
/// parsing.
///
/// # Examples
///
/// ```
/// use fixlens_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable tables and summaries.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// Markdown-formatted output.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
