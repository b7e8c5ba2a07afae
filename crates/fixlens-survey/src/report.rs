//! Survey aggregation and report rendering.

use std::fmt;
use std::path::Path;

use fixlens_core::{ClassifyConfig, FilterConfig, FixlensConfig, PolicyChoice, Result};
use fixlens_gitmine::commits::{is_fix_message, list_commits, HistoryOptions};
use fixlens_gitmine::filter::SourceFilter;
use fixlens_gitmine::repo::open_repository;
use fixlens_syntax::policy::build_policy;
use serde::Serialize;

use crate::census::census_head;
use crate::pipeline::classify_change_set;

/// Everything a survey run needs, resolved from config and CLI flags.
///
/// # Examples
///
/// ```
/// use fixlens_core::PolicyChoice;
/// use fixlens_survey::report::SurveyOptions;
///
/// let opts = SurveyOptions::default();
/// assert_eq!(opts.fix_keywords, vec!["fix"]);
/// assert_eq!(opts.policy, PolicyChoice::Assert);
/// ```
#[derive(Debug, Clone)]
pub struct SurveyOptions {
    /// Branch to walk (default: HEAD).
    pub branch: Option<String>,
    /// Stop after this many commits, newest first.
    pub max_commits: Option<usize>,
    /// Substrings that mark a commit summary as a fix.
    pub fix_keywords: Vec<String>,
    /// Which classification policy to apply.
    pub policy: PolicyChoice,
    /// Exception type the assert policy treats as a guard throw.
    pub throw_type: String,
    /// Source file selection.
    pub filter: FilterConfig,
}

impl SurveyOptions {
    /// Build options from a loaded configuration file.
    pub fn from_config(config: &FixlensConfig) -> Self {
        Self {
            branch: config.survey.branch.clone(),
            max_commits: config.survey.max_commits,
            fix_keywords: config.survey.fix_keywords.clone(),
            policy: config.classify.policy,
            throw_type: config.classify.throw_type.clone(),
            filter: config.filter.clone(),
        }
    }
}

impl Default for SurveyOptions {
    fn default() -> Self {
        Self::from_config(&FixlensConfig::default())
    }
}

/// Aggregated result of one survey run.
///
/// The touched side counts declarations hit by fix change-sets; the head
/// side is the tip-tree baseline those numbers are judged against.
///
/// # Examples
///
/// ```
/// use fixlens_survey::report::SurveyReport;
///
/// let report = SurveyReport {
///     repository: ".".into(),
///     policy: "assert".into(),
///     commits: 120,
///     fix_commits: 30,
///     declarations_touched: 45,
///     matched: 9,
///     matched_percentage: 20.0,
///     head_declarations: 400,
///     head_matched: 80,
///     head_matched_percentage: 20.0,
///     unparsable_files: 1,
/// };
/// assert!(report.to_string().contains("fix commits"));
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyReport {
    /// Path of the surveyed repository.
    pub repository: String,
    /// Name of the applied policy.
    pub policy: String,
    /// Commits walked, fix or not.
    pub commits: usize,
    /// Commits whose summary matched a fix keyword.
    pub fix_commits: usize,
    /// Declarations touched by fix change-sets, deduplicated per change-set.
    pub declarations_touched: usize,
    /// Touched declarations that satisfied the policy.
    pub matched: usize,
    /// `matched` over `declarations_touched`, rounded to two decimals.
    pub matched_percentage: f64,
    /// Declarations in the surveyed tip tree.
    pub head_declarations: usize,
    /// Tip declarations that satisfy the policy.
    pub head_matched: usize,
    /// `head_matched` over `head_declarations`, rounded to two decimals.
    pub head_matched_percentage: f64,
    /// Distinct unparsable snapshots among fix change-sets.
    pub unparsable_files: usize,
}

impl SurveyReport {
    /// Render the report as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("## Fix survey\n\n");
        out.push_str(&format!("- **Repository:** `{}`\n", self.repository));
        out.push_str(&format!("- **Policy:** {}\n\n", self.policy));
        out.push_str("| Metric | Value |\n");
        out.push_str("|--------|-------|\n");
        out.push_str(&format!("| Commits walked | {} |\n", self.commits));
        out.push_str(&format!("| Fix commits | {} |\n", self.fix_commits));
        out.push_str(&format!(
            "| Declarations touched | {} |\n",
            self.declarations_touched
        ));
        out.push_str(&format!(
            "| Matched (touched) | {} ({}%) |\n",
            self.matched, self.matched_percentage
        ));
        out.push_str(&format!(
            "| Head declarations | {} |\n",
            self.head_declarations
        ));
        out.push_str(&format!(
            "| Matched (head) | {} ({}%) |\n",
            self.head_matched, self.head_matched_percentage
        ));
        out.push_str(&format!(
            "| Unparsable snapshots | {} |\n",
            self.unparsable_files
        ));
        out
    }
}

impl fmt::Display for SurveyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Fix survey of {} (policy: {})",
            self.repository, self.policy
        )?;
        writeln!(f, "{:-<72}", "")?;
        writeln!(f, "commits walked          {}", self.commits)?;
        writeln!(f, "fix commits             {}", self.fix_commits)?;
        writeln!(f, "declarations touched    {}", self.declarations_touched)?;
        writeln!(
            f,
            "matched (touched)       {}  ({}%)",
            self.matched, self.matched_percentage
        )?;
        writeln!(f, "head declarations       {}", self.head_declarations)?;
        writeln!(
            f,
            "matched (head)          {}  ({}%)",
            self.head_matched, self.head_matched_percentage
        )?;
        write!(f, "unparsable snapshots    {}", self.unparsable_files)
    }
}

/// A ratio as a percentage rounded to two decimals; `0.0` for an empty
/// denominator.
///
/// # Examples
///
/// ```
/// use fixlens_survey::report::percentage;
///
/// assert_eq!(percentage(1, 3), 33.33);
/// assert_eq!(percentage(0, 0), 0.0);
/// ```
pub fn percentage(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    (10000.0 * numerator as f64 / denominator as f64).round() / 100.0
}

/// Run a whole survey: walk history, classify every fix change-set, census
/// the tip tree as the baseline, and aggregate.
///
/// # Errors
///
/// Returns [`FixlensError::Git`] if the repository cannot be opened or
/// walked, [`FixlensError::Config`] for a malformed skip pattern, and
/// [`FixlensError::UnknownNodeKind`] on taxonomy drift.
///
/// [`FixlensError::Git`]: fixlens_core::FixlensError::Git
/// [`FixlensError::Config`]: fixlens_core::FixlensError::Config
/// [`FixlensError::UnknownNodeKind`]: fixlens_core::FixlensError::UnknownNodeKind
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use fixlens_survey::report::{run_survey, SurveyOptions};
///
/// let report = run_survey(Path::new("."), &SurveyOptions::default()).unwrap();
/// println!("{report}");
/// ```
pub fn run_survey(repo_path: &Path, options: &SurveyOptions) -> Result<SurveyReport> {
    let repo = open_repository(repo_path)?;
    let filter = SourceFilter::from_config(&options.filter)?;
    let policy = build_policy(&ClassifyConfig {
        policy: options.policy,
        throw_type: options.throw_type.clone(),
    });

    let history = HistoryOptions {
        branch: options.branch.clone(),
        max_commits: options.max_commits,
    };
    let commits = list_commits(&repo, &history)?;

    let mut report = SurveyReport {
        repository: repo_path.display().to_string(),
        policy: policy.name().to_string(),
        commits: commits.len(),
        fix_commits: 0,
        declarations_touched: 0,
        matched: 0,
        matched_percentage: 0.0,
        head_declarations: 0,
        head_matched: 0,
        head_matched_percentage: 0.0,
        unparsable_files: 0,
    };

    for meta in &commits {
        if !is_fix_message(&meta.summary, &options.fix_keywords) {
            continue;
        }
        report.fix_commits += 1;

        let outcome = classify_change_set(&repo, &meta.id, policy.as_ref(), &filter)?;
        report.declarations_touched += outcome.touched.len();
        report.matched += outcome.touched.iter().filter(|t| t.matched).count();
        report.unparsable_files += outcome.unparsable_files;
    }
    report.matched_percentage = percentage(report.matched, report.declarations_touched);

    let census = census_head(&repo, options.branch.as_deref(), policy.as_ref(), &filter)?;
    report.head_declarations = census.declarations;
    report.head_matched = census.matched;
    report.head_matched_percentage = census.matched_share();

    Ok(report)
}
