//! Baseline census over a branch tip.
//!
//! Answers the comparison question behind the survey: out of every
//! declaration in the tree right now, how many satisfy the policy? Fix
//! ratios mean little without this denominator.

use fixlens_core::Result;
use fixlens_gitmine::diffs::blob_bytes;
use fixlens_gitmine::filter::SourceFilter;
use fixlens_gitmine::headwalk::head_source_files;
use fixlens_syntax::classify::classify;
use fixlens_syntax::parse::{parse_source, ParseOutcome};
use fixlens_syntax::policy::KindPolicy;
use fixlens_syntax::resolve::collect_declarations;
use git2::Repository;
use serde::Serialize;

use crate::report::percentage;

/// Counts from a tip-tree census.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CensusOutcome {
    /// Source files in the tip tree.
    pub files: usize,
    /// Files whose snapshot would not parse.
    pub unparsable_files: usize,
    /// Declarations across all parsed files.
    pub declarations: usize,
    /// Declarations that satisfy the policy.
    pub matched: usize,
}

impl CensusOutcome {
    /// Percentage of declarations that satisfy the policy, rounded to two
    /// decimals.
    pub fn matched_share(&self) -> f64 {
        percentage(self.matched, self.declarations)
    }
}

/// Census every source file at the tip of `branch` (or `HEAD`).
///
/// Counts the same declarations the change-set resolver can reach, so the
/// census denominator and the survey numerator agree on what a declaration
/// is: anonymous-class members, for example, appear in neither.
///
/// # Errors
///
/// Returns [`FixlensError::Git`] if the tip cannot be read, and
/// [`FixlensError::UnknownNodeKind`] on taxonomy drift in any parsed file.
///
/// [`FixlensError::Git`]: fixlens_core::FixlensError::Git
/// [`FixlensError::UnknownNodeKind`]: fixlens_core::FixlensError::UnknownNodeKind
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use fixlens_core::ClassifyConfig;
/// use fixlens_gitmine::filter::SourceFilter;
/// use fixlens_gitmine::repo::open_repository;
/// use fixlens_survey::census::census_head;
/// use fixlens_syntax::policy::build_policy;
///
/// let repo = open_repository(Path::new(".")).unwrap();
/// let policy = build_policy(&ClassifyConfig::default());
/// let census = census_head(&repo, None, policy.as_ref(), &SourceFilter::default()).unwrap();
/// println!("{}/{} declarations match", census.matched, census.declarations);
/// ```
pub fn census_head(
    repo: &Repository,
    branch: Option<&str>,
    policy: &dyn KindPolicy,
    filter: &SourceFilter,
) -> Result<CensusOutcome> {
    let files = head_source_files(repo, branch, filter)?;

    let mut outcome = CensusOutcome {
        files: files.len(),
        ..CensusOutcome::default()
    };
    for file in &files {
        let bytes = blob_bytes(repo, &file.blob)?;
        match parse_source(&file.path, &bytes)? {
            ParseOutcome::Tree(tree) => {
                for decl in collect_declarations(&tree)? {
                    outcome.declarations += 1;
                    if classify(&tree, decl.node, policy)?.matched {
                        outcome.matched += 1;
                    }
                }
            }
            ParseOutcome::Unparsable { .. } => outcome.unparsable_files += 1,
        }
    }

    Ok(outcome)
}
