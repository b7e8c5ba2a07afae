//! Commit listing and fix-commit detection.

use fixlens_core::{FixlensError, Result};
use git2::{Repository, Sort};
use serde::{Deserialize, Serialize};

use crate::repo::resolve_tip;

/// Metadata for one commit of the walked history.
///
/// # Examples
///
/// ```
/// use fixlens_gitmine::commits::CommitMeta;
///
/// let meta = CommitMeta {
///     id: "a".repeat(40),
///     summary: "fix: reject negative amounts".into(),
///     author: "alice".into(),
///     timestamp: 1700000000,
///     parents: vec!["b".repeat(40)],
/// };
/// assert_eq!(meta.parents.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitMeta {
    /// Full commit id in hex.
    pub id: String,
    /// First line of the commit message.
    pub summary: String,
    /// Author name.
    pub author: String,
    /// Unix timestamp of the commit.
    pub timestamp: i64,
    /// Parent commit ids; empty for a root commit, two or more for merges.
    pub parents: Vec<String>,
}

/// Options for the history walk.
///
/// # Examples
///
/// ```
/// use fixlens_gitmine::commits::HistoryOptions;
///
/// let opts = HistoryOptions::default();
/// assert!(opts.branch.is_none());
/// assert!(opts.max_commits.is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct HistoryOptions {
    /// Branch to walk (default: HEAD).
    pub branch: Option<String>,
    /// Stop after this many commits, newest first.
    pub max_commits: Option<usize>,
}

/// Walk history from the configured tip and return commit metadata, newest
/// first.
///
/// # Errors
///
/// Returns [`FixlensError::Git`] if the tip cannot be resolved or the walk
/// fails partway.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use fixlens_gitmine::commits::{list_commits, HistoryOptions};
/// use fixlens_gitmine::repo::open_repository;
///
/// let repo = open_repository(Path::new(".")).unwrap();
/// let commits = list_commits(&repo, &HistoryOptions::default()).unwrap();
/// for c in &commits {
///     println!("{} {}", &c.id[..7], c.summary);
/// }
/// ```
pub fn list_commits(repo: &Repository, options: &HistoryOptions) -> Result<Vec<CommitMeta>> {
    let mut revwalk = repo
        .revwalk()
        .map_err(|e| FixlensError::Git(format!("failed to create revwalk: {e}")))?;
    revwalk.set_sorting(Sort::TIME).ok();

    let tip = resolve_tip(repo, options.branch.as_deref())?;
    revwalk
        .push(tip)
        .map_err(|e| FixlensError::Git(format!("failed to push tip: {e}")))?;

    let mut commits = Vec::new();
    for oid_result in revwalk {
        if let Some(max) = options.max_commits {
            if commits.len() >= max {
                break;
            }
        }

        let oid = oid_result.map_err(|e| FixlensError::Git(format!("revwalk error: {e}")))?;
        let commit = repo
            .find_commit(oid)
            .map_err(|e| FixlensError::Git(format!("failed to find commit: {e}")))?;

        let parents = (0..commit.parent_count())
            .map(|i| {
                commit
                    .parent_id(i)
                    .map(|id| id.to_string())
                    .map_err(|e| FixlensError::Git(format!("failed to read parent: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        commits.push(CommitMeta {
            id: oid.to_string(),
            summary: commit.summary().unwrap_or("").to_string(),
            author: commit
                .author()
                .name()
                .unwrap_or("unknown")
                .to_string(),
            timestamp: commit.time().seconds(),
            parents,
        });
    }

    Ok(commits)
}

/// Returns `true` if `summary` marks a fix commit.
///
/// The test is a case-insensitive substring match against each keyword, so
/// the default `["fix"]` catches "Fix NPE", "Bugfix" and "fixes #12" alike.
///
/// # Examples
///
/// ```
/// use fixlens_gitmine::commits::is_fix_message;
///
/// let keywords = vec!["fix".to_string()];
/// assert!(is_fix_message("Fix off-by-one in parser", &keywords));
/// assert!(is_fix_message("Hotfix for prod", &keywords));
/// assert!(!is_fix_message("Add parser", &keywords));
/// ```
pub fn is_fix_message(summary: &str, keywords: &[String]) -> bool {
    let summary = summary.to_lowercase();
    keywords
        .iter()
        .any(|k| !k.is_empty() && summary.contains(&k.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use git2::{Oid, Signature, Time};

    use super::*;

    fn init_repo(dir: &Path) -> Repository {
        let repo = Repository::init(dir).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "tester").unwrap();
            config.set_str("user.email", "tester@example.com").unwrap();
        }
        repo
    }

    /// Commit `name` with an explicit timestamp so time ordering is
    /// deterministic.
    fn commit_at(
        repo: &Repository,
        dir: &Path,
        name: &str,
        content: &str,
        message: &str,
        when: i64,
    ) -> Oid {
        std::fs::write(dir.join(name), content).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let time = Time::new(when, 0);
        let sig = Signature::new("tester", "tester@example.com", &time).unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    #[test]
    fn commits_come_back_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        commit_at(&repo, dir.path(), "a.txt", "1\n", "first", 1_000);
        commit_at(&repo, dir.path(), "a.txt", "2\n", "second", 2_000);
        commit_at(&repo, dir.path(), "a.txt", "3\n", "third", 3_000);

        let commits = list_commits(&repo, &HistoryOptions::default()).unwrap();
        let summaries: Vec<_> = commits.iter().map(|c| c.summary.as_str()).collect();
        assert_eq!(summaries, vec!["third", "second", "first"]);
    }

    #[test]
    fn metadata_fields_are_filled() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        let first = commit_at(&repo, dir.path(), "a.txt", "1\n", "first", 1_000);
        let second = commit_at(&repo, dir.path(), "a.txt", "2\n", "second line\n\nbody", 2_000);

        let commits = list_commits(&repo, &HistoryOptions::default()).unwrap();
        assert_eq!(commits.len(), 2);

        let newest = &commits[0];
        assert_eq!(newest.id, second.to_string());
        assert_eq!(newest.summary, "second line");
        assert_eq!(newest.author, "tester");
        assert_eq!(newest.timestamp, 2_000);
        assert_eq!(newest.parents, vec![first.to_string()]);

        let root = &commits[1];
        assert!(root.parents.is_empty());
    }

    #[test]
    fn max_commits_caps_the_walk() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        for i in 0..5 {
            commit_at(
                &repo,
                dir.path(),
                "a.txt",
                &format!("{i}\n"),
                &format!("commit {i}"),
                1_000 + i,
            );
        }

        let options = HistoryOptions {
            branch: None,
            max_commits: Some(2),
        };
        let commits = list_commits(&repo, &options).unwrap();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].summary, "commit 4");
        assert_eq!(commits[1].summary, "commit 3");
    }

    #[test]
    fn branch_option_walks_from_that_tip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        let first = commit_at(&repo, dir.path(), "a.txt", "1\n", "first", 1_000);
        let commit = repo.find_commit(first).unwrap();
        repo.branch("frozen", &commit, false).unwrap();
        commit_at(&repo, dir.path(), "a.txt", "2\n", "second", 2_000);

        let options = HistoryOptions {
            branch: Some("frozen".into()),
            max_commits: None,
        };
        let commits = list_commits(&repo, &options).unwrap();
        let summaries: Vec<_> = commits.iter().map(|c| c.summary.as_str()).collect();
        assert_eq!(summaries, vec!["first"]);
    }

    #[test]
    fn commit_meta_serializes_camel_case() {
        let meta = CommitMeta {
            id: "a".repeat(40),
            summary: "fix it".into(),
            author: "alice".into(),
            timestamp: 1_700_000_000,
            parents: Vec::new(),
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert!(json.get("summary").is_some());
        assert!(json.get("timestamp").is_some());
        assert!(json.get("parents").is_some());
    }

    #[test]
    fn fix_detection_is_case_insensitive_substring() {
        let keywords = vec!["fix".to_string()];
        assert!(is_fix_message("fix parser crash", &keywords));
        assert!(is_fix_message("Fix parser crash", &keywords));
        assert!(is_fix_message("HOTFIX: rollback", &keywords));
        assert!(is_fix_message("Prefix tables correctly", &keywords));
        assert!(!is_fix_message("Add feature", &keywords));
        assert!(!is_fix_message("", &keywords));
    }

    #[test]
    fn any_keyword_qualifies() {
        let keywords = vec!["fix".to_string(), "bug".to_string()];
        assert!(is_fix_message("debug logging repaired", &keywords));
        assert!(is_fix_message("fixup: renames", &keywords));
        assert!(!is_fix_message("release 1.2", &keywords));
    }

    #[test]
    fn empty_keyword_list_matches_nothing() {
        assert!(!is_fix_message("fix everything", &[]));
        assert!(!is_fix_message("fix everything", &[String::new()]));
    }
}
