//! Change-set classification: hunks to declarations to verdicts.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use fixlens_core::{DeclKey, Result};
use fixlens_gitmine::diffs::{blob_bytes, commit_file_diffs, ChangeStatus};
use fixlens_gitmine::filter::SourceFilter;
use fixlens_syntax::cache::SnapshotCache;
use fixlens_syntax::classify::classify;
use fixlens_syntax::parse::{parse_source, ParseOutcome};
use fixlens_syntax::policy::KindPolicy;
use fixlens_syntax::resolve::resolve;
use git2::Repository;
use serde::Serialize;

/// One declaration touched by a change-set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchedDeclaration {
    /// Identity of the declaration in its snapshot.
    pub key: DeclKey,
    /// Declared name, when the grammar provides one.
    pub name: Option<String>,
    /// Whether the declaration satisfies the policy.
    pub matched: bool,
}

/// Outcome of classifying one change-set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSetOutcome {
    /// The classified commit id.
    pub commit: String,
    /// Declarations touched by at least one hunk, each counted once,
    /// ordered by file and then span.
    pub touched: Vec<TouchedDeclaration>,
    /// Distinct file snapshots that would not parse.
    pub unparsable_files: usize,
}

/// Map every hunk of `commit_id` to its innermost enclosing declaration and
/// classify each touched declaration exactly once.
///
/// Deletions are skipped (no new side to parse), unparsable snapshots are
/// counted and skipped, and hunks that land outside any declaration are
/// dropped. Repetition is absorbed at the declaration level: several hunks
/// in one method, or the same file seen once per merge parent, still count
/// the declaration once.
///
/// # Errors
///
/// Returns [`FixlensError::Git`] if the commit or a blob cannot be read,
/// and [`FixlensError::UnknownNodeKind`] if a parsed tree holds a node kind
/// outside the taxonomy. The latter is deliberately fatal: it means the
/// grammar and the kind tables have drifted apart.
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
/// use fixlens_survey::pipeline::classify_change_set;
/// use fixlens_syntax::policy::build_policy;
///
/// let repo = open_repository(Path::new(".")).unwrap();
/// let policy = build_policy(&ClassifyConfig::default());
/// let id = "0123456789012345678901234567890123456789";
/// let outcome =
///     classify_change_set(&repo, id, policy.as_ref(), &SourceFilter::default()).unwrap();
/// println!("{} declarations touched", outcome.touched.len());
/// ```
pub fn classify_change_set(
    repo: &Repository,
    commit_id: &str,
    policy: &dyn KindPolicy,
    filter: &SourceFilter,
) -> Result<ChangeSetOutcome> {
    let diffs = commit_file_diffs(repo, commit_id, filter)?;

    // Snapshots live exactly as long as the change-set.
    let cache = SnapshotCache::new();
    let mut touched: HashMap<DeclKey, TouchedDeclaration> = HashMap::new();
    let mut unparsable: HashSet<(PathBuf, String)> = HashSet::new();

    for diff in &diffs {
        if diff.status == ChangeStatus::Deleted {
            continue;
        }
        let Some(blob) = diff.new_blob.as_deref() else {
            continue;
        };

        let outcome = cache.get_or_parse(&diff.new_path, blob, || {
            let bytes = blob_bytes(repo, blob)?;
            parse_source(&diff.new_path, &bytes)
        })?;
        let tree = match outcome.as_ref() {
            ParseOutcome::Tree(tree) => tree,
            ParseOutcome::Unparsable { .. } => {
                unparsable.insert((diff.new_path.clone(), blob.to_string()));
                continue;
            }
        };

        for hunk in &diff.hunks {
            let Some(decl) = resolve(tree, hunk)? else {
                continue;
            };
            if touched.contains_key(&decl.key) {
                continue;
            }
            let classification = classify(tree, decl.node, policy)?;
            touched.insert(
                decl.key.clone(),
                TouchedDeclaration {
                    key: decl.key,
                    name: decl.name,
                    matched: classification.matched,
                },
            );
        }
    }

    let mut touched: Vec<TouchedDeclaration> = touched.into_values().collect();
    touched.sort_by(|a, b| {
        a.key
            .file
            .cmp(&b.key.file)
            .then_with(|| a.key.span.begin.cmp(&b.key.span.begin))
    });

    Ok(ChangeSetOutcome {
        commit: commit_id.to_string(),
        touched,
        unparsable_files: unparsable.len(),
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use fixlens_core::ClassifyConfig;
    use fixlens_syntax::policy::build_policy;
    use git2::{Commit, Oid, Signature};

    use super::*;

    const ACCOUNT_V1: &str = "\
class Account {
    int balance;

    void deposit(int amount) {
        assert amount > 0;
        balance += amount;
    }

    int read() {
        return balance;
    }
}
";

    const ACCOUNT_DEPOSIT_FIX: &str = "\
class Account {
    int balance;

    void deposit(int amount) {
        assert amount > 0 : \"amount\";
        balance += amount;
    }

    int read() {
        return balance;
    }
}
";

    const ACCOUNT_READ_FIX: &str = "\
class Account {
    int balance;

    void deposit(int amount) {
        assert amount > 0;
        balance += amount;
    }

    int read() {
        return this.balance;
    }
}
";

    const AUDIT_V1: &str = "\
class Audit {
    void log(int a, int b) {
        assert a > 0;
        int x = a;
        int y = b;
        int z = x + y;
    }
}
";

    const AUDIT_V2: &str = "\
class Audit {
    void log(int a, int b) {
        assert a >= 0;
        int x = a;
        int y = b;
        int z = x * y;
    }
}
";

    fn init_repo(dir: &Path) -> Repository {
        let repo = Repository::init(dir).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "tester").unwrap();
            config.set_str("user.email", "tester@example.com").unwrap();
        }
        repo
    }

    fn plain_commit(
        repo: &Repository,
        files: &[(&str, &str)],
        message: &str,
        parents: &[&Commit<'_>],
    ) -> Oid {
        let mut builder = repo.treebuilder(None).unwrap();
        for (name, content) in files {
            let blob = repo.blob(content.as_bytes()).unwrap();
            builder.insert(*name, blob, 0o100644).unwrap();
        }
        let tree_id = builder.write().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("tester", "tester@example.com").unwrap();
        repo.commit(None, &sig, &sig, message, &tree, parents)
            .unwrap()
    }

    fn assert_policy() -> Box<dyn KindPolicy> {
        build_policy(&ClassifyConfig::default())
    }

    #[test]
    fn fix_inside_assert_method_matches() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        let base = plain_commit(&repo, &[("Account.java", ACCOUNT_V1)], "initial", &[]);
        let base_commit = repo.find_commit(base).unwrap();
        let fix = plain_commit(
            &repo,
            &[("Account.java", ACCOUNT_DEPOSIT_FIX)],
            "fix: explain assertion",
            &[&base_commit],
        );

        let outcome = classify_change_set(
            &repo,
            &fix.to_string(),
            assert_policy().as_ref(),
            &SourceFilter::default(),
        )
        .unwrap();

        assert_eq!(outcome.commit, fix.to_string());
        assert_eq!(outcome.unparsable_files, 0);
        assert_eq!(outcome.touched.len(), 1);

        let touched = &outcome.touched[0];
        assert_eq!(touched.name.as_deref(), Some("deposit"));
        assert_eq!(touched.key.file, Path::new("Account.java"));
        assert!(touched.matched);
    }

    #[test]
    fn fix_in_plain_method_does_not_match() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        let base = plain_commit(&repo, &[("Account.java", ACCOUNT_V1)], "initial", &[]);
        let base_commit = repo.find_commit(base).unwrap();
        let fix = plain_commit(
            &repo,
            &[("Account.java", ACCOUNT_READ_FIX)],
            "fix: qualify field read",
            &[&base_commit],
        );

        let outcome = classify_change_set(
            &repo,
            &fix.to_string(),
            assert_policy().as_ref(),
            &SourceFilter::default(),
        )
        .unwrap();

        assert_eq!(outcome.touched.len(), 1);
        let touched = &outcome.touched[0];
        assert_eq!(touched.name.as_deref(), Some("read"));
        assert!(!touched.matched);
    }

    #[test]
    fn two_hunks_in_one_method_count_it_once() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        let base = plain_commit(&repo, &[("Audit.java", AUDIT_V1)], "initial", &[]);
        let base_commit = repo.find_commit(base).unwrap();
        // Lines 3 and 6 change; with zero context they stay separate hunks.
        let fix = plain_commit(
            &repo,
            &[("Audit.java", AUDIT_V2)],
            "fix: audit math",
            &[&base_commit],
        );

        let outcome = classify_change_set(
            &repo,
            &fix.to_string(),
            assert_policy().as_ref(),
            &SourceFilter::default(),
        )
        .unwrap();

        assert_eq!(outcome.touched.len(), 1);
        assert_eq!(outcome.touched[0].name.as_deref(), Some("log"));
        assert!(outcome.touched[0].matched);
    }

    #[test]
    fn unparsable_snapshot_is_counted_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        let base = plain_commit(&repo, &[("Account.java", ACCOUNT_V1)], "initial", &[]);
        let base_commit = repo.find_commit(base).unwrap();
        let fix = plain_commit(
            &repo,
            &[("Account.java", ACCOUNT_V1), ("Broken.java", "class {{{")],
            "fix: land generated stub",
            &[&base_commit],
        );

        let outcome = classify_change_set(
            &repo,
            &fix.to_string(),
            assert_policy().as_ref(),
            &SourceFilter::default(),
        )
        .unwrap();

        assert_eq!(outcome.unparsable_files, 1);
        assert!(outcome.touched.is_empty());
    }

    #[test]
    fn deleted_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        let base = plain_commit(
            &repo,
            &[("Account.java", ACCOUNT_V1), ("Audit.java", AUDIT_V1)],
            "initial",
            &[],
        );
        let base_commit = repo.find_commit(base).unwrap();
        let fix = plain_commit(
            &repo,
            &[("Account.java", ACCOUNT_V1)],
            "fix: drop audit",
            &[&base_commit],
        );

        let outcome = classify_change_set(
            &repo,
            &fix.to_string(),
            assert_policy().as_ref(),
            &SourceFilter::default(),
        )
        .unwrap();

        assert!(outcome.touched.is_empty());
        assert_eq!(outcome.unparsable_files, 0);
    }

    #[test]
    fn touched_declarations_come_out_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        let base = plain_commit(
            &repo,
            &[("Account.java", ACCOUNT_V1), ("Audit.java", AUDIT_V1)],
            "initial",
            &[],
        );
        let base_commit = repo.find_commit(base).unwrap();
        let fix = plain_commit(
            &repo,
            &[("Account.java", ACCOUNT_READ_FIX), ("Audit.java", AUDIT_V2)],
            "fix: both files",
            &[&base_commit],
        );

        let outcome = classify_change_set(
            &repo,
            &fix.to_string(),
            assert_policy().as_ref(),
            &SourceFilter::default(),
        )
        .unwrap();

        let names: Vec<_> = outcome
            .touched
            .iter()
            .map(|t| t.name.as_deref().unwrap())
            .collect();
        assert_eq!(names, vec!["read", "log"]);
    }
}
