//! Source file enumeration at a branch tip.

use std::path::PathBuf;

use fixlens_core::{FixlensError, Result};
use git2::{ObjectType, Repository, TreeWalkMode, TreeWalkResult};

use crate::filter::SourceFilter;
use crate::repo::resolve_tip;

/// A source file of the tip tree, identified by path and blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the repository root.
    pub path: PathBuf,
    /// Blob id of the content in hex.
    pub blob: String,
}

/// List the source files reachable from the tip of `branch` (or `HEAD`), in
/// tree order.
///
/// # Errors
///
/// Returns [`FixlensError::Git`] if the tip cannot be resolved or its tree
/// cannot be walked.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use fixlens_gitmine::filter::SourceFilter;
/// use fixlens_gitmine::headwalk::head_source_files;
/// use fixlens_gitmine::repo::open_repository;
///
/// let repo = open_repository(Path::new(".")).unwrap();
/// let files = head_source_files(&repo, None, &SourceFilter::default()).unwrap();
/// println!("{} source files at HEAD", files.len());
/// ```
pub fn head_source_files(
    repo: &Repository,
    branch: Option<&str>,
    filter: &SourceFilter,
) -> Result<Vec<SourceFile>> {
    let tip = resolve_tip(repo, branch)?;
    let commit = repo
        .find_commit(tip)
        .map_err(|e| FixlensError::Git(format!("failed to find tip commit: {e}")))?;
    let tree = commit
        .tree()
        .map_err(|e| FixlensError::Git(format!("failed to get tip tree: {e}")))?;

    let mut files = Vec::new();
    tree.walk(TreeWalkMode::PreOrder, |root, entry| {
        if entry.kind() == Some(ObjectType::Blob) {
            if let Some(name) = entry.name() {
                // `root` is the directory prefix, empty or "/"-terminated.
                let path = PathBuf::from(format!("{root}{name}"));
                if filter.is_source(&path) {
                    files.push(SourceFile {
                        path,
                        blob: entry.id().to_string(),
                    });
                }
            }
        }
        TreeWalkResult::Ok
    })
    .map_err(|e| FixlensError::Git(format!("failed to walk tip tree: {e}")))?;

    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use git2::{Oid, Signature};

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

    fn commit_files(repo: &Repository, dir: &Path, files: &[(&str, &str)], message: &str) -> Oid {
        let mut index = repo.index().unwrap();
        for (name, content) in files {
            let path = dir.join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&path, content).unwrap();
            index.add_path(Path::new(name)).unwrap();
        }
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("tester", "tester@example.com").unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    #[test]
    fn walks_nested_trees_and_filters_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        commit_files(
            &repo,
            dir.path(),
            &[
                ("src/app/Main.java", "class Main {}\n"),
                ("src/app/util/Text.java", "class Text {}\n"),
                ("README.md", "docs\n"),
                ("build.gradle", "plugins {}\n"),
            ],
            "initial",
        );

        let files = head_source_files(&repo, None, &SourceFilter::default()).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("src/app/Main.java"),
                PathBuf::from("src/app/util/Text.java"),
            ]
        );
    }

    #[test]
    fn blob_ids_identify_content() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        commit_files(
            &repo,
            dir.path(),
            &[
                ("A.java", "class A {}\n"),
                ("B.java", "class A {}\n"),
                ("C.java", "class C {}\n"),
            ],
            "initial",
        );

        let files = head_source_files(&repo, None, &SourceFilter::default()).unwrap();
        assert_eq!(files.len(), 3);
        // Identical content means identical blobs, regardless of path.
        assert_eq!(files[0].blob, files[1].blob);
        assert_ne!(files[0].blob, files[2].blob);
    }

    #[test]
    fn branch_selects_an_older_tree() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        let first = commit_files(&repo, dir.path(), &[("A.java", "class A {}\n")], "first");
        let commit = repo.find_commit(first).unwrap();
        repo.branch("frozen", &commit, false).unwrap();
        commit_files(&repo, dir.path(), &[("B.java", "class B {}\n")], "second");

        let head = head_source_files(&repo, None, &SourceFilter::default()).unwrap();
        assert_eq!(head.len(), 2);

        let frozen = head_source_files(&repo, Some("frozen"), &SourceFilter::default()).unwrap();
        let paths: Vec<_> = frozen.iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("A.java")]);
    }

    #[test]
    fn skip_patterns_apply_to_tree_paths() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_repo(dir.path());
        commit_files(
            &repo,
            dir.path(),
            &[
                ("src/Main.java", "class Main {}\n"),
                ("gen/Stub.java", "class Stub {}\n"),
            ],
            "initial",
        );

        let filter = SourceFilter::from_config(&fixlens_core::FilterConfig {
            extensions: vec!["java".into()],
            skip_patterns: vec!["gen/**".into()],
        })
        .unwrap();
        let files = head_source_files(&repo, None, &filter).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("src/Main.java")]);
    }
}
