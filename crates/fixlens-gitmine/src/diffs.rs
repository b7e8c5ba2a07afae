//! Per-commit diff extraction with zero-context hunks.
//!
//! A change-set is diffed against each of its parents, so a merge commit
//! contributes one pass per parent. Hunks come out in new-side coordinates
//! with no context lines, which is what the hunk-to-declaration resolver
//! expects.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use fixlens_core::{FixlensError, Hunk, Result};
use git2::{Delta, DiffOptions, Oid, Repository};

use crate::filter::SourceFilter;

/// Status of a file within one diff pass.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeStatus {
    /// New file.
    Added,
    /// Existing file modified.
    Modified,
    /// File removed.
    Deleted,
}

/// One source file touched by a diff pass, with its hunks.
///
/// `new_blob` identifies the post-change content; it is `None` for a
/// deletion, which has no new side to parse. For a deletion `new_path`
/// still names the file (git keeps the old path on both sides).
#[derive(Debug, Clone, PartialEq)]
pub struct FileDiff {
    /// Path before the change; `None` for an added file.
    pub old_path: Option<PathBuf>,
    /// Path after the change, relative to the repository root.
    pub new_path: PathBuf,
    /// Blob id of the new content in hex; `None` for a deletion.
    pub new_blob: Option<String>,
    /// What happened to the file.
    pub status: ChangeStatus,
    /// Edited regions in new-side coordinates.
    pub hunks: Vec<Hunk>,
}

/// Extract the source-file diffs of one commit, one pass per parent.
///
/// A root commit has no parent to diff against and yields an empty list. A
/// merge commit yields the concatenation of its per-parent passes; the same
/// file can appear once per parent, and downstream deduplication by
/// declaration identity absorbs the repetition.
///
/// # Errors
///
/// Returns [`FixlensError::Git`] if `commit_id` is not a full commit id in
/// hex, or if the diff cannot be computed.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use fixlens_gitmine::diffs::commit_file_diffs;
/// use fixlens_gitmine::filter::SourceFilter;
/// use fixlens_gitmine::repo::open_repository;
///
/// let repo = open_repository(Path::new(".")).unwrap();
/// let id = "0123456789012345678901234567890123456789";
/// let diffs = commit_file_diffs(&repo, id, &SourceFilter::default()).unwrap();
/// for d in &diffs {
///     println!("{}: {} hunks", d.new_path.display(), d.hunks.len());
/// }
/// ```
pub fn commit_file_diffs(
    repo: &Repository,
    commit_id: &str,
    filter: &SourceFilter,
) -> Result<Vec<FileDiff>> {
    let oid = Oid::from_str(commit_id)
        .map_err(|e| FixlensError::Git(format!("invalid commit id '{commit_id}': {e}")))?;
    let commit = repo
        .find_commit(oid)
        .map_err(|e| FixlensError::Git(format!("failed to find commit {commit_id}: {e}")))?;
    let tree = commit
        .tree()
        .map_err(|e| FixlensError::Git(format!("failed to get commit tree: {e}")))?;

    let mut files = Vec::new();
    for parent_idx in 0..commit.parent_count() {
        let parent = commit
            .parent(parent_idx)
            .map_err(|e| FixlensError::Git(format!("failed to get parent: {e}")))?;
        let parent_tree = parent
            .tree()
            .map_err(|e| FixlensError::Git(format!("failed to get parent tree: {e}")))?;

        let mut diff_opts = DiffOptions::new();
        diff_opts.context_lines(0);
        let diff = repo
            .diff_tree_to_tree(Some(&parent_tree), Some(&tree), Some(&mut diff_opts))
            .map_err(|e| FixlensError::Git(format!("failed to compute diff: {e}")))?;

        collect_file_diffs(&diff, filter, &mut files)?;
    }

    Ok(files)
}

fn collect_file_diffs(
    diff: &git2::Diff<'_>,
    filter: &SourceFilter,
    files: &mut Vec<FileDiff>,
) -> Result<()> {
    let first_new = files.len();

    for delta_idx in 0..diff.deltas().len() {
        let delta = diff.get_delta(delta_idx).unwrap();

        let status = match delta.status() {
            Delta::Added => ChangeStatus::Added,
            Delta::Deleted => ChangeStatus::Deleted,
            _ => ChangeStatus::Modified,
        };

        let Some(new_path) = delta.new_file().path() else {
            continue;
        };
        let new_path = new_path.to_path_buf();
        if !filter.is_source(&new_path) {
            continue;
        }

        let old_path = match status {
            ChangeStatus::Added => None,
            _ => delta.old_file().path().map(Path::to_path_buf),
        };
        let new_blob = match status {
            ChangeStatus::Deleted => None,
            _ => {
                let id = delta.new_file().id();
                (!id.is_zero()).then(|| id.to_string())
            }
        };

        files.push(FileDiff {
            old_path,
            new_path,
            new_blob,
            status,
            hunks: Vec::new(),
        });
    }

    // Hunk callbacks run per delta in diff order; collect per path and
    // attach afterwards, the way the delta loop above stays borrow-free.
    let mut hunks: HashMap<PathBuf, Vec<Hunk>> = HashMap::new();
    diff.foreach(
        &mut |_delta, _progress| true,
        None,
        Some(&mut |delta, hunk| {
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(Path::to_path_buf);
            if let Some(path) = path {
                hunks.entry(path.clone()).or_default().push(Hunk {
                    file_path: path,
                    new_start: hunk.new_start(),
                    new_lines: hunk.new_lines(),
                });
            }
            true
        }),
        None,
    )
    .map_err(|e| FixlensError::Git(format!("failed to iterate diff hunks: {e}")))?;

    for file in &mut files[first_new..] {
        if let Some(file_hunks) = hunks.remove(&file.new_path) {
            file.hunks = file_hunks;
        }
    }

    Ok(())
}

/// Read the raw bytes of a blob by its hex id.
///
/// # Errors
///
/// Returns [`FixlensError::Git`] if the id is malformed or the blob does
/// not exist in the object database.
pub fn blob_bytes(repo: &Repository, blob_id: &str) -> Result<Vec<u8>> {
    let oid = Oid::from_str(blob_id)
        .map_err(|e| FixlensError::Git(format!("invalid blob id '{blob_id}': {e}")))?;
    let blob = repo
        .find_blob(oid)
        .map_err(|e| FixlensError::Git(format!("failed to read blob {blob_id}: {e}")))?;
    Ok(blob.content().to_vec())
}
