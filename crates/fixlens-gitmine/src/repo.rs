//! Repository access: open, clone, and tip resolution.

use std::path::Path;

use fixlens_core::{FixlensError, Result};
use git2::{Oid, Repository};

/// Open an existing git repository at `path`.
///
/// # Errors
///
/// Returns [`FixlensError::Git`] if `path` is not a git repository.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use fixlens_gitmine::repo::open_repository;
///
/// let repo = open_repository(Path::new(".")).unwrap();
/// assert!(!repo.is_bare());
/// ```
pub fn open_repository(path: &Path) -> Result<Repository> {
    Repository::open(path)
        .map_err(|e| FixlensError::Git(format!("failed to open repository: {e}")))
}

/// Clone the repository at `url` into `path`.
///
/// # Errors
///
/// Returns [`FixlensError::Git`] if the clone fails.
pub fn clone_repository(url: &str, path: &Path) -> Result<Repository> {
    Repository::clone(url, path)
        .map_err(|e| FixlensError::Git(format!("failed to clone '{url}': {e}")))
}

/// Open the repository at `path`, cloning it from `url` first if the path
/// does not exist yet.
///
/// # Errors
///
/// Returns [`FixlensError::Git`] if neither opening nor cloning succeeds.
pub fn open_or_clone(url: &str, path: &Path) -> Result<Repository> {
    if path.exists() {
        open_repository(path)
    } else {
        clone_repository(url, path)
    }
}

/// Resolve the commit a survey starts from: the tip of `branch`, or `HEAD`
/// when no branch is given.
///
/// Short names work: `"develop"` resolves the same way `git rev-parse
/// develop` would.
///
/// # Errors
///
/// Returns [`FixlensError::Git`] if the branch does not exist or the
/// reference has no target (an unborn `HEAD`, for example).
pub fn resolve_tip(repo: &Repository, branch: Option<&str>) -> Result<Oid> {
    let reference = match branch {
        Some(name) => repo
            .resolve_reference_from_short_name(name)
            .map_err(|e| FixlensError::Git(format!("failed to resolve branch '{name}': {e}")))?,
        None => repo
            .head()
            .map_err(|e| FixlensError::Git(format!("failed to resolve HEAD: {e}")))?,
    };
    reference
        .target()
        .ok_or_else(|| FixlensError::Git("reference has no target".into()))
}
