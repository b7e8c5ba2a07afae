use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use fixlens_core::Result;

use crate::parse::ParseOutcome;

/// Identity of one file snapshot: its path plus the content identity of the
/// blob backing it. The blob string is opaque here; callers pass git object
/// ids, and tests pass whatever they like.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SnapshotKey {
    path: PathBuf,
    blob: String,
}

type Slot = Arc<Mutex<Option<Arc<ParseOutcome>>>>;

/// A parse cache scoped to one change-set.
///
/// Several hunks of a change-set routinely land in the same file snapshot;
/// the cache guarantees each `(path, blob)` pair is parsed at most once, and
/// that an [`Unparsable`](ParseOutcome::Unparsable) outcome is remembered
/// rather than retried. Create one cache per change-set and drop it when the
/// change-set is done — snapshots are not worth holding across commits.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use fixlens_syntax::cache::SnapshotCache;
/// use fixlens_syntax::parse::parse_source;
///
/// let cache = SnapshotCache::new();
/// let parses = AtomicUsize::new(0);
/// for _ in 0..3 {
///     cache
///         .get_or_parse(Path::new("A.java"), "blob-1", || {
///             parses.fetch_add(1, Ordering::SeqCst);
///             parse_source(Path::new("A.java"), b"class A {}")
///         })
///         .unwrap();
/// }
/// assert_eq!(parses.load(Ordering::SeqCst), 1);
/// ```
#[derive(Debug, Default)]
pub struct SnapshotCache {
    entries: Mutex<HashMap<SnapshotKey, Slot>>,
}

impl SnapshotCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached outcome for `(path, blob)`, running `parse` first if
    /// the snapshot has not been seen.
    ///
    /// Concurrent callers for the same key block until the first caller's
    /// `parse` finishes, so the closure runs at most once per key even under
    /// contention. A closure that returns `Err` caches nothing; the next
    /// caller retries.
    ///
    /// # Errors
    ///
    /// Propagates whatever error `parse` returns.
    pub fn get_or_parse(
        &self,
        path: &Path,
        blob: &str,
        parse: impl FnOnce() -> Result<ParseOutcome>,
    ) -> Result<Arc<ParseOutcome>> {
        let slot = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries
                .entry(SnapshotKey {
                    path: path.to_path_buf(),
                    blob: blob.to_string(),
                })
                .or_default()
                .clone()
        };

        // The per-snapshot lock is held across the parse itself; that is the
        // single-flight guarantee. Distinct snapshots never contend.
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(outcome) = guard.as_ref() {
            return Ok(Arc::clone(outcome));
        }
        let outcome = Arc::new(parse()?);
        *guard = Some(Arc::clone(&outcome));
        Ok(outcome)
    }

    /// Number of snapshots the cache has seen.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no snapshot has been requested yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
