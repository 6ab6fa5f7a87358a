//! engine::resolver
//!
//! Per-file timestamp resolution.
//!
//! # Strategy
//!
//! Three layers, consulted in order:
//! 1. the existing cache entry (a resolved `created` is never recomputed
//!    unless a refresh is forced),
//! 2. git history (earliest commit time for `created`, latest following
//!    renames for `modified`),
//! 3. filesystem metadata as the fallback.
//!
//! The active [`CommitPhase`] changes the `modified` source: during a
//! pre-commit hook the triggering change is not committed yet, so history
//! is one generation stale and the live mtime is authoritative. After the
//! commit (post, or standalone against a clean tree) history is
//! authoritative.
//!
//! # Failure containment
//!
//! A failed git query or stat is logged and resolution falls through to
//! the zero-replacement rule; one file's failure never aborts the batch.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::core::types::{CommitPhase, FileEntry, Stamp};
use crate::git::{Git, GitError};
use crate::ui::{self, Verbosity};

/// Errors from resolving a single file, all recoverable at batch level.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error("stat failed: {0}")]
    Stat(#[from] std::io::Error),
}

/// Resolve the stamp for one file.
///
/// `prior` is the existing cache entry, if any. The returned stamp always
/// satisfies the positivity invariant: any field still unresolved after
/// history and filesystem fallbacks is replaced with the current time.
pub fn resolve_stamp(
    git: &Git,
    entry: &FileEntry,
    prior: Option<Stamp>,
    phase: CommitPhase,
    force_created_refresh: bool,
    verbosity: Verbosity,
) -> Stamp {
    let mut stamp = prior.unwrap_or_default();
    if let Err(err) = fill_from_sources(git, entry, &mut stamp, phase, force_created_refresh) {
        ui::warn(
            format!("date resolution failed for {}: {}", entry.full_path, err),
            verbosity,
        );
    }
    stamp.replace_zeros(unix_now_seconds());
    stamp
}

/// Populate stamp fields from git history and filesystem metadata.
///
/// Leaves a field at zero when no source produced a usable value.
fn fill_from_sources(
    git: &Git,
    entry: &FileEntry,
    stamp: &mut Stamp,
    phase: CommitPhase,
    force_created_refresh: bool,
) -> Result<(), ResolveError> {
    let path = entry.full_path.as_str();

    if stamp.created == 0 || force_created_refresh {
        let mut created = git.first_commit_seconds(path)?;
        if created.is_none() && phase != CommitPhase::Post {
            // Pre-commit (or standalone) can see files with no history yet;
            // fall back to filesystem birth. Post-commit leaves the field
            // for zero-replacement instead, since the commit that should
            // have introduced the file is already in history.
            created = fs_birth_seconds(Path::new(path))?;
        }
        if let Some(seconds) = created {
            stamp.created = seconds;
        }
    }

    // Modified is recomputed on every run.
    let mut modified = None;
    if phase != CommitPhase::Pre {
        modified = git.latest_commit_seconds(path)?;
    }
    if modified.is_none() {
        modified = Some(fs_mtime_seconds(Path::new(path))?);
    }
    if let Some(seconds) = modified {
        stamp.modified = seconds;
    }

    Ok(())
}

/// Proxy for a file's creation time: the lowest of the metadata timestamps
/// the platform exposes. True birth time is not available everywhere, and
/// the oldest observable time is the closest safe approximation.
fn fs_birth_seconds(path: &Path) -> Result<Option<u64>, std::io::Error> {
    let metadata = std::fs::metadata(path)?;
    let candidates = [
        metadata.created().ok(),
        metadata.modified().ok(),
        metadata.accessed().ok(),
    ];
    Ok(candidates
        .into_iter()
        .flatten()
        .filter_map(system_time_seconds)
        .min())
}

/// The file's modification time in seconds since epoch.
fn fs_mtime_seconds(path: &Path) -> Result<u64, std::io::Error> {
    let modified = std::fs::metadata(path)?.modified()?;
    Ok(system_time_seconds(modified).unwrap_or(0))
}

fn system_time_seconds(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH)
        .ok()
        .map(|duration| duration.as_secs())
}

/// Current wall-clock time in seconds since epoch.
pub fn unix_now_seconds() -> u64 {
    let now = chrono::Utc::now().timestamp();
    u64::try_from(now).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_for(path: &Path) -> FileEntry {
        let full = crate::core::paths::posix_normalize(path);
        let name = crate::core::paths::file_name(&full).to_string();
        FileEntry {
            full_path: full,
            relative_path: name,
        }
    }

    #[test]
    fn failed_queries_still_yield_positive_stamps() {
        // A directory that is not a git repository: the first history
        // query fails, resolution stops there, and zero-replacement fills
        // both fields.
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("alpha.txt");
        std::fs::write(&file, "alpha").unwrap();

        let git = Git::detached(dir.path());
        let stamp = resolve_stamp(
            &git,
            &entry_for(&file),
            None,
            CommitPhase::None,
            false,
            Verbosity::Quiet,
        );
        assert!(stamp.is_resolved());
    }

    #[test]
    fn partially_computed_stamp_survives_a_failed_query() {
        // With a resolved prior stamp, the created lookup is skipped; the
        // modified lookup fails outside a repository, so the prior value
        // stays and is returned as-is.
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("alpha.txt");
        std::fs::write(&file, "alpha").unwrap();

        let git = Git::detached(dir.path());
        let prior = Stamp {
            created: 100,
            modified: 7,
        };
        let stamp = resolve_stamp(
            &git,
            &entry_for(&file),
            Some(prior),
            CommitPhase::None,
            false,
            Verbosity::Quiet,
        );
        assert_eq!(stamp.created, 100);
        assert_eq!(stamp.modified, 7);
    }

    #[test]
    fn missing_file_outside_history_gets_current_time() {
        let dir = tempfile::tempdir().unwrap();
        let ghost = dir.path().join("ghost.txt");

        let git = Git::detached(dir.path());
        let before = unix_now_seconds();
        let stamp = resolve_stamp(
            &git,
            &entry_for(&ghost),
            None,
            CommitPhase::None,
            false,
            Verbosity::Quiet,
        );
        assert!(stamp.created >= before);
        assert!(stamp.modified >= before);
    }
}
