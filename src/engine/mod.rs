//! engine
//!
//! Orchestrates one extraction run: filter -> resolve -> persist.
//!
//! # Control flow
//!
//! 1. Verify the project root is inside a git repository (fatal otherwise,
//!    checked eagerly before any per-file work).
//! 2. Load the stamp cache and snapshot it for the change diff.
//! 3. Compute the file list via the filter engine.
//! 4. Resolve every file on a bounded pool of blocking workers; each file
//!    consults its own cache entry and writes to its own key, so the merge
//!    happens key-by-key on the coordinating task with no shared mutable
//!    state crossing threads.
//! 5. Persist once, strictly after all resolution completes, then return
//!    the full merged cache.
//!
//! # Failure model
//!
//! Per-file resolution failures (including a panicked worker) are logged
//! and skipped; only the systemic not-a-repository precondition and cache
//! IO failures abort the run.

pub mod cache;
pub mod filter;
pub mod resolver;

use std::path::Path;

use thiserror::Error;
use tokio::task::JoinSet;

use crate::core::config::ResolvedOptions;
use crate::core::types::{Stamp, StampCache};
use crate::git::{Git, GitError};
use crate::ui::{self, Verbosity};

pub use cache::{PersistOutcome, StampFile, AUTO_COMMIT_PREFIX};
pub use filter::collect_files;
pub use resolver::resolve_stamp;

/// Width of the blocking worker pool for per-file resolution.
const MAX_CONCURRENT_RESOLVES: usize = 8;

/// Errors that abort an entire run.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The project root is not inside a git-initialized workspace. Run
    /// `git init` there first.
    #[error("{0} - run `git init` in the project root first")]
    NotARepo(#[source] GitError),

    /// The cache file could not be created or written.
    #[error(transparent)]
    Cache(#[from] cache::CacheError),
}

/// Run one extraction pass and return the merged stamp cache.
///
/// # Errors
///
/// Returns [`EngineError::NotARepo`] before any per-file work when the
/// project root is not under version control, and [`EngineError::Cache`]
/// when cache persistence fails. Per-file resolution failures never
/// surface here.
pub async fn run(
    opts: &ResolvedOptions,
    verbosity: Verbosity,
) -> Result<StampCache, EngineError> {
    let git = Git::open(Path::new(&opts.project_root)).map_err(EngineError::NotARepo)?;

    let mut stamp_file = StampFile::load(opts, verbosity)?;
    let files = collect_files(opts, verbosity);

    if !files.is_empty() {
        ui::print(
            format!("{} files queued up. Starting scrape...", files.len()),
            verbosity,
        );
    }

    let total = files.len();
    let mut results: Vec<(String, Stamp)> = Vec::with_capacity(total);
    let mut workers: JoinSet<(String, Stamp)> = JoinSet::new();

    for (index, entry) in files.into_iter().enumerate() {
        // Bounded pool: once the pool is full, wait for one worker before
        // spawning the next.
        while workers.len() >= MAX_CONCURRENT_RESOLVES {
            drain_one(&mut workers, &mut results).await;
        }

        ui::debug(
            format!(
                "scraping date info for file #{} / {} ---> {}",
                index + 1,
                total,
                entry.relative_path
            ),
            verbosity,
        );

        let git = git.clone();
        let prior = stamp_file.entries.get(&entry.relative_path).copied();
        let phase = opts.git_commit_hook;
        let force_created_refresh = opts.force_created_refresh;
        workers.spawn_blocking(move || {
            let stamp = resolve_stamp(&git, &entry, prior, phase, force_created_refresh, verbosity);
            (entry.relative_path, stamp)
        });
    }

    while !workers.is_empty() {
        drain_one(&mut workers, &mut results).await;
    }

    stamp_file.merge(results);
    stamp_file.persist(opts, verbosity)?;

    Ok(stamp_file.entries.clone())
}

/// Collect one finished worker. A panicked worker loses only its own file.
async fn drain_one(workers: &mut JoinSet<(String, Stamp)>, results: &mut Vec<(String, Stamp)>) {
    if let Some(joined) = workers.join_next().await {
        match joined {
            Ok(pair) => results.push(pair),
            Err(err) => ui::error(format!("resolution worker failed: {}", err)),
        }
    }
}
