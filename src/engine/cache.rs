//! engine::cache
//!
//! Cache reconciliation and persistence.
//!
//! # Lifecycle
//!
//! [`StampFile::load`] reads the cache once at the start of a run (creating
//! an empty `{}` file when output is enabled and none exists) and keeps a
//! snapshot of what was read. Resolved stamps merge into the live map by
//! key. [`StampFile::persist`] runs once, strictly after all resolution:
//! when the live map deep-equals the snapshot the write is skipped
//! entirely, which is what keeps repeated runs from producing spurious
//! commits.
//!
//! # Version-control integration
//!
//! When a write happens, the cache file is staged if the explicit
//! `output_file_git_add` flag says so, or by default whenever a commit hook
//! is active. During a post-commit run a plain new commit is created for
//! the cache file (never an amend - amending would rewrite the triggering
//! commit and re-enter the hook chain). Outside a git workspace, staging
//! and committing degrade to a logged no-op.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::config::ResolvedOptions;
use crate::core::types::{CommitPhase, Stamp, StampCache};
use crate::git::Git;
use crate::ui::{self, Verbosity};

/// Marker prefix for the automated cache update commit; kept stable so
/// hook chains and history tooling can pattern-match it.
pub const AUTO_COMMIT_PREFIX: &str = "AUTO: Updated";

/// Errors from cache persistence.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache io failed for {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// What [`StampFile::persist`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// Output-to-file is not enabled; nothing to do.
    Disabled,
    /// The merged cache deep-equals what was read; write skipped.
    Unchanged,
    /// The cache file was written.
    Written {
        /// Whether the file was staged into the index.
        staged: bool,
        /// Whether a post-commit cache update commit was created.
        committed: bool,
    },
}

/// The stamp cache with its on-disk identity.
#[derive(Debug)]
pub struct StampFile {
    /// Effective cache path; `None` when no output file is configured.
    path: Option<PathBuf>,
    /// Deep-equality baseline: the entries as read at load time.
    snapshot: StampCache,
    /// Live entries, mutated as files resolve.
    pub entries: StampCache,
}

impl StampFile {
    /// Load the cache for this run.
    ///
    /// Missing file with output enabled: an empty `{}` file is created.
    /// Malformed JSON: a warning is logged and the run continues with an
    /// empty cache, so every file is treated as unstamped.
    pub fn load(opts: &ResolvedOptions, verbosity: Verbosity) -> Result<Self, CacheError> {
        let path = opts.output_file.as_deref().map(PathBuf::from);
        let Some(ref cache_path) = path else {
            return Ok(Self {
                path: None,
                snapshot: StampCache::new(),
                entries: StampCache::new(),
            });
        };

        let entries = if cache_path.exists() {
            match std::fs::read_to_string(cache_path) {
                Ok(raw) => match serde_json::from_str::<StampCache>(&raw) {
                    Ok(entries) => entries,
                    Err(err) => {
                        ui::warn(
                            format!(
                                "could not read cache file {}: {}",
                                cache_path.display(),
                                err
                            ),
                            verbosity,
                        );
                        StampCache::new()
                    }
                },
                Err(err) => {
                    ui::warn(
                        format!("could not read cache file {}: {}", cache_path.display(), err),
                        verbosity,
                    );
                    StampCache::new()
                }
            }
        } else {
            ui::debug(
                format!("cache file {} does not exist yet", cache_path.display()),
                verbosity,
            );
            if opts.writes_cache_file() {
                std::fs::write(cache_path, "{}").map_err(|source| CacheError::Io {
                    path: cache_path.clone(),
                    source,
                })?;
            }
            StampCache::new()
        };

        Ok(Self {
            path,
            snapshot: entries.clone(),
            entries,
        })
    }

    /// Merge freshly resolved stamps into the live map.
    pub fn merge(&mut self, results: impl IntoIterator<Item = (String, Stamp)>) {
        self.entries.extend(results);
    }

    /// Whether the live map differs from what was read at load time.
    pub fn is_dirty(&self) -> bool {
        self.entries != self.snapshot
    }

    /// Write the cache back to disk and reintegrate with git as configured.
    ///
    /// Runs once per run, after all resolution. Returns what happened so
    /// callers and tests can assert the skip/write decision.
    pub fn persist(
        &self,
        opts: &ResolvedOptions,
        verbosity: Verbosity,
    ) -> Result<PersistOutcome, CacheError> {
        if !opts.writes_cache_file() {
            return Ok(PersistOutcome::Disabled);
        }
        let Some(ref cache_path) = self.path else {
            return Ok(PersistOutcome::Disabled);
        };
        if !self.is_dirty() {
            ui::print("Saving of timestamps file skipped - nothing changed", verbosity);
            return Ok(PersistOutcome::Unchanged);
        }

        let json = serde_json::to_string_pretty(&self.entries)?;
        write_atomic(cache_path, &json)?;

        let phase = opts.git_commit_hook;
        let should_stage = opts.output_file_git_add.unwrap_or(phase.is_hook());
        if !should_stage {
            return Ok(PersistOutcome::Written {
                staged: false,
                committed: false,
            });
        }

        let root = Path::new(&opts.project_root);
        if !Git::is_repo(root) {
            // The stamp data itself is complete; only the reintegration is
            // skipped, so this is a warning rather than a failure.
            ui::warn(
                format!(
                    "{} is not a git repository; cache file left unstaged",
                    opts.project_root
                ),
                verbosity,
            );
            return Ok(PersistOutcome::Written {
                staged: false,
                committed: false,
            });
        }

        let git = match Git::open(root) {
            Ok(git) => git,
            Err(err) => {
                ui::warn(format!("cache file left unstaged: {}", err), verbosity);
                return Ok(PersistOutcome::Written {
                    staged: false,
                    committed: false,
                });
            }
        };
        if let Err(err) = git.stage(cache_path) {
            ui::warn(format!("could not stage cache file: {}", err), verbosity);
            return Ok(PersistOutcome::Written {
                staged: false,
                committed: false,
            });
        }

        let mut committed = false;
        if phase == CommitPhase::Post {
            // The enclosing commit already completed, so the refreshed
            // cache needs a commit of its own. The filter's self-exclusion
            // rule keeps this commit from re-triggering a scan of itself.
            let cache_name = cache_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| cache_path.display().to_string());
            let message = format!("{} {}", AUTO_COMMIT_PREFIX, cache_name);
            match git.commit_index(&message) {
                Ok(()) => committed = true,
                Err(err) => {
                    ui::warn(format!("could not commit cache file: {}", err), verbosity);
                }
            }
        }

        Ok(PersistOutcome::Written {
            staged: true,
            committed,
        })
    }
}

/// Write via a temp file in the same directory plus rename, so readers
/// never observe a half-written cache.
fn write_atomic(path: &Path, contents: &str) -> Result<(), CacheError> {
    let tmp_path = path.with_extension("json.tmp");
    let result = std::fs::write(&tmp_path, contents)
        .and_then(|()| std::fs::rename(&tmp_path, path));
    result.map_err(|source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    })
}
