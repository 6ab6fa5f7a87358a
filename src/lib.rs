//! Stampwork - file created/modified timestamps from git history
//!
//! Stampwork resolves per-file "created" and "modified" Unix timestamps
//! for a project, preferring version-control history over raw filesystem
//! metadata, and persists the results to a JSON cache that is reused
//! across runs and optionally committed back to the repository. It runs
//! standalone or from a pre-/post-commit hook.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to the engine)
//! - [`engine`] - Orchestrates filter -> resolve -> persist for one run
//! - [`core`] - Domain types, configuration resolution, path utilities
//! - [`git`] - Single interface for all git operations
//! - [`ui`] - Console output utilities
//!
//! # Resolution strategy
//!
//! For each selected file, three layers are consulted in order: the
//! persisted cache (a known "created" time is never recomputed), git
//! history (earliest commit time for created, latest rename-following
//! commit time for modified), and filesystem metadata as the fallback.
//! Any field still unresolved at the end is replaced with the current
//! time, so persisted stamps are always strictly positive.
//!
//! # Example
//!
//! ```no_run
//! use stampwork::core::config::{Options, ResolvedOptions};
//! use stampwork::engine;
//! use stampwork::ui::Verbosity;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let opts = ResolvedOptions::resolve(Options {
//!     output_to_file: true,
//!     ..Options::default()
//! })?;
//! let cache = engine::run(&opts, Verbosity::Normal).await?;
//! println!("{} files stamped", cache.len());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod ui;
