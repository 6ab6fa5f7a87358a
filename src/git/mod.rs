//! git
//!
//! Single interface for all git operations.
//!
//! # Architecture
//!
//! This module is the only doorway to git. Repository discovery, staging,
//! and commit creation use the `git2` crate; the two history time queries
//! (earliest commit touching a path, latest commit touching a path
//! following renames) shell out to the `git` executable. No other module
//! imports `git2` or spawns `git`.
//!
//! # Responsibilities
//!
//! - Repository discovery (`is this directory under version control`)
//! - Earliest/latest commit time for a path
//! - Staging the cache file
//! - Creating the post-commit cache update commit

mod interface;

pub use interface::{Git, GitError};
