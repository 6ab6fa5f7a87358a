//! core::types
//!
//! Domain types for timestamp extraction.
//!
//! # Types
//!
//! - [`Stamp`] - created/modified Unix timestamp pair for one file
//! - [`StampCache`] - persisted mapping from relative path to [`Stamp`]
//! - [`CommitPhase`] - which git lifecycle hook (if any) triggered the run
//! - [`FileEntry`] - a file selected for resolution
//!
//! # Invariants
//!
//! A finalized [`Stamp`] holds strictly positive values in both fields.
//! Internally, `0` is the sentinel for "not yet resolved"; the resolver
//! replaces any remaining zero with the current wall-clock time before a
//! stamp is returned or persisted.
//!
//! # Legacy cache data
//!
//! Earlier versions of the cache schema allowed boolean or missing fields.
//! Deserialization is lenient at this boundary: any value that is not a
//! strictly positive integer normalizes to `0`, which simply causes the
//! field to be recomputed on the next run.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Persisted mapping from a project-root-relative posix path to its stamp.
///
/// A `BTreeMap` keeps the serialized cache sorted and deterministic, which
/// keeps diffs small for a file that is meant to be committed.
pub type StampCache = BTreeMap<String, Stamp>;

/// Created/modified Unix timestamps (seconds) for a single file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    /// When the file first appeared, per git history (or fallbacks).
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub created: u64,

    /// When the file last changed, per git history (or fallbacks).
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub modified: u64,
}

impl Stamp {
    /// Whether both fields carry resolved (strictly positive) values.
    pub fn is_resolved(&self) -> bool {
        self.created > 0 && self.modified > 0
    }

    /// Replace any zero field with the given fallback time.
    ///
    /// This enforces the invariant that finalized stamps are strictly
    /// positive: a zero survives resolution only when neither git history
    /// nor the filesystem produced a usable value (brand-new file).
    pub fn replace_zeros(&mut self, fallback_seconds: u64) {
        if self.created == 0 {
            self.created = fallback_seconds;
        }
        if self.modified == 0 {
            self.modified = fallback_seconds;
        }
    }
}

/// Accept legacy field encodings: positive integers pass through, while
/// booleans, negatives, fractions, and missing values normalize to zero.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value.as_u64() {
        Some(seconds) => seconds,
        None => 0,
    })
}

/// Check that a raw timestamp value parsed from an external source is
/// usable: a decimal integer strictly greater than zero.
pub fn is_valid_stamp_seconds(value: i64) -> bool {
    value > 0
}

/// A file selected by the filter engine for timestamp resolution.
///
/// Both paths are posix normalized; `full_path` is absolute and
/// `relative_path` (the cache key) is relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub full_path: String,
    pub relative_path: String,
}

/// Errors from parsing a commit phase string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid commit phase: {0} (expected pre, post, or none)")]
pub struct InvalidPhase(pub String);

/// Which git lifecycle hook triggered the run.
///
/// The phase drives where the resolver sources its `modified` value from
/// (committed history vs live filesystem) and whether the persister creates
/// a follow-up commit for the cache file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitPhase {
    /// Running from a pre-commit hook; the triggering change is not yet in
    /// history.
    Pre,
    /// Running from a post-commit hook; the triggering change is committed.
    Post,
    /// Standalone run with no commit in flight.
    #[default]
    None,
}

impl CommitPhase {
    /// Whether a commit hook is active (pre or post).
    pub fn is_hook(&self) -> bool {
        !matches!(self, CommitPhase::None)
    }
}

impl FromStr for CommitPhase {
    type Err = InvalidPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pre" => Ok(CommitPhase::Pre),
            "post" => Ok(CommitPhase::Post),
            "none" => Ok(CommitPhase::None),
            other => Err(InvalidPhase(other.to_string())),
        }
    }
}

impl fmt::Display for CommitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CommitPhase::Pre => "pre",
            CommitPhase::Post => "post",
            CommitPhase::None => "none",
        };
        write!(f, "{}", s)
    }
}
