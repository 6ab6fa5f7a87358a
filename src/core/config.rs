//! core::config
//!
//! Option defaulting and validation.
//!
//! # Overview
//!
//! Callers (the CLI, or library users) supply a loosely-typed [`Options`]
//! value. [`ResolvedOptions::resolve`] fills defaults, normalizes paths,
//! and produces the immutable configuration object consumed by the engine.
//!
//! The effective project root is computed exactly once here and threaded
//! through every component by reference - never held as ambient global
//! state.
//!
//! # Defaulting rules
//!
//! - `project_root_path`: defaults to the current working directory
//! - `output_file_name`: defaults to `timestamps.json` when output is
//!   enabled; relative names resolve against the project root
//! - `git_commit_hook`: unrecognized values reset to `none`
//! - list options accept the legacy bracketed string form
//!   (`"[alpha.txt, bravo.js]"`) as well as plain single values

use std::path::PathBuf;

use thiserror::Error;

use crate::core::paths::{posix_normalize, resolve_against};
use crate::core::types::CommitPhase;

/// Default cache file name when output is enabled without an explicit name.
pub const DEFAULT_OUTPUT_FILE_NAME: &str = "timestamps.json";

/// Errors from option resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The project root was not given and the working directory could not
    /// be determined.
    #[error("could not determine project root: {0}")]
    NoProjectRoot(#[source] std::io::Error),
}

/// Loosely-typed input options.
///
/// Every field is optional; [`ResolvedOptions::resolve`] supplies defaults.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Write the stamp cache to disk.
    pub output_to_file: bool,
    /// Cache file path (absolute, or relative to the project root).
    pub output_file_name: Option<String>,
    /// Stage the cache file after writing. `None` defers to the phase
    /// default (stage whenever a hook is active).
    pub output_file_git_add: Option<bool>,
    /// Explicit files to process; empty means scan the content directories.
    pub files: Vec<String>,
    /// Restrict scanning to these directories.
    pub only_in: Vec<String>,
    /// Exclude files matching these names or paths.
    pub block_files: Vec<String>,
    /// Re-include files otherwise excluded by restrictions or blocks.
    pub allow_files: Vec<String>,
    /// Lifecycle phase string ("pre", "post", "none").
    pub git_commit_hook: Option<String>,
    /// Project root; defaults to the current working directory.
    pub project_root_path: Option<PathBuf>,
    /// Recompute cached `created` values instead of trusting the cache.
    pub force_created_refresh: bool,
    /// Verbose per-file progress output.
    pub debug: bool,
}

/// Fully-resolved configuration, immutable for the duration of one run.
#[derive(Debug, Clone)]
pub struct ResolvedOptions {
    pub output_to_file: bool,
    /// Absolute posix path of the cache file. Present whenever a name was
    /// supplied or output is enabled, so the filter's self-exclusion rule
    /// always sees the effective cache path.
    pub output_file: Option<String>,
    pub output_file_git_add: Option<bool>,
    pub files: Vec<String>,
    pub only_in: Vec<String>,
    pub block_files: Vec<String>,
    pub allow_files: Vec<String>,
    pub git_commit_hook: CommitPhase,
    /// Posix-normalized absolute project root, no trailing slash.
    pub project_root: String,
    /// The root with a trailing slash, used to derive cache keys.
    pub project_root_trailing_slash: String,
    pub force_created_refresh: bool,
    pub debug: bool,
}

impl ResolvedOptions {
    /// Validate input options and fill defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoProjectRoot`] if no root was supplied and
    /// the current working directory is unavailable.
    pub fn resolve(input: Options) -> Result<Self, ConfigError> {
        let root_path = match input.project_root_path {
            Some(path) => path,
            None => std::env::current_dir().map_err(ConfigError::NoProjectRoot)?,
        };
        let mut project_root = posix_normalize(&root_path);
        while project_root.len() > 1 && project_root.ends_with('/') {
            project_root.pop();
        }
        let project_root_trailing_slash = format!("{}/", project_root);

        // The effective cache path: an explicit name wins, otherwise the
        // default applies as soon as output is enabled.
        let output_file = input
            .output_file_name
            .filter(|name| !name.is_empty())
            .or_else(|| {
                input
                    .output_to_file
                    .then(|| DEFAULT_OUTPUT_FILE_NAME.to_string())
            })
            .map(|name| resolve_against(&project_root, &name));

        let git_commit_hook = input
            .git_commit_hook
            .as_deref()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(CommitPhase::None);

        Ok(Self {
            output_to_file: input.output_to_file,
            output_file,
            output_file_git_add: input.output_file_git_add,
            files: flatten_list_args(input.files),
            only_in: flatten_list_args(input.only_in),
            block_files: flatten_list_args(input.block_files),
            allow_files: flatten_list_args(input.allow_files),
            git_commit_hook,
            project_root,
            project_root_trailing_slash,
            force_created_refresh: input.force_created_refresh,
            debug: input.debug,
        })
    }

    /// Whether the cache file will actually be written this run.
    pub fn writes_cache_file(&self) -> bool {
        self.output_to_file && self.output_file.is_some()
    }
}

/// Expand legacy bracketed list strings inside a list of arguments.
///
/// Hook configurations historically passed `"[alpha.txt, bravo.js]"` as a
/// single value; each element is expanded in place.
fn flatten_list_args(values: Vec<String>) -> Vec<String> {
    values.into_iter().flat_map(extract_list).collect()
}

/// Parse a single argument that may be a bracketed list.
///
/// `"[a.txt, b.txt]"` yields both entries; anything else yields itself.
pub fn extract_list(value: String) -> Vec<String> {
    let trimmed = value.trim();
    if let Some(inner) = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        inner
            .split(',')
            .map(|entry| entry.trim().to_string())
            .filter(|entry| !entry.is_empty())
            .collect()
    } else {
        vec![value]
    }
}
