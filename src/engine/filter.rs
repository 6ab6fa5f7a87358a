//! engine::filter
//!
//! File selection: computes the definitive list of files to resolve.
//!
//! # Architecture
//!
//! [`FilterEngine`] is a factory: it precomputes the normalized filter
//! context from the resolved options, and [`FilterEngine::collect`] returns
//! an immutable list of [`FileEntry`] values. The inclusion test itself is
//! a pure function of that context.
//!
//! Selection takes one of two routes:
//! - an explicit file list (each entry resolved against the project root
//!   and checked for existence), or
//! - a recursive walk of the content directories, pruning blocked
//!   directories from descent entirely.
//!
//! # Invariants
//!
//! - The cache file itself is never selected while a pre- or post-commit
//!   hook is active, regardless of the allow-list. This is what breaks the
//!   commit -> hook -> commit loop.
//! - Directories are never selected, regardless of the allow-list.
//! - Restriction and block exclusions ARE overridable by the allow-list.
//!
//! # Matching semantics
//!
//! Block, restriction, allow, and cache-file comparisons are substring
//! tests on normalized forward-slash paths, not exact segment matches.
//! This mirrors the documented observable behavior; see DESIGN.md for the
//! known sharp edge (a restriction dir `sub` also matches `subdir`).

use std::collections::HashSet;
use std::path::Path;

use walkdir::WalkDir;

use crate::core::config::ResolvedOptions;
use crate::core::paths::{file_name, posix_normalize, relative_to_root, resolve_against};
use crate::core::types::FileEntry;
use crate::ui::{self, Verbosity};

/// Directory names never descended into.
const DIR_BLOCK_LIST: &[&str] = &["node_modules", "target", ".git"];

/// Collect the files to resolve, in discovery order.
pub fn collect_files(opts: &ResolvedOptions, verbosity: Verbosity) -> Vec<FileEntry> {
    FilterEngine::new(opts).collect(verbosity)
}

/// Whether a directory name is pruned from descent: the internal block
/// list, dot-prefixed directories, and `__wrapped__` test-harness style
/// directories.
fn is_blocked_dir_name(name: &str) -> bool {
    if DIR_BLOCK_LIST.contains(&name) || name.starts_with('.') {
        return true;
    }
    // __tests__, __mocks__, ... : double-underscore wrapped, no inner '_'
    if let Some(inner) = name
        .strip_prefix("__")
        .and_then(|rest| rest.strip_suffix("__"))
    {
        return !inner.is_empty() && !inner.contains('_');
    }
    false
}

/// Whether a file name is skipped during the directory walk.
///
/// Applies only to walked files; explicitly listed files bypass this check.
fn is_hidden_file_name(name: &str) -> bool {
    name.len() > 1 && name.starts_with('.')
}

/// Precomputed filter context for one run.
pub struct FilterEngine<'a> {
    opts: &'a ResolvedOptions,
    /// Content directories, absolute and normalized.
    content_dirs: Vec<String>,
    /// Allow-list entries resolved to absolute normalized paths.
    allow_paths: Vec<String>,
    restrict_by_dir: bool,
}

impl<'a> FilterEngine<'a> {
    /// Build the filter context from resolved options.
    pub fn new(opts: &'a ResolvedOptions) -> Self {
        let root = &opts.project_root;
        let content_dirs = if opts.only_in.is_empty() {
            vec![root.clone()]
        } else {
            opts.only_in
                .iter()
                .map(|dir| resolve_against(root, dir))
                .collect()
        };
        let allow_paths = opts
            .allow_files
            .iter()
            .map(|entry| resolve_against(root, entry))
            .collect();
        Self {
            opts,
            content_dirs,
            allow_paths,
            restrict_by_dir: !opts.only_in.is_empty(),
        }
    }

    /// Produce the deduplicated file list.
    pub fn collect(&self, verbosity: Verbosity) -> Vec<FileEntry> {
        let mut entries = Vec::new();
        let mut seen = HashSet::new();

        if !self.opts.files.is_empty() {
            for raw in &self.opts.files {
                let full_path = resolve_against(&self.opts.project_root, raw);
                self.push(full_path, true, &mut entries, &mut seen);
            }
            return entries;
        }

        for dir in &self.content_dirs {
            let walker = WalkDir::new(dir).follow_links(false).into_iter();
            // Prune blocked directories entirely; their contents are never
            // visited. The walk root itself is exempt.
            let walker = walker.filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !is_blocked_dir_name(&entry.file_name().to_string_lossy())
            });
            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        ui::warn(format!("skipping unreadable path: {}", err), verbosity);
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }
                if is_hidden_file_name(&entry.file_name().to_string_lossy()) {
                    continue;
                }
                let full_path = posix_normalize(entry.path());
                self.push(full_path, false, &mut entries, &mut seen);
            }
        }
        entries
    }

    /// Record a candidate path if it passes the inclusion test.
    fn push(
        &self,
        full_path: String,
        check_exists: bool,
        entries: &mut Vec<FileEntry>,
        seen: &mut HashSet<String>,
    ) {
        if !self.should_track(&full_path, check_exists) {
            return;
        }
        if !seen.insert(full_path.clone()) {
            return;
        }
        let relative_path =
            relative_to_root(&full_path, &self.opts.project_root_trailing_slash);
        entries.push(FileEntry {
            full_path,
            relative_path,
        });
    }

    /// The inclusion test.
    ///
    /// Returns whether `full_path` (normalized, absolute) is in scope.
    /// Exclusions by restriction, block list, or the cache file outside an
    /// active hook are provisional and can be overridden by the
    /// allow-list; directory and missing-file exclusions cannot.
    fn should_track(&self, full_path: &str, check_exists: bool) -> bool {
        let mut blocked = false;

        // Never track the cache file during an active hook run: committing
        // it re-triggers the hook, and only this exclusion stops the loop.
        if let Some(cache_path) = self.opts.output_file.as_deref() {
            if full_path.contains(cache_path) {
                if self.opts.git_commit_hook.is_hook() {
                    return false;
                }
                blocked = true;
            }
        }

        if self.restrict_by_dir {
            let inside = self
                .content_dirs
                .iter()
                .any(|dir| full_path.contains(dir.as_str()));
            if !inside {
                blocked = true;
            }
        }

        if !self.opts.block_files.is_empty() {
            let name = file_name(full_path);
            if self
                .opts
                .block_files
                .iter()
                .any(|blocked_entry| blocked_entry == name || full_path.contains(blocked_entry.as_str()))
            {
                blocked = true;
            }
        }

        let path = Path::new(full_path);
        if path.is_dir() {
            return false;
        }
        if check_exists && !path.exists() {
            return false;
        }

        if blocked {
            return self.is_allow_listed(full_path);
        }
        true
    }

    /// Allow-list match: bare filename or full normalized path.
    fn is_allow_listed(&self, full_path: &str) -> bool {
        let name = file_name(full_path);
        self.opts
            .allow_files
            .iter()
            .any(|entry| entry == name)
            || self
                .allow_paths
                .iter()
                .any(|entry| entry == full_path)
    }
}
