//! Integration tests for the filter engine.
//!
//! These build real directory trees in temp dirs and verify the
//! block/restriction/allow-override semantics and the cache-file
//! self-exclusion invariant. No git repository is needed: selection is
//! purely a filesystem concern.

use std::path::Path;

use stampwork::core::config::{Options, ResolvedOptions};
use stampwork::engine::collect_files;
use stampwork::ui::Verbosity;

/// Build the standard tree: alpha.txt, bravo.txt, subdir/delta.txt,
/// subdir/echo.txt.
fn build_tree(root: &Path) {
    std::fs::write(root.join("alpha.txt"), "alpha").unwrap();
    std::fs::write(root.join("bravo.txt"), "bravo").unwrap();
    std::fs::create_dir_all(root.join("subdir")).unwrap();
    std::fs::write(root.join("subdir/delta.txt"), "delta").unwrap();
    std::fs::write(root.join("subdir/echo.txt"), "echo").unwrap();
}

fn resolve(root: &Path, build: impl FnOnce(&mut Options)) -> ResolvedOptions {
    let mut options = Options {
        project_root_path: Some(root.canonicalize().unwrap()),
        ..Options::default()
    };
    build(&mut options);
    ResolvedOptions::resolve(options).unwrap()
}

fn relative_paths(opts: &ResolvedOptions) -> Vec<String> {
    collect_files(opts, Verbosity::Quiet)
        .into_iter()
        .map(|entry| entry.relative_path)
        .collect()
}

#[test]
fn full_scan_finds_every_file() {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path());

    let opts = resolve(dir.path(), |_| {});
    let mut found = relative_paths(&opts);
    found.sort();
    assert_eq!(
        found,
        vec!["alpha.txt", "bravo.txt", "subdir/delta.txt", "subdir/echo.txt"]
    );
}

#[test]
fn restricting_by_directory() {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path());

    let opts = resolve(dir.path(), |options| {
        options.only_in = vec!["subdir".to_string()];
    });
    let mut found = relative_paths(&opts);
    found.sort();
    assert_eq!(found, vec!["subdir/delta.txt", "subdir/echo.txt"]);
}

#[test]
fn allow_list_overrides_directory_restriction() {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path());

    // The restriction excludes alpha.txt and bravo.txt from the candidate
    // list; the allow-list reinstates alpha.txt only.
    let opts = resolve(dir.path(), |options| {
        options.files = vec![
            "alpha.txt".to_string(),
            "bravo.txt".to_string(),
            "subdir/delta.txt".to_string(),
            "subdir/echo.txt".to_string(),
        ];
        options.only_in = vec!["subdir".to_string()];
        options.allow_files = vec!["alpha.txt".to_string()];
    });
    let mut found = relative_paths(&opts);
    found.sort();
    assert_eq!(
        found,
        vec!["alpha.txt", "subdir/delta.txt", "subdir/echo.txt"]
    );
}

#[test]
fn restricted_walk_never_visits_outside_directories() {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path());

    // On the walk route only the content directories are traversed, so an
    // allow-list entry outside them has nothing to reinstate.
    let opts = resolve(dir.path(), |options| {
        options.only_in = vec!["subdir".to_string()];
        options.allow_files = vec!["alpha.txt".to_string()];
    });
    let mut found = relative_paths(&opts);
    found.sort();
    assert_eq!(found, vec!["subdir/delta.txt", "subdir/echo.txt"]);
}

#[test]
fn block_list_excludes_by_name() {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path());

    let opts = resolve(dir.path(), |options| {
        options.block_files = vec!["bravo.txt".to_string()];
    });
    let mut found = relative_paths(&opts);
    found.sort();
    assert_eq!(
        found,
        vec!["alpha.txt", "subdir/delta.txt", "subdir/echo.txt"]
    );
}

#[test]
fn allow_list_overrides_block_list() {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path());

    let opts = resolve(dir.path(), |options| {
        options.block_files = vec!["bravo.txt".to_string()];
        options.allow_files = vec!["bravo.txt".to_string()];
    });
    let found = relative_paths(&opts);
    assert!(found.contains(&"bravo.txt".to_string()));
}

#[test]
fn cache_file_exclusion_is_absolute_during_hooks() {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path());
    std::fs::write(dir.path().join("cache.json"), "{}").unwrap();

    // Active hook: even an allow-list entry cannot reinstate the cache
    // file - that is what breaks the commit/hook loop.
    let opts = resolve(dir.path(), |options| {
        options.output_file_name = Some("cache.json".to_string());
        options.git_commit_hook = Some("post".to_string());
        options.allow_files = vec!["cache.json".to_string()];
    });
    let found = relative_paths(&opts);
    assert!(!found.contains(&"cache.json".to_string()));
}

#[test]
fn cache_file_exclusion_is_overridable_when_standalone() {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path());
    std::fs::write(dir.path().join("cache.json"), "{}").unwrap();

    // Standalone: the exclusion is provisional and the allow-list wins.
    let opts = resolve(dir.path(), |options| {
        options.output_file_name = Some("cache.json".to_string());
        options.allow_files = vec!["cache.json".to_string()];
    });
    let found = relative_paths(&opts);
    assert!(found.contains(&"cache.json".to_string()));

    // Without the allow-list the cache file stays out.
    let opts = resolve(dir.path(), |options| {
        options.output_file_name = Some("cache.json".to_string());
    });
    let found = relative_paths(&opts);
    assert!(!found.contains(&"cache.json".to_string()));
}

#[test]
fn explicit_missing_files_are_dropped() {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path());

    let opts = resolve(dir.path(), |options| {
        options.files = vec!["alpha.txt".to_string(), "ghost.txt".to_string()];
    });
    let found = relative_paths(&opts);
    assert_eq!(found, vec!["alpha.txt"]);
}

#[test]
fn explicit_file_list_is_deduplicated() {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path());

    let opts = resolve(dir.path(), |options| {
        options.files = vec!["alpha.txt".to_string(), "alpha.txt".to_string()];
    });
    let found = relative_paths(&opts);
    assert_eq!(found, vec!["alpha.txt"]);
}

#[test]
fn blocked_and_hidden_directories_are_pruned() {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path());
    let root = dir.path();
    std::fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
    std::fs::write(root.join("node_modules/pkg/index.js"), "js").unwrap();
    std::fs::create_dir_all(root.join("target/debug")).unwrap();
    std::fs::write(root.join("target/debug/build.log"), "log").unwrap();
    std::fs::create_dir_all(root.join(".hidden")).unwrap();
    std::fs::write(root.join(".hidden/secret.txt"), "shh").unwrap();
    std::fs::create_dir_all(root.join("__tests__")).unwrap();
    std::fs::write(root.join("__tests__/fixture.txt"), "fixture").unwrap();
    std::fs::write(root.join("subdir/.env"), "KEY=1").unwrap();

    let opts = resolve(root, |_| {});
    let mut found = relative_paths(&opts);
    found.sort();
    assert_eq!(
        found,
        vec!["alpha.txt", "bravo.txt", "subdir/delta.txt", "subdir/echo.txt"]
    );
}

#[test]
fn directories_are_never_selected_even_when_allow_listed() {
    let dir = tempfile::tempdir().unwrap();
    build_tree(dir.path());

    let opts = resolve(dir.path(), |options| {
        options.files = vec!["subdir".to_string()];
        options.allow_files = vec!["subdir".to_string()];
    });
    let found = relative_paths(&opts);
    assert!(found.is_empty());
}
