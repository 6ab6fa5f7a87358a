//! Shared fixture for integration tests.
//!
//! Creates real git repositories in temp directories and drives the `git`
//! binary directly, so the tests exercise the same history queries the
//! resolver performs.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// A pinned historical commit date (2020-01-01T00:00:00Z).
pub const PINNED_EPOCH: u64 = 1577836800;

/// Test fixture wrapping a real git repository.
pub struct TestRepo {
    dir: TempDir,
    root: PathBuf,
}

impl TestRepo {
    /// Create an empty initialized repository.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        // Canonicalize so pathspecs match even when the temp dir sits
        // behind a symlink.
        let root = dir.path().canonicalize().expect("canonicalize temp dir");

        run_git(&root, &["init"]);
        run_git(&root, &["config", "user.email", "test@example.com"]);
        run_git(&root, &["config", "user.name", "Test User"]);

        Self { dir, root }
    }

    /// Create a repository with the standard file layout committed at the
    /// pinned date: `alpha.txt`, `bravo.txt`, `subdir/delta.txt`,
    /// `subdir/echo.txt`.
    pub fn with_standard_layout() -> Self {
        let repo = Self::new();
        repo.write_file("alpha.txt", "alpha");
        repo.write_file("bravo.txt", "bravo");
        repo.write_file("subdir/delta.txt", "delta");
        repo.write_file("subdir/echo.txt", "echo");
        repo.commit_all_at("initial files", PINNED_EPOCH);
        repo
    }

    /// Path to the repository root.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Write a file, creating parent directories as needed.
    pub fn write_file(&self, relative: &str, content: &str) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    /// Stage everything and commit now.
    pub fn commit_all(&self, message: &str) {
        run_git(&self.root, &["add", "-A"]);
        run_git(&self.root, &["commit", "-m", message]);
    }

    /// Stage everything and commit with a pinned author/committer date.
    pub fn commit_all_at(&self, message: &str, epoch_seconds: u64) {
        // Git internal date format: @<seconds-since-epoch> <timezone>
        let date = format!("@{} +0000", epoch_seconds);
        run_git(&self.root, &["add", "-A"]);
        run_git_env(
            &self.root,
            &["commit", "-m", message],
            &[("GIT_AUTHOR_DATE", &date), ("GIT_COMMITTER_DATE", &date)],
        );
    }

    /// Subject line of the HEAD commit.
    pub fn head_subject(&self) -> String {
        git_stdout(&self.root, &["log", "-1", "--pretty=format:%s"])
    }

    /// Author timestamp of the HEAD commit.
    pub fn head_time(&self) -> u64 {
        git_stdout(&self.root, &["log", "-1", "--pretty=format:%at"])
            .trim()
            .parse()
            .expect("parse head author time")
    }

    /// Total number of commits on HEAD.
    pub fn commit_count(&self) -> usize {
        git_stdout(&self.root, &["rev-list", "--count", "HEAD"])
            .trim()
            .parse()
            .expect("parse commit count")
    }

    /// Paths named by the HEAD commit.
    pub fn head_files(&self) -> Vec<String> {
        git_stdout(
            &self.root,
            &["show", "--name-only", "--pretty=format:", "HEAD"],
        )
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
    }
}

/// Run a git command, panicking on failure.
pub fn run_git(dir: &Path, args: &[&str]) {
    run_git_env(dir, args, &[]);
}

/// Run a git command with extra environment variables.
pub fn run_git_env(dir: &Path, args: &[&str], envs: &[(&str, &str)]) {
    let mut command = Command::new("git");
    command.args(args).current_dir(dir);
    for (key, value) in envs {
        command.env(key, value);
    }
    let output = command.output().expect("git command failed to spawn");
    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

/// Run a git command and return its stdout.
pub fn git_stdout(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed to spawn");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}
