//! git::interface
//!
//! Git interface implementation.
//!
//! Repository discovery, staging, and commit creation go through `git2`.
//! The two history time queries shell out to the `git` executable, because
//! they are defined in terms of `git log --follow` path tracking, which has
//! no practical libgit2 equivalent short of walking and diffing the commit
//! graph in-process - exactly what this tool does not do.
//!
//! # Error Handling
//!
//! Git failures are categorized into typed variants:
//! - [`GitError::NotARepo`]: the path is not inside a git repository
//! - [`GitError::BareRepo`]: the repository has no working directory
//! - [`GitError::CommandFailed`]: a `git` invocation exited nonzero
//! - [`GitError::Spawn`]: the `git` executable could not be started

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

/// Errors from git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a git repository.
    #[error("not a git repository: {}", path.display())]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// A git invocation exited with a nonzero status.
    #[error("`git {command}` failed: {stderr}")]
    CommandFailed {
        /// The subcommand and arguments that were run
        command: String,
        /// Trimmed stderr from the failed invocation
        stderr: String,
    },

    /// The git executable could not be spawned.
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    /// Internal libgit2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

/// Handle to a git working directory.
///
/// The handle stores only the directory path; repository state is opened on
/// demand. That keeps it `Clone + Send + Sync`, so resolution workers can
/// share one handle across threads while all queries remain read-only.
#[derive(Debug, Clone)]
pub struct Git {
    work_dir: PathBuf,
}

impl Git {
    /// Open a handle rooted at `path`, verifying that it lies inside a
    /// non-bare git repository.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::NotARepo`] when discovery fails and
    /// [`GitError::BareRepo`] for repositories without a working directory.
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        if repo.workdir().is_none() {
            return Err(GitError::BareRepo);
        }
        Ok(Self {
            work_dir: path.to_path_buf(),
        })
    }

    /// Check whether `path` lies inside a git repository.
    pub fn is_repo(path: &Path) -> bool {
        git2::Repository::discover(path).is_ok()
    }

    /// The working directory queries run against.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Seconds-since-epoch of the earliest commit touching `path`, or
    /// `None` when the path has no history (untracked or brand new).
    pub fn first_commit_seconds(&self, path: &str) -> Result<Option<u64>, GitError> {
        Ok(self.log_seconds(path, false)?.into_iter().min())
    }

    /// Seconds-since-epoch of the latest commit touching `path`, following
    /// renames, or `None` when the path has no history.
    pub fn latest_commit_seconds(&self, path: &str) -> Result<Option<u64>, GitError> {
        Ok(self.log_seconds(path, true)?.into_iter().max())
    }

    /// Run `git log --pretty=format:%at [--follow] -- <path>` and parse
    /// every line that is a strictly positive integer.
    fn log_seconds(&self, path: &str, follow: bool) -> Result<Vec<u64>, GitError> {
        let mut args: Vec<&str> = vec!["log", "--pretty=format:%at"];
        if follow {
            args.push("--follow");
        }
        args.push("--");
        args.push(path);

        let output = Command::new("git")
            .args(&args)
            .current_dir(&self.work_dir)
            .output()?;
        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .filter_map(|line| line.trim().parse::<u64>().ok())
            .filter(|&seconds| seconds > 0)
            .collect())
    }

    /// Stage a single file.
    ///
    /// The path may be absolute or relative to the working directory; it is
    /// rewritten relative to the repository root for the index.
    pub fn stage(&self, file: &Path) -> Result<(), GitError> {
        let repo = git2::Repository::discover(&self.work_dir)?;
        let work_root = repo.workdir().ok_or(GitError::BareRepo)?.to_path_buf();
        let relative = if file.is_absolute() {
            file.strip_prefix(&work_root)
                .map_err(|_| GitError::Internal {
                    message: format!("{} is outside the repository", file.display()),
                })?
                .to_path_buf()
        } else {
            file.to_path_buf()
        };
        let mut index = repo.index()?;
        index.add_path(&relative)?;
        index.write()?;
        Ok(())
    }

    /// Create a plain new commit from the current index.
    ///
    /// Never amends: amending from a post-commit hook would rewrite the
    /// commit that triggered the hook and re-trigger the chain.
    pub fn commit_index(&self, message: &str) -> Result<(), GitError> {
        let repo = git2::Repository::discover(&self.work_dir)?;
        let signature = repo.signature()?;
        let mut index = repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = repo.find_tree(tree_id)?;
        let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;
        Ok(())
    }
}

#[cfg(test)]
impl Git {
    /// Construct a handle without discovery, for exercising failure paths.
    pub(crate) fn detached(path: &Path) -> Self {
        Self {
            work_dir: path.to_path_buf(),
        }
    }
}
