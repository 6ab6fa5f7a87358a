//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! The flag surface mirrors the options object accepted by the library:
//! every list flag is repeatable and also accepts the legacy bracketed
//! form (`--files "[alpha.txt, bravo.txt]"`) that hook one-liners use.

use clap::Parser;
use std::path::PathBuf;

use crate::core::config::Options;

/// Extract file created/modified timestamps from git history
#[derive(Parser, Debug)]
#[command(name = "git-stamps")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
EXAMPLES:
    # Print stamps for everything under the current directory
    git-stamps

    # Maintain a committed timestamps file from a post-commit hook
    git-stamps --output-to-file --git-commit-hook post

    # Stamp two specific files
    git-stamps alpha.txt subdir/delta.txt")]
pub struct Cli {
    /// Save the results to the timestamps file instead of printing them
    #[arg(long)]
    pub output_to_file: bool,

    /// Timestamps file path, absolute or relative to the project root
    /// [default: timestamps.json]
    #[arg(long, value_name = "FILE")]
    pub output_file_name: Option<String>,

    /// Stage the timestamps file with git add after writing
    /// [default: true when --git-commit-hook is pre or post]
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub output_file_git_add: Option<bool>,

    /// Only process these files (repeatable)
    #[arg(long = "files", value_name = "FILE")]
    pub files: Vec<String>,

    /// Only process files under these directories (repeatable)
    #[arg(long = "only-in", value_name = "DIR")]
    pub only_in: Vec<String>,

    /// Exclude files by name or path (repeatable)
    #[arg(long = "block-files", value_name = "FILE")]
    pub block_files: Vec<String>,

    /// Re-include files excluded by --only-in or --block-files (repeatable)
    #[arg(long = "allow-files", value_name = "FILE")]
    pub allow_files: Vec<String>,

    /// Which git hook triggered this run
    #[arg(long, value_name = "pre|post|none")]
    pub git_commit_hook: Option<String>,

    /// Project root [default: current directory]
    #[arg(long, value_name = "DIR")]
    pub project_root_path: Option<PathBuf>,

    /// Recompute created timestamps instead of trusting the cache
    #[arg(long)]
    pub force_created_refresh: bool,

    /// Verbose per-file progress output
    #[arg(long)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// Files to process (same as --files)
    #[arg(value_name = "FILE")]
    pub file_args: Vec<String>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Convert parsed flags into library options.
    ///
    /// Positional file arguments append to `--files`, matching the
    /// original CLI contract.
    pub fn into_options(self) -> Options {
        let mut files = self.files;
        files.extend(self.file_args);
        Options {
            output_to_file: self.output_to_file,
            output_file_name: self.output_file_name,
            output_file_git_add: self.output_file_git_add,
            files,
            only_in: self.only_in,
            block_files: self.block_files,
            allow_files: self.allow_files,
            git_commit_hook: self.git_commit_hook,
            project_root_path: self.project_root_path,
            force_created_refresh: self.force_created_refresh,
            debug: self.debug,
        }
    }
}
