//! cli
//!
//! Command-line interface layer.
//!
//! # Responsibilities
//!
//! - Parse flags and positional arguments
//! - Resolve options and hand off to the engine
//! - Format the result (JSON to stdout, or a short confirmation when
//!   writing to file)
//!
//! The CLI layer is thin: all selection and resolution logic lives in
//! [`crate::engine`].

pub mod args;

pub use args::Cli;

use std::time::Instant;

use anyhow::Result;

use crate::core::config::ResolvedOptions;
use crate::engine;
use crate::ui::{self, Verbosity};

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);
    let started = Instant::now();

    let opts = ResolvedOptions::resolve(cli.into_options())?;
    if opts.debug {
        ui::debug(format!("resolved options: {:#?}", opts), verbosity);
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let cache = runtime.block_on(engine::run(&opts, verbosity))?;

    if opts.writes_cache_file() {
        ui::print("timestamps file updated", verbosity);
    } else {
        // The result set is the deliverable; print it even in quiet mode.
        println!("{}", serde_json::to_string_pretty(&cache)?);
    }

    ui::print(
        format!(
            "Total execution time = {:.2} seconds.",
            started.elapsed().as_secs_f64()
        ),
        verbosity,
    );
    Ok(())
}
