//! # chartrel CLI
//!
//! This is the binary entry point for the `chartrel` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging.
//! - Dispatching to the selected command and reporting errors.
//!
//! The staging logic lives in the `chartrel` library; the binary is a thin
//! wrapper that builds a `Config` and hands it to the pipeline. Any error is
//! returned from `main`, which prints it and exits with a non-zero status.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
