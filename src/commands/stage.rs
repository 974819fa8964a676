//! stage command implementation
//!
//! Downloads the configured chart files from the chart repository, writes
//! them under the staging path and stamps placeholder files with the release.
//! With `--dry-run` the files are staged in memory and only listed.

use anyhow::{Context, Result};
use chartrel::filesystem::{DiskFS, FileSystem, MemoryFS};
use chartrel::pipeline;
use chartrel::release::{FsWalker, ReleaseName};
use clap::Args;

use crate::cli::GlobalArgs;

/// Arguments for the stage command
#[derive(Args, Debug, Default)]
pub struct StageArgs {
    /// Repository path to stage, in addition to the configured chart files
    #[arg(short, long = "file", value_name = "PATH")]
    pub files: Vec<String>,

    /// Repository holding the chart
    #[arg(long, value_name = "REPO")]
    pub chart_repo: Option<String>,

    /// Branch, tag or commit of the chart repository
    #[arg(long = "ref", value_name = "REF")]
    pub chart_ref: Option<String>,

    /// Full release name, e.g. v2.0.0-beta1
    #[arg(long, value_name = "NAME", env = "CHARTREL_RELEASE_FULL", default_value = "")]
    pub release_full: String,

    /// Short release name written into placeholder files; empty skips stamping
    #[arg(long, value_name = "NAME", env = "CHARTREL_RELEASE_SHORT", default_value = "")]
    pub release_short: String,

    /// Stage in memory and list the result without writing to disk
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

/// Execute the stage command
pub fn execute(global: &GlobalArgs, args: StageArgs) -> Result<()> {
    let mut config = super::load_config(global)?;
    config.chart_files.extend(args.files);
    if let Some(chart_repo) = args.chart_repo {
        config.chart_repo = chart_repo;
    }
    if args.chart_ref.is_some() {
        config.chart_ref = args.chart_ref;
    }
    let release = ReleaseName::new(args.release_full, args.release_short);

    let client = super::github_client(&config)?;
    let mut disk = DiskFS::new();
    let mut memory = MemoryFS::new();
    let fs: &mut dyn FileSystem = if args.dry_run { &mut memory } else { &mut disk };

    let staged = pipeline::stage_chart(&config, &client, fs, &FsWalker, &release)
        .with_context(|| format!("Error staging files from {}", config.chart_repo))?;

    for path in &staged {
        println!("{}", path.display());
    }
    Ok(())
}
