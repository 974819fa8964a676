//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;

/// chartrel - Stage and stamp Helm chart templates for a release
#[derive(Parser, Debug)]
#[command(name = "chartrel")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalArgs,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

/// Options shared by every command
///
/// Unset options fall back to the config file, then to built-in defaults.
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// Path to config file
    #[arg(short, long, global = true, value_name = "PATH", env = "CHARTREL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Image organization
    #[arg(long, global = true, value_name = "ORG", env = "CHARTREL_ORG")]
    pub org: Option<String>,

    /// Image pull policy (Always, IfNotPresent, Never)
    #[arg(long, global = true, value_name = "POLICY", env = "CHARTREL_PULL_POLICY")]
    pub pull_policy: Option<String>,

    /// Image tag; resolved from the latest commit when unset
    #[arg(long, global = true, value_name = "TAG", env = "CHARTREL_TAG")]
    pub tag: Option<String>,

    /// Write output under the staging path instead of stdout
    #[arg(long, global = true)]
    pub stage: bool,

    /// Root of the staged tree
    #[arg(long, global = true, value_name = "PATH", env = "CHARTREL_STAGING_PATH")]
    pub staging_path: Option<PathBuf>,

    /// GitHub API endpoint
    #[arg(long, global = true, value_name = "URL", env = "CHARTREL_API_URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the parameters file for the workflow e2e chart
    GenerateE2e(commands::generate_e2e::GenerateE2eArgs),

    /// Download, stage and stamp the configured chart files
    Stage(commands::stage::StageArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.command {
            Commands::GenerateE2e(args) => commands::generate_e2e::execute(&self.global, args),
            Commands::Stage(args) => commands::stage::execute(&self.global, args),
        }
    }
}

/// Initialize `env_logger`; `RUST_LOG` takes precedence over `--log-level`
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // Ignore a second initialization (tests may run several commands)
    let _ = env_logger::Builder::from_env(env)
        .format_target(false)
        .try_init();
}
