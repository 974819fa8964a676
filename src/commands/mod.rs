//! # CLI Command Implementations
//!
//! Each subcommand of `chartrel` lives in its own module with an `Args`
//! struct derived with `clap` and an `execute` function.
//!
//! Commands share [`load_config`], which layers the global flags over the
//! config file and the built-in defaults.

pub mod generate_e2e;
pub mod stage;

use anyhow::{Context, Result};
use chartrel::config::{Config, DEFAULT_CONFIG_FILE};
use chartrel::remote::GitHubClient;
use std::path::Path;

use crate::cli::GlobalArgs;

/// Build the run configuration from flags, config file and defaults
pub fn load_config(global: &GlobalArgs) -> Result<Config> {
    let mut config = match &global.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => Config::from_file(DEFAULT_CONFIG_FILE)
            .with_context(|| format!("Failed to load config {}", DEFAULT_CONFIG_FILE))?,
        None => Config::default(),
    };

    if let Some(org) = &global.org {
        config.org = org.clone();
    }
    if let Some(pull_policy) = &global.pull_policy {
        config.pull_policy = pull_policy.clone();
    }
    if let Some(tag) = &global.tag {
        config.tag = tag.clone();
    }
    if global.stage {
        config.stage = true;
    }
    if let Some(staging_path) = &global.staging_path {
        config.staging_path = staging_path.clone();
    }
    if let Some(api_url) = &global.api_url {
        config.api_url = api_url.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Create the GitHub client described by `config`
pub fn github_client(config: &Config) -> Result<GitHubClient> {
    GitHubClient::with_base_url(&config.api_url, config.http_timeout())
        .with_context(|| format!("Failed to create API client for {}", config.api_url))
}
