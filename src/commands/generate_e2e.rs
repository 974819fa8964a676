//! generate-e2e command implementation
//!
//! Resolves the `workflow-e2e` image tag (explicit `--tag`, or `git-<sha>` of
//! the latest commit) and outputs the chart parameters file, either to stdout
//! or under `<staging-path>/workflow-dev-e2e/tpl/` with `--stage`.

use anyhow::{Context, Result};
use chartrel::filesystem::DiskFS;
use chartrel::pipeline;
use clap::Args;
use std::io::{self, Write};

use crate::cli::GlobalArgs;

/// Arguments for the generate-e2e command
#[derive(Args, Debug, Default)]
pub struct GenerateE2eArgs {
    /// Organization owning the workflow-e2e repository
    #[arg(long, value_name = "ORG")]
    pub sha_org: Option<String>,
}

/// Execute the generate-e2e command
pub fn execute(global: &GlobalArgs, args: GenerateE2eArgs) -> Result<()> {
    let mut config = super::load_config(global)?;
    if let Some(sha_org) = args.sha_org {
        config.sha_org = sha_org;
    }

    let client = super::github_client(&config)?;
    let mut fs = DiskFS::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    pipeline::generate_e2e(&config, &client, &mut fs, &mut out)
        .context("Error outputting the workflow-e2e parameters file")?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::net::TcpListener;
    use tempfile::TempDir;

    #[test]
    fn test_execute_with_explicit_tag_stages_params() {
        let temp_dir = TempDir::new().unwrap();
        let staging = temp_dir.path().join("staging");
        let global = GlobalArgs {
            tag: Some("v2.0.0".to_string()),
            stage: true,
            staging_path: Some(staging.clone()),
            ..GlobalArgs::default()
        };

        execute(&global, GenerateE2eArgs::default()).unwrap();

        let params =
            fs::read_to_string(staging.join("workflow-dev-e2e/tpl/generate_params.toml")).unwrap();
        assert!(params.contains("dockerTag = \"v2.0.0\""));
    }

    #[test]
    fn test_execute_unreachable_api_fails() {
        let temp_dir = TempDir::new().unwrap();
        // Bind and release an ephemeral port so nothing is listening on it
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let global = GlobalArgs {
            api_url: Some(format!("http://127.0.0.1:{}", port)),
            staging_path: Some(temp_dir.path().to_path_buf()),
            ..GlobalArgs::default()
        };

        let err = execute(&global, GenerateE2eArgs::default()).unwrap_err();
        assert!(format!("{:#}", err).contains("workflow-e2e"));
    }
}
