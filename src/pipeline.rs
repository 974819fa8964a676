//! # Pipeline
//!
//! Wires the components together for the two user-facing actions:
//!
//! - **generate-e2e**: resolve the end-to-end test image tag and output the
//!   chart's parameters file.
//! - **stage**: download the configured chart files, stage them under the
//!   staging path and stamp them with the active release.
//!
//! Both take their settings from an explicit [`Config`] and perform all I/O
//! through the supplied remote client and filesystem.

use std::io::Write;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::download_files;
use crate::filesystem::FileSystem;
use crate::params::{build_params_map, generate_params, ComponentMap};
use crate::release::{update_files_with_release_matching, FileWalker, ReleaseName};
use crate::remote::{ContentOptions, RemoteOperations};
use crate::stage::stage_files;

/// Repository of the end-to-end test image
pub const E2E_REPO: &str = "workflow-e2e";

/// Chart directory of the end-to-end test chart
pub const E2E_CHART_DIR: &str = "workflow-dev-e2e";

/// Build the parameters for the e2e chart and output them.
///
/// Staged output lands in `<staging_path>/workflow-dev-e2e/tpl/generate_params.toml`.
pub fn generate_e2e(
    config: &Config,
    client: &dyn RemoteOperations,
    fs: &mut dyn FileSystem,
    out: &mut dyn Write,
) -> Result<ComponentMap> {
    let map = build_params_map(
        client,
        &config.sha_org,
        &[E2E_REPO],
        &config.org,
        &config.pull_policy,
        &config.tag,
    )?;
    let staging_dir = config.staging_path.join(E2E_CHART_DIR);
    generate_params(config.stage, fs, &staging_dir, &map, out)?;
    Ok(map)
}

/// Download, stage and stamp the configured chart files.
///
/// Returns the staged paths in download order.
pub fn stage_chart(
    config: &Config,
    client: &dyn RemoteOperations,
    fs: &mut dyn FileSystem,
    walker: &dyn FileWalker,
    release: &ReleaseName,
) -> Result<Vec<PathBuf>> {
    if config.chart_files.is_empty() {
        return Err(Error::ConfigParse {
            message: "no chart files to stage".to_string(),
            hint: Some("list repository paths under 'chart-files'".to_string()),
        });
    }

    let opts = ContentOptions {
        ref_name: config.chart_ref.clone(),
    };
    let files = download_files(
        client,
        &config.sha_org,
        &config.chart_repo,
        &opts,
        config.chart_files.as_slice(),
    )?;
    let staged: Vec<PathBuf> = files
        .iter()
        .map(|f| config.staging_path.join(&f.file_name))
        .collect();

    stage_files(fs, files, &config.staging_path)?;
    update_files_with_release_matching(walker, fs, release, &config.sentinel, staged.as_slice())?;

    log::info!(
        "Staged {} file(s) from {}/{} under {}",
        staged.len(),
        config.sha_org,
        config.chart_repo,
        config.staging_path.display()
    );
    Ok(staged)
}
