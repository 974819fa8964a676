//! # Parameter Assembly
//!
//! Builds the per-component attribute map (image org, pull policy and tag)
//! consumed by the chart's `generate_params.toml`, and renders it.
//!
//! A component without an explicit tag gets `git-<shortsha>`, where the SHA is
//! the latest commit of the component's repository. A component whose tag
//! cannot be resolved is an error; it is never dropped from the map.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::filesystem::FileSystem;
use crate::remote::RemoteOperations;
use crate::stage::create_dir;

/// Length of an abbreviated commit SHA
pub const SHORT_SHA_LEN: usize = 7;

/// Prefix of tags synthesized from a commit SHA
pub const GIT_TAG_PREFIX: &str = "git-";

/// Name of the generated parameters file, under `<staging dir>/tpl/`
pub const PARAMS_FILE_NAME: &str = "generate_params.toml";

/// Image attributes of one component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComponentAttrs {
    pub org: String,
    #[serde(rename = "pullPolicy")]
    pub pull_policy: String,
    #[serde(rename = "dockerTag")]
    pub tag: String,
}

/// Component name to attributes
pub type ComponentMap = BTreeMap<String, ComponentAttrs>;

/// Abbreviate a commit SHA
pub fn short_sha(sha: &str) -> &str {
    match sha.char_indices().nth(SHORT_SHA_LEN) {
        Some((idx, _)) => &sha[..idx],
        None => sha,
    }
}

/// Build the attribute map for `components`.
///
/// `sha_org` is the source-control organization the component repositories
/// live in; `org` is the image organization written into the map.
pub fn build_params_map<S: AsRef<str>>(
    client: &dyn RemoteOperations,
    sha_org: &str,
    components: &[S],
    org: &str,
    pull_policy: &str,
    tag: &str,
) -> Result<ComponentMap> {
    let mut map = ComponentMap::new();
    for component in components {
        let component = component.as_ref();
        let tag = if tag.is_empty() {
            resolve_git_tag(client, sha_org, component)?
        } else {
            tag.to_string()
        };
        log::debug!("Component {} uses tag {}", component, tag);
        map.insert(
            component.to_string(),
            ComponentAttrs {
                org: org.to_string(),
                pull_policy: pull_policy.to_string(),
                tag,
            },
        );
    }
    Ok(map)
}

fn resolve_git_tag(client: &dyn RemoteOperations, sha_org: &str, component: &str) -> Result<String> {
    let shas = client
        .latest_commit_shas(sha_org, component)
        .map_err(|e| Error::Resolution {
            component: component.to_string(),
            message: format!("no tag given and couldn't fetch sha ({})", e),
        })?;
    let sha = shas.first().ok_or_else(|| Error::Resolution {
        component: component.to_string(),
        message: format!("no tag given and no sha returned for {}/{}", sha_org, component),
    })?;
    Ok(format!("{}{}", GIT_TAG_PREFIX, short_sha(sha)))
}

/// Render the map as TOML, one table per component
pub fn render_params(map: &ComponentMap) -> Result<String> {
    Ok(toml::to_string(map)?)
}

/// Path of the staged parameters file
pub fn params_file_path(staging_dir: &Path) -> PathBuf {
    staging_dir.join("tpl").join(PARAMS_FILE_NAME)
}

/// Output the parameters file.
///
/// When `stage` is set the file goes to `<staging_dir>/tpl/generate_params.toml`
/// through `fs`; otherwise it is written to `out`.
pub fn generate_params(
    stage: bool,
    fs: &mut dyn FileSystem,
    staging_dir: &Path,
    map: &ComponentMap,
    out: &mut dyn Write,
) -> Result<()> {
    let rendered = render_params(map)?;
    if !stage {
        out.write_all(rendered.as_bytes())?;
        return Ok(());
    }

    let path = params_file_path(staging_dir);
    if let Some(parent) = path.parent() {
        create_dir(fs, parent)?;
    }
    fs.write(&path, rendered.as_bytes())?;
    log::info!("Wrote parameters for {} component(s) to {}", map.len(), path.display());
    Ok(())
}
