//! # Configuration
//!
//! All process-wide settings of a `chartrel` run live in [`Config`], which is
//! passed explicitly into the pipeline. A config can be read from a YAML file
//! (`.chartrel.yaml` by default); command-line flags override the file.
//!
//! ```yaml
//! org: deisci
//! pull-policy: Always
//! stage: true
//! staging-path: staging
//! chart-repo: charts
//! chart-files:
//!   - workflow-dev-e2e/Chart.yaml
//!   - workflow-dev-e2e/tpl/generate_params.toml
//! ```

use crate::error::{Error, Result};
use crate::remote::DEFAULT_API_URL;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = ".chartrel.yaml";

/// Image pull policies accepted by Kubernetes
pub const PULL_POLICIES: [&str; 3] = ["Always", "IfNotPresent", "Never"];

/// Settings for one run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// Image organization written into the parameters file
    pub org: String,
    /// Image pull policy written into the parameters file
    pub pull_policy: String,
    /// Explicit image tag; empty means resolve from the latest commit
    pub tag: String,
    /// Write output under the staging path instead of stdout
    pub stage: bool,
    /// Root of the staged tree
    pub staging_path: PathBuf,
    /// Hosting API endpoint
    pub api_url: String,
    /// Organization owning the component and chart repositories
    pub sha_org: String,
    /// Repository holding the chart templates
    pub chart_repo: String,
    /// Branch, tag or commit of the chart repository to read
    pub chart_ref: Option<String>,
    /// Repository paths to download and stage
    pub chart_files: Vec<String>,
    /// Content treated as the release placeholder
    pub sentinel: String,
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            org: "deisci".to_string(),
            pull_policy: "Always".to_string(),
            tag: String::new(),
            stage: false,
            staging_path: PathBuf::from("staging"),
            api_url: DEFAULT_API_URL.to_string(),
            sha_org: "deis".to_string(),
            chart_repo: "charts".to_string(),
            chart_ref: None,
            chart_files: Vec::new(),
            sentinel: crate::release::DEFAULT_SENTINEL.to_string(),
            http_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Parse a YAML document; missing keys take their defaults.
    pub fn parse(yaml_content: &str) -> Result<Self> {
        if yaml_content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(yaml_content).map_err(|e| Error::ConfigParse {
            message: e.to_string(),
            hint: Some("see the chartrel README for the list of keys".to_string()),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from a YAML file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        Self::parse(&content)
    }

    /// Check the values that later stages rely on
    pub fn validate(&self) -> Result<()> {
        if self.org.trim().is_empty() {
            return Err(Error::ConfigParse {
                message: "org must not be empty".to_string(),
                hint: None,
            });
        }
        if !PULL_POLICIES.contains(&self.pull_policy.as_str()) {
            return Err(Error::ConfigParse {
                message: format!("unknown pull policy '{}'", self.pull_policy),
                hint: Some(format!("use one of {}", PULL_POLICIES.join(", "))),
            });
        }
        url::Url::parse(&self.api_url)?;
        if self.sentinel.is_empty() {
            return Err(Error::ConfigParse {
                message: "sentinel must not be empty".to_string(),
                hint: None,
            });
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
