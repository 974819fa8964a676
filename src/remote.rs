//! # Remote Hosting API
//!
//! The content fetcher and parameter assembly talk to the source-control host
//! through the [`RemoteOperations`] trait. [`GitHubClient`] implements it with
//! blocking `reqwest` calls against the GitHub REST API; tests substitute a
//! scripted implementation.
//!
//! Only three capabilities are needed:
//!
//! - list the entries of a directory (`GET /repos/{org}/{repo}/contents/{path}`)
//! - fetch the raw bytes of a file (same endpoint, base64 `content` field)
//! - list the latest commit SHAs of a repository (`GET /repos/{org}/{repo}/commits`)
//!
//! Retries and rate limiting are left to the HTTP layer; every error is
//! returned as-is.

use crate::error::{Error, Result};
use base64::Engine;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Default GitHub API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Kind of an entry returned by a contents listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Dir,
    Symlink,
    Submodule,
}

/// One entry of a contents listing
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub name: String,
    /// Path relative to the repository root
    pub path: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub download_url: Option<String>,
    /// Inline content, only present when a single file is requested
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

impl ContentEntry {
    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Dir
    }

    pub fn is_file(&self) -> bool {
        self.entry_type == EntryType::File
    }

    /// Decode the inline content of a file entry.
    ///
    /// Returns `None` when the API did not inline the content (large files).
    pub fn decoded_content(&self) -> Result<Option<Vec<u8>>> {
        let Some(raw) = self.content.as_deref() else {
            return Ok(None);
        };
        match self.encoding.as_deref() {
            Some("base64") => {
                // GitHub wraps base64 payloads at 60 columns
                let compact: String = raw.chars().filter(|c| !c.is_ascii_whitespace()).collect();
                base64::engine::general_purpose::STANDARD
                    .decode(compact)
                    .map(Some)
                    .map_err(|e| Error::Decode {
                        path: self.path.clone(),
                        message: e.to_string(),
                    })
            }
            Some("none") => Ok(None),
            _ => Ok(Some(raw.as_bytes().to_vec())),
        }
    }
}

/// Options applied to contents requests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentOptions {
    /// Branch, tag or commit to read from; the default branch when unset
    pub ref_name: Option<String>,
}

impl ContentOptions {
    pub fn at_ref(ref_name: impl Into<String>) -> Self {
        Self {
            ref_name: Some(ref_name.into()),
        }
    }
}

/// Trait for the remote hosting API - allows scripted fakes in tests
pub trait RemoteOperations {
    /// List the entries of a directory. A file path yields a single entry.
    fn list_contents(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        opts: &ContentOptions,
    ) -> Result<Vec<ContentEntry>>;

    /// Retrieve the raw bytes of a file.
    fn get_content(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        opts: &ContentOptions,
    ) -> Result<Vec<u8>>;

    /// Retrieve the most recent commit SHAs of a repository, newest first.
    fn latest_commit_shas(&self, org: &str, repo: &str) -> Result<Vec<String>>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Listing(Vec<ContentEntry>),
    Single(ContentEntry),
}

#[derive(Deserialize)]
struct CommitSummary {
    sha: String,
}

/// [`RemoteOperations`] over the GitHub REST API
pub struct GitHubClient {
    base_url: Url,
    client: reqwest::blocking::Client,
}

impl GitHubClient {
    /// Create a client for the public GitHub API
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_API_URL, Duration::from_secs(30))
    }

    /// Create a client for an arbitrary API endpoint (GitHub Enterprise, test servers)
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("chartrel/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| Error::RemoteApi {
                url: base_url.to_string(),
                status: None,
                message: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn api_url<'s>(&self, segments: impl IntoIterator<Item = &'s str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::RemoteApi {
                url: self.base_url.to_string(),
                status: None,
                message: "API URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn contents_url(&self, org: &str, repo: &str, path: &str, opts: &ContentOptions) -> Result<Url> {
        let path_segments = path.split('/').filter(|s| !s.is_empty());
        let mut url = self.api_url(
            ["repos", org, repo, "contents"]
                .into_iter()
                .chain(path_segments),
        )?;
        if let Some(ref_name) = &opts.ref_name {
            url.query_pairs_mut().append_pair("ref", ref_name);
        }
        Ok(url)
    }

    fn get(&self, url: &Url) -> Result<reqwest::blocking::Response> {
        log::debug!("GET {}", url);
        let resp = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .map_err(|e| Error::RemoteApi {
                url: url.to_string(),
                status: None,
                message: e.to_string(),
            })?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(Error::RemoteApi {
                url: url.to_string(),
                status: Some(status.as_u16()),
                message: api_message(&body)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string()),
            });
        }
        Ok(resp)
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &Url) -> Result<T> {
        self.get(url)?.json::<T>().map_err(|e| Error::RemoteApi {
            url: url.to_string(),
            status: None,
            message: format!("invalid response body: {}", e),
        })
    }

    fn get_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        let bytes = self.get(url)?.bytes().map_err(|e| Error::RemoteApi {
            url: url.to_string(),
            status: None,
            message: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }
}

/// Extract the `message` field of a GitHub error body
fn api_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

impl RemoteOperations for GitHubClient {
    fn list_contents(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        opts: &ContentOptions,
    ) -> Result<Vec<ContentEntry>> {
        let url = self.contents_url(org, repo, path, opts)?;
        match self.get_json::<ContentsResponse>(&url)? {
            ContentsResponse::Listing(entries) => Ok(entries),
            ContentsResponse::Single(entry) => Ok(vec![entry]),
        }
    }

    fn get_content(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        opts: &ContentOptions,
    ) -> Result<Vec<u8>> {
        let url = self.contents_url(org, repo, path, opts)?;
        let entry = match self.get_json::<ContentsResponse>(&url)? {
            ContentsResponse::Single(entry) => entry,
            ContentsResponse::Listing(_) => {
                return Err(Error::RemoteApi {
                    url: url.to_string(),
                    status: None,
                    message: format!("'{}' is a directory, not a file", path),
                });
            }
        };
        if let Some(content) = entry.decoded_content()? {
            return Ok(content);
        }
        match entry.download_url.as_deref() {
            Some(download_url) => self.get_bytes(&Url::parse(download_url)?),
            None => Err(Error::RemoteApi {
                url: url.to_string(),
                status: None,
                message: format!("no content or download URL for '{}'", path),
            }),
        }
    }

    fn latest_commit_shas(&self, org: &str, repo: &str) -> Result<Vec<String>> {
        let mut url = self.api_url(["repos", org, repo, "commits"])?;
        url.query_pairs_mut().append_pair("per_page", "1");
        let commits: Vec<CommitSummary> = self.get_json(&url)?;
        Ok(commits.into_iter().map(|c| c.sha).collect())
    }
}
