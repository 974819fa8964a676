//! # Content Fetcher
//!
//! Downloads a selected set of files from a remote repository. The remote
//! tree is walked depth-first through the contents listing API, and only the
//! files whose repository path was asked for are retrieved.
//!
//! ## Process
//!
//! 1.  **Scopes**: The parent directory of every wanted path becomes a listing
//!     scope, so the walk never lists more of the repository than needed.
//! 2.  **Walk**: Each scope is listed; directories are visited recursively in
//!     listing order, files in the wanted set are downloaded.
//! 3.  **Check**: If a wanted path was never seen, the whole call fails with
//!     `NotFound` naming every missing path. No partial result is returned.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::io::{Cursor, Read};

use crate::error::{Error, Result};
use crate::remote::{ContentEntry, ContentOptions, RemoteOperations};

/// A downloaded remote file, ready to be staged
///
/// `content` is read exactly once by the stager and dropped afterwards.
pub struct RemoteFile {
    /// Path relative to the repository root
    pub file_name: String,
    pub content: Box<dyn Read>,
}

impl RemoteFile {
    pub fn new(file_name: impl Into<String>, content: Box<dyn Read>) -> Self {
        Self {
            file_name: file_name.into(),
            content,
        }
    }

    /// Build a file from an in-memory buffer
    pub fn from_bytes(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self::new(file_name, Box::new(Cursor::new(content)))
    }
}

impl fmt::Debug for RemoteFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteFile")
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

/// Download every path in `wanted` from `org/repo`.
///
/// Returns one [`RemoteFile`] per wanted path, in walk order.
pub fn download_files<S: AsRef<str>>(
    client: &dyn RemoteOperations,
    org: &str,
    repo: &str,
    opts: &ContentOptions,
    wanted: &[S],
) -> Result<Vec<RemoteFile>> {
    let wanted: Vec<String> = wanted
        .iter()
        .map(|p| p.as_ref().trim_matches('/').to_string())
        .collect();

    let mut walk = Walk {
        client,
        org,
        repo,
        opts,
        wanted: wanted.iter().map(String::as_str).collect(),
        visited: HashSet::new(),
        matched: HashSet::new(),
        files: Vec::new(),
    };

    for scope in listing_scopes(&wanted) {
        if walk.visited.contains(scope) {
            continue;
        }
        walk.visit_scope(scope)?;
    }

    let missing: BTreeSet<&str> = wanted
        .iter()
        .map(String::as_str)
        .filter(|p| !walk.matched.contains(*p))
        .collect();
    if !missing.is_empty() {
        return Err(Error::NotFound {
            paths: missing.into_iter().map(str::to_string).collect(),
        });
    }

    log::info!(
        "Downloaded {} file(s) from {}/{}",
        walk.files.len(),
        org,
        repo
    );
    Ok(walk.files)
}

/// Parent directories of the wanted paths, first-seen order, deduplicated
fn listing_scopes(wanted: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    wanted
        .iter()
        .map(|p| p.rsplit_once('/').map(|(dir, _)| dir).unwrap_or(""))
        .filter(|dir| seen.insert(*dir))
        .collect()
}

struct Walk<'a> {
    client: &'a dyn RemoteOperations,
    org: &'a str,
    repo: &'a str,
    opts: &'a ContentOptions,
    wanted: HashSet<&'a str>,
    visited: HashSet<String>,
    matched: HashSet<String>,
    files: Vec<RemoteFile>,
}

impl Walk<'_> {
    /// Walk a listing scope; a scope the remote does not have holds nothing
    fn visit_scope(&mut self, dir: &str) -> Result<()> {
        self.visited.insert(dir.to_string());
        match self
            .client
            .list_contents(self.org, self.repo, dir, self.opts)
        {
            Ok(entries) => self.visit_entries(dir, entries),
            Err(Error::RemoteApi {
                status: Some(404), ..
            }) => {
                log::debug!("No directory '{}' in {}/{}", dir, self.org, self.repo);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn visit(&mut self, dir: &str) -> Result<()> {
        self.visited.insert(dir.to_string());
        let entries = self
            .client
            .list_contents(self.org, self.repo, dir, self.opts)?;
        self.visit_entries(dir, entries)
    }

    fn visit_entries(&mut self, dir: &str, entries: Vec<ContentEntry>) -> Result<()> {
        log::debug!("Listed {} entries under '{}'", entries.len(), dir);

        for entry in entries {
            let path = entry.path.trim_matches('/');
            if entry.is_dir() {
                // The API may report a directory as an entry of itself
                if !self.visited.contains(path) {
                    self.visit(path)?;
                }
            } else if entry.is_file() {
                if !self.wanted.contains(path) || self.matched.contains(path) {
                    continue;
                }
                let content = self
                    .client
                    .get_content(self.org, self.repo, path, self.opts)?;
                log::debug!("Fetched '{}' ({} bytes)", path, content.len());
                self.matched.insert(path.to_string());
                self.files.push(RemoteFile::from_bytes(path, content));
            } else {
                log::warn!("Skipping {:?} entry '{}'", entry.entry_type, path);
            }
        }
        Ok(())
    }
}
