//! # Release Rewriter
//!
//! Stamps staged template files with the active release. A file whose whole
//! content is the sentinel placeholder (`dev` by default) is overwritten with
//! the release's short identifier; every other file is left alone.
//!
//! An empty short identifier means there is no active release. In that case
//! nothing is walked and nothing is touched.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::filesystem::FileSystem;

/// Placeholder content replaced by the release short identifier
pub const DEFAULT_SENTINEL: &str = "dev";

/// A release in its full and short forms, e.g. `v2.0.0-beta1` / `2.0.0-beta1`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseName {
    pub full: String,
    pub short: String,
}

impl ReleaseName {
    pub fn new(full: impl Into<String>, short: impl Into<String>) -> Self {
        Self {
            full: full.into(),
            short: short.into(),
        }
    }

    /// True when a release is in effect
    pub fn is_active(&self) -> bool {
        !self.short.is_empty()
    }
}

/// Walks a tree to find the files to rewrite.
pub trait FileWalker {
    /// Every regular file at or below `root`.
    fn walk(&self, fs: &dyn FileSystem, root: &Path) -> Result<Vec<PathBuf>>;
}

/// The default walker, backed by [`FileSystem::walk_files`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWalker;

impl FileWalker for FsWalker {
    fn walk(&self, fs: &dyn FileSystem, root: &Path) -> Result<Vec<PathBuf>> {
        fs.walk_files(root)
    }
}

/// Rewrite sentinel files under `roots` with `release.short`.
pub fn update_files_with_release<P: AsRef<Path>>(
    walker: &dyn FileWalker,
    fs: &mut dyn FileSystem,
    release: &ReleaseName,
    roots: &[P],
) -> Result<()> {
    update_files_with_release_matching(walker, fs, release, DEFAULT_SENTINEL, roots)
}

/// Same as [`update_files_with_release`] with a custom sentinel.
pub fn update_files_with_release_matching<P: AsRef<Path>>(
    walker: &dyn FileWalker,
    fs: &mut dyn FileSystem,
    release: &ReleaseName,
    sentinel: &str,
    roots: &[P],
) -> Result<()> {
    if !release.is_active() {
        log::debug!("No active release, leaving staged files untouched");
        return Ok(());
    }

    let mut rewritten = 0usize;
    for root in roots {
        for path in walker.walk(&*fs, root.as_ref())? {
            let content = fs.read(&path)?;
            if is_sentinel(&content, sentinel) {
                fs.write(&path, release.short.as_bytes())?;
                log::debug!("Stamped '{}' with release {}", path.display(), release.short);
                rewritten += 1;
            }
        }
    }

    log::info!(
        "Stamped {} file(s) with release {} ({})",
        rewritten,
        release.short,
        release.full
    );
    Ok(())
}

/// Whole-content match, ignoring surrounding whitespace
fn is_sentinel(content: &[u8], sentinel: &str) -> bool {
    content.trim_ascii() == sentinel.as_bytes()
}
