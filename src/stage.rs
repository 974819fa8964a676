//! Staging downloaded files into a local tree
//!
//! Writes [`RemoteFile`]s under a destination directory through the
//! [`FileSystem`] abstraction, mirroring each file's relative path. The first
//! failure aborts the whole batch.

use std::io;
use std::path::Path;

use crate::error::{Error, Result};
use crate::fetch::RemoteFile;
use crate::filesystem::FileSystem;

/// Create `path` and its parents, leaving any existing entry untouched.
pub fn create_dir(fs: &mut dyn FileSystem, path: &Path) -> Result<()> {
    if fs.exists(path) {
        return Ok(());
    }
    fs.create_dir_all(path)
}

/// Write every file under `dest_dir`, in input order.
///
/// Each file's stream is consumed once and dropped as soon as it has been
/// written, whether or not the write succeeded.
pub fn stage_files(fs: &mut dyn FileSystem, files: Vec<RemoteFile>, dest_dir: &Path) -> Result<()> {
    create_dir(fs, dest_dir)?;

    for file in files {
        let RemoteFile {
            file_name,
            mut content,
        } = file;
        let target = dest_dir.join(file_name.trim_start_matches('/'));

        if let Some(parent) = target.parent() {
            create_dir(fs, parent)?;
        }

        let mut handle = fs.create(&target)?;
        let written = io::copy(&mut content, &mut handle)
            .and_then(|n| handle.flush().map(|_| n))
            .map_err(|e| Error::Filesystem {
                message: format!("Failed to write file '{}': {}", target.display(), e),
            })?;
        log::debug!("Staged '{}' ({} bytes)", target.display(), written);
    }

    Ok(())
}
