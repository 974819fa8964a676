//! Filesystem abstraction with a disk backend and an in-memory backend
//!
//! Every staging and rewriting step goes through the [`FileSystem`] trait so
//! the same pipeline can write to a real directory tree ([`DiskFS`]) or to a
//! deterministic in-memory tree ([`MemoryFS`]) that tests can inspect without
//! touching the host.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Operations the staging pipeline needs from a filesystem.
pub trait FileSystem {
    /// Create a directory and all of its parents.
    ///
    /// Creating a directory that already exists is a no-op success.
    fn create_dir_all(&mut self, path: &Path) -> Result<()>;

    /// Create (or truncate) a file and return a handle for writing to it.
    fn create(&mut self, path: &Path) -> Result<Box<dyn Write + '_>>;

    /// Replace the contents of a file, creating it if needed.
    fn write(&mut self, path: &Path, content: &[u8]) -> Result<()>;

    /// Read the full contents of a file.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Check whether any entry exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Check whether a directory exists at `path`.
    fn is_dir(&self, path: &Path) -> bool;

    /// List every regular file at or below `root`, sorted.
    ///
    /// A file root yields itself. A missing root is a `NotFound` error.
    fn walk_files(&self, root: &Path) -> Result<Vec<PathBuf>>;
}

/// A file held by [`MemoryFS`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct File {
    /// File content as bytes
    pub content: Vec<u8>,
}

impl File {
    /// Create a new file with content
    pub fn new(content: Vec<u8>) -> Self {
        Self { content }
    }
}

/// An entry in the in-memory tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Directory marker
    Dir,
    /// Regular file with its buffer
    File(File),
}

/// In-memory filesystem for deterministic staging
///
/// Paths are normalized before use, so `staging/./foo` and `staging/foo/`
/// address the same entry. Parent directories are not required to exist
/// before a file is created.
#[derive(Debug, Clone, Default)]
pub struct MemoryFS {
    entries: BTreeMap<PathBuf, Entry>,
}

impl MemoryFS {
    /// Create a new empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file with string content
    pub fn add_file_string<P: AsRef<Path>>(&mut self, path: P, content: &str) -> Result<()> {
        self.write(path.as_ref(), content.as_bytes())
    }

    /// Get a file by path
    pub fn get_file<P: AsRef<Path>>(&self, path: P) -> Option<&File> {
        match self.entries.get(&normalize(path.as_ref())) {
            Some(Entry::File(file)) => Some(file),
            _ => None,
        }
    }

    /// Get the number of entries, directories included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if filesystem is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries in path order
    pub fn entries(&self) -> impl Iterator<Item = (&PathBuf, &Entry)> {
        self.entries.iter()
    }

    fn file_mut(&mut self, path: &Path) -> Result<&mut File> {
        match self.entries.get_mut(path) {
            Some(Entry::File(file)) => Ok(file),
            Some(Entry::Dir) => Err(Error::Filesystem {
                message: format!("'{}' is a directory", path.display()),
            }),
            None => Err(Error::not_found(path.display().to_string())),
        }
    }
}

impl FileSystem for MemoryFS {
    fn create_dir_all(&mut self, path: &Path) -> Result<()> {
        let path = normalize(path);
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            let is_file = self
                .entries
                .get(&current)
                .map(|entry| matches!(entry, Entry::File(_)));
            match is_file {
                Some(true) if current != path => {
                    return Err(Error::Filesystem {
                        message: format!(
                            "Cannot create '{}': '{}' is a file",
                            path.display(),
                            current.display()
                        ),
                    });
                }
                // An existing entry at the target itself is left alone
                Some(_) => {}
                None => {
                    self.entries.insert(current.clone(), Entry::Dir);
                }
            }
        }
        Ok(())
    }

    fn create(&mut self, path: &Path) -> Result<Box<dyn Write + '_>> {
        let path = normalize(path);
        if let Some(Entry::Dir) = self.entries.get(&path) {
            return Err(Error::Filesystem {
                message: format!("Cannot create file '{}': is a directory", path.display()),
            });
        }
        self.entries.insert(path.clone(), Entry::File(File::default()));
        let file = self.file_mut(&path)?;
        Ok(Box::new(&mut file.content))
    }

    fn write(&mut self, path: &Path, content: &[u8]) -> Result<()> {
        let path = normalize(path);
        match self.entries.get_mut(&path) {
            Some(Entry::File(file)) => {
                file.content = content.to_vec();
                Ok(())
            }
            Some(Entry::Dir) => Err(Error::Filesystem {
                message: format!("Cannot write '{}': is a directory", path.display()),
            }),
            None => {
                self.entries
                    .insert(path, Entry::File(File::new(content.to_vec())));
                Ok(())
            }
        }
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let path = normalize(path);
        match self.entries.get(&path) {
            Some(Entry::File(file)) => Ok(file.content.clone()),
            Some(Entry::Dir) => Err(Error::Filesystem {
                message: format!("Cannot read '{}': is a directory", path.display()),
            }),
            None => Err(Error::not_found(path.display().to_string())),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.entries.contains_key(&normalize(path))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.entries.get(&normalize(path)), Some(Entry::Dir))
    }

    fn walk_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let root = normalize(root);
        // Paths order component-wise, so every descendant of root follows it
        // contiguously in the map.
        let mut found_root = self.entries.contains_key(&root);
        let mut files = Vec::new();
        for (path, entry) in self
            .entries
            .range(root.clone()..)
            .take_while(|(path, _)| path.starts_with(&root))
        {
            found_root = true;
            if let Entry::File(_) = entry {
                files.push(path.clone());
            }
        }
        if !found_root {
            return Err(Error::not_found(root.display().to_string()));
        }
        Ok(files)
    }
}

/// Filesystem backed by the host's disk
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFS;

impl DiskFS {
    /// Create a handle on the host filesystem
    pub fn new() -> Self {
        Self
    }
}

fn io_error(action: &str, path: &Path, e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::NotFound {
        return Error::not_found(path.display().to_string());
    }
    Error::Filesystem {
        message: format!("Failed to {} '{}': {}", action, path.display(), e),
    }
}

impl FileSystem for DiskFS {
    fn create_dir_all(&mut self, path: &Path) -> Result<()> {
        // An existing file at the target counts as present
        if path.exists() {
            return Ok(());
        }
        fs::create_dir_all(path).map_err(|e| Error::Filesystem {
            message: format!("Failed to create directory '{}': {}", path.display(), e),
        })
    }

    fn create(&mut self, path: &Path) -> Result<Box<dyn Write + '_>> {
        let file = fs::File::create(path).map_err(|e| Error::Filesystem {
            message: format!("Failed to create file '{}': {}", path.display(), e),
        })?;
        Ok(Box::new(file))
    }

    fn write(&mut self, path: &Path, content: &[u8]) -> Result<()> {
        fs::write(path, content).map_err(|e| Error::Filesystem {
            message: format!("Failed to write file '{}': {}", path.display(), e),
        })
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|e| io_error("read", path, e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn walk_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                match e.into_io_error() {
                    Some(io) => io_error("walk", &path, io),
                    None => Error::Filesystem {
                        message: format!("Failed to walk '{}': filesystem loop", path.display()),
                    },
                }
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

/// Normalize a path for use as a [`MemoryFS`] key
///
/// Drops `.` components and trailing separators. `..` is kept as-is.
pub fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
