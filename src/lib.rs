//! # chartrel
//!
//! Release-engineering helper for Helm charts hosted on GitHub. It resolves
//! component image tags, downloads chart template files through the GitHub
//! contents API, stages them locally and stamps them with the active release.
//!
//! ## Quick Example
//!
//! ```
//! use chartrel::fetch::RemoteFile;
//! use chartrel::filesystem::{FileSystem, MemoryFS};
//! use chartrel::release::{update_files_with_release, FsWalker, ReleaseName};
//! use chartrel::stage::stage_files;
//! use std::path::Path;
//!
//! let mut fs = MemoryFS::new();
//! let files = vec![RemoteFile::from_bytes("workflow-dev-e2e/tpl/version", b"dev".to_vec())];
//! stage_files(&mut fs, files, Path::new("staging")).unwrap();
//!
//! let release = ReleaseName::new("v2.0.0", "2.0.0");
//! update_files_with_release(&FsWalker, &mut fs, &release, &["staging"]).unwrap();
//!
//! assert_eq!(
//!     fs.read(Path::new("staging/workflow-dev-e2e/tpl/version")).unwrap(),
//!     b"2.0.0"
//! );
//! ```
//!
//! ## Core Concepts
//!
//! - **Filesystem (`filesystem`)**: the `FileSystem` trait with a disk backend
//!   and an in-memory backend used for dry runs and tests.
//! - **Remote API (`remote`)**: the `RemoteOperations` trait and its GitHub
//!   implementation.
//! - **Fetching (`fetch`)**: selective download of a remote directory tree.
//! - **Staging (`stage`)**: writing downloaded files under a staging root.
//! - **Release stamping (`release`)**: replacing placeholder files with the
//!   release identifier.
//! - **Parameters (`params`)**: per-component image attributes and the
//!   generated parameters file.
//! - **Pipeline (`pipeline`)**: the actions exposed by the CLI, driven by an
//!   explicit `Config`.

pub mod config;
pub mod error;
pub mod fetch;
pub mod filesystem;
pub mod params;
pub mod pipeline;
pub mod release;
pub mod remote;
pub mod stage;

#[cfg(test)]
mod filesystem_proptest;
