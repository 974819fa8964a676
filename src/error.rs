//! # Error Handling
//!
//! This module defines the centralized error type for `chartrel`. It uses
//! `thiserror` to describe every failure mode of the staging pipeline with
//! enough context to act on the message.
//!
//! ## Key Components
//!
//! - **`Error`**: covers remote API failures, missing remote or local paths,
//!   local filesystem failures, tag resolution failures and configuration
//!   problems.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Every core operation is fail-fast: the first error aborts the remaining
//! work of the call and is returned unchanged to the caller. The library never
//! terminates the process; the binary reports the error and exits non-zero.

use thiserror::Error;

/// Main error type for chartrel operations
#[derive(Error, Debug)]
pub enum Error {
    /// One or more requested paths do not exist.
    ///
    /// Raised by the content fetcher after a full traversal of the remote tree,
    /// and by the filesystem backends when reading an absent entry.
    #[error("Not found: {}", paths.join(", "))]
    NotFound { paths: Vec<String> },

    /// A call to the remote hosting API failed.
    ///
    /// `status` is present when the server answered with a non-success HTTP
    /// status, and absent for transport failures.
    #[error("Remote API error for {url}{}: {message}", status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
    RemoteApi {
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// A local filesystem operation failed.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// A component tag could not be resolved from the remote commit history.
    #[error("Tag resolution error for {component}: {message}")]
    Resolution { component: String, message: String },

    /// Remote file content could not be decoded.
    #[error("Content decode error for {path}: {message}")]
    Decode { path: String, message: String },

    /// An error occurred while parsing or validating the configuration.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A TOML serialization error, wrapped from `toml::ser::Error`.
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A URL parsing error, wrapped from `url::ParseError`.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Builds a `NotFound` error for a single path.
    pub fn not_found(path: impl Into<String>) -> Self {
        Error::NotFound {
            paths: vec![path.into()],
        }
    }

    /// Returns true for the `NotFound` kind.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
