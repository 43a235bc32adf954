//! Error types for the iflow-tools core library

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the core library
///
/// Variants fall into three groups: configuration problems the user can fix
/// by editing the config file or the command line, repository layout and
/// version-control failures, and plain I/O errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration value
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// A key a command depends on is not set
    #[error("Missing required configuration key: {key}")]
    MissingKey { key: String },

    /// Package include/exclude pattern did not compile
    #[error("Invalid package pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The configured packages directory does not exist
    #[error("Packages directory not found: {}", path.display())]
    PackagesDirNotFound { path: PathBuf },

    /// A package id given on the command line is not in the repository
    #[error("Unknown package: {id}")]
    UnknownPackage { id: String, known: Vec<String> },

    /// The repository directory is not inside a git work tree
    #[error("Not a git repository: {}", path.display())]
    NotAGitRepository { path: PathBuf },

    /// The comparison ref does not resolve to a commit
    #[error("Unknown git revision: {reference}")]
    UnknownRevision { reference: String },

    /// A git command exited unsuccessfully
    #[error("git {command} failed: {stderr}")]
    Git { command: String, stderr: String },

    /// I/O error with the path it happened on
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create an invalid configuration error
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create a missing key error
    pub fn missing_key(key: &str) -> Self {
        Self::MissingKey {
            key: key.to_string(),
        }
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(pattern: &str, reason: impl ToString) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a git failure error
    pub fn git(command: &str, stderr: &[u8]) -> Self {
        Self::Git {
            command: command.to_string(),
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        }
    }

    /// Attach a path to an I/O error
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether the error is caused by how the tool was invoked or configured
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration { .. }
                | Self::MissingKey { .. }
                | Self::InvalidPattern { .. }
                | Self::UnknownPackage { .. }
                | Self::UnknownRevision { .. }
        )
    }

    /// Whether the error is caused by missing or unreadable files
    pub fn is_filesystem_error(&self) -> bool {
        matches!(
            self,
            Self::PackagesDirNotFound { .. } | Self::NotAGitRepository { .. } | Self::Io { .. }
        )
    }
}
