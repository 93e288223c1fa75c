//! # Error Module
//!
//! Error types for the ingest core.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Expected negatives are values** - a missing preview or an existing
//!   destination is an outcome, not an error
//! - **Narrow scope** - a failure belongs to one file, one directory or one call

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Preview error: {0}")]
    Preview(#[from] PreviewError),

    #[error("Thumbnail cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Volume monitor error: {0}")]
    Monitor(#[from] MonitorError),

    #[error("Failed to prepare destination {path}: {source}")]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors while reading a RAW file for its embedded preview
#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("Failed to open RAW file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read RAW file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No embedded preview found in {path}")]
    NotFound { path: PathBuf },
}

/// Errors that occur with the thumbnail cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Could not determine a cache directory for this user")]
    NoCacheDir,

    #[error("Failed to create cache directory {path}: {source}")]
    CreateRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to stat source file {path}: {source}")]
    SourceMetadata {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write cache entry {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to list cache directory {path}: {source}")]
    List {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while scanning a media directory
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error raised while reading `path`
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => ScanError::DirectoryNotFound { path },
            std::io::ErrorKind::PermissionDenied => ScanError::PermissionDenied { path },
            _ => ScanError::ReadDirectory { path, source },
        }
    }
}

/// Errors from the removable volume monitor
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Failed to spawn monitor thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Monitor thread panicked")]
    Panicked,
}

/// Why a single file in a transfer job was not copied.
///
/// These are per-file outcomes recorded in the transfer report; none of
/// them stops the rest of the batch.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransferFailure {
    #[error("Unsupported format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("File already exists: {destination}")]
    AlreadyExists { destination: PathBuf },

    #[error("Failed to open source file {path}: {reason}")]
    SourceUnreadable { path: PathBuf, reason: String },

    #[error("Failed to copy to {destination}: {reason}")]
    Copy { destination: PathBuf, reason: String },

    #[error("Transfer was cancelled")]
    Cancelled,
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, IngestError>;
