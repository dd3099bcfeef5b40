/*!
 * Error types for the mediatidy application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by filesystem work inside a cleanup pass
#[derive(Error, Debug)]
pub enum CleanupError {
    /// The content directory itself cannot be walked
    #[error("Cannot read content directory {path:?}: {source}")]
    UnreadableRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A rename failed, usually because the source vanished
    #[error("Failed to rename {from:?} to {to:?}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file or directory could not be deleted
    #[error("Failed to delete {path:?}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File metadata (size) could not be read
    #[error("Failed to read metadata for {path:?}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The manual review log could not be written
    #[error("Failed to append to review log {path:?}: {source}")]
    ReviewLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors found while validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A 2-letter -> 3-letter mapping that does not describe one language
    #[error("Invalid language pair {short} -> {long}: {reason}")]
    InvalidLanguagePair {
        short: String,
        long: String,
        reason: String,
    },

    /// Forced-track size threshold outside of 1..=99 percent
    #[error("Forced size threshold must be between 1 and 99 percent, got {0}")]
    InvalidThreshold(u64),

    /// Nothing to clean
    #[error("No content directories configured")]
    NoContentDirectories,

    /// Metadata pass has nothing to match
    #[error("Metadata extension list must not be empty")]
    NoMetadataExtensions,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
