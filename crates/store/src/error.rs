//! Error types for storage, images and configuration.
//!
//! None of these cross the store's mutation API: the store logs them and
//! degrades (fewer images, stale durable copy). They surface only from the
//! fallible constructors and from the backends themselves.

use thiserror::Error;

/// Key-value storage failure.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend rejected or failed the operation.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// The backend could not be opened.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// An image reference that could not be loaded.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("unsupported image uri scheme: {0}")]
    UnsupportedScheme(String),

    #[error("image not readable: {uri}")]
    Unreadable {
        uri: String,
        #[source]
        source: std::io::Error,
    },

    #[error("image uri does not point to a file: {0}")]
    NotAFile(String),

    #[error("image file is empty: {0}")]
    Empty(String),

    /// Generic rejection from a loader that has no richer detail.
    #[error("image rejected: {0}")]
    Rejected(String),
}

/// Invalid configuration value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("cannot resolve application data directory")]
    NoDataDir,
}

/// Failure while assembling a store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
