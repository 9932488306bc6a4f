//! Storage abstraction trait
//!
//! This module defines the Storage trait that upload storage backends implement.

use async_trait::async_trait;
use bizdesk_core::{CategoryTable, UploadCategory};
use bytes::Bytes;
use futures::Stream;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid filename: {0}")]
    InvalidKey(String),

    #[error("File exceeds the {max} byte limit")]
    TooLarge { max: u64 },

    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("Upload stream failed: {0}")]
    StreamError(#[source] std::io::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Chunked body of an incoming file.
pub type ByteStream<'a> = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send + 'a>>;

/// Location and size of a file that was durably written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Storage abstraction trait
///
/// Files are addressed by `(category, filename)`. The category picks the
/// directory; the filename is a generated leaf name and never a path.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Create every category directory (and any private working directory).
    /// Idempotent.
    async fn provision(&self, categories: &CategoryTable) -> StorageResult<()>;

    /// Stream a file into place.
    ///
    /// Bytes go to a private staging file first and are renamed to the final
    /// location only after they are flushed to disk. Exceeding `max_bytes`, a
    /// stream error, or dropping the returned future leaves nothing behind.
    /// An existing file with the same name is never overwritten.
    async fn write_stream<'a>(
        &self,
        category: UploadCategory,
        filename: &str,
        max_bytes: u64,
        stream: ByteStream<'a>,
    ) -> StorageResult<WrittenFile>;

    /// Delete a stored file. Returns `false` when it did not exist.
    async fn delete(&self, category: UploadCategory, filename: &str) -> StorageResult<bool>;

    /// Best-effort synchronous removal, usable from `Drop`.
    fn discard(&self, category: UploadCategory, filename: &str);

    /// Check if a file exists
    async fn exists(&self, category: UploadCategory, filename: &str) -> StorageResult<bool>;

    /// Client-visible URL of a stored file
    fn public_url(&self, category: UploadCategory, filename: &str) -> String;

    /// Absolute upload root
    fn root(&self) -> &Path;
}
