//! Bizdesk Storage Library
//!
//! This crate provides the storage abstraction for uploaded files and its local
//! filesystem implementation.
//!
//! # On-disk layout
//!
//! Files live under a single upload root, one directory per category:
//!
//! - `{root}/{category_dir}/{filename}` for stored files
//! - `{root}/.staging/` for in-progress writes, never served
//!
//! Filenames are generated by the `keys` module and must not contain path
//! separators, `..` or a leading dot. Public URLs mirror the on-disk layout
//! under a configurable prefix.

pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use keys::{generate_filename, public_url};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use traits::{ByteStream, Storage, StorageError, StorageResult, WrittenFile};
