//! Bizdesk Core Library
//!
//! This crate provides the upload domain models, the category table, error types
//! and configuration shared by the storage, processing and API crates.

pub mod categories;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use categories::{CategorySpec, CategoryTable};
pub use config::{BaseConfig, Config, UploadLimits, UploadServiceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    BatchUploadData, MimeRule, StoredFile, UploadCategory, UploadResult, UploadedFileResponse,
    ValidationRule,
};
