use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use utoipa::ToSchema;

use super::category::UploadCategory;

/// Lowercased extension of a client-supplied filename, without the dot.
///
/// Dotfiles such as `.env` have no extension.
pub fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map(|e| e.to_lowercase())
}

/// A file whose bytes have been durably written and moved to their final path.
///
/// `original_name` comes from the client and is only ever used for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub filename: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: u64,
    pub path: PathBuf,
    pub category: UploadCategory,
}

/// Descriptive fields of a stored file as returned to the client.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadedFileResponse {
    pub filename: String,
    pub originalname: String,
    pub mimetype: String,
    pub size: u64,
    pub url: String,
    /// Absolute storage path (single-file uploads only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl UploadedFileResponse {
    pub fn new(file: &StoredFile, url: String, include_path: bool) -> Self {
        Self {
            filename: file.filename.clone(),
            originalname: file.original_name.clone(),
            mimetype: file.mime_type.clone(),
            size: file.size,
            url,
            path: include_path.then(|| file.path.display().to_string()),
        }
    }
}

/// Payload of a multi-file upload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BatchUploadData {
    pub files: Vec<UploadedFileResponse>,
    pub count: usize,
}

impl BatchUploadData {
    pub fn new(files: Vec<UploadedFileResponse>) -> Self {
        let count = files.len();
        Self { files, count }
    }
}

/// Outcome of a successful upload request.
///
/// Serialized without a tag: a single file object, or `{files, count}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum UploadResult {
    Single(UploadedFileResponse),
    Batch(BatchUploadData),
}
