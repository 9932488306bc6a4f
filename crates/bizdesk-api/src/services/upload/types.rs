//! Types used by the upload service

use std::sync::Arc;

use bizdesk_core::{AppError, StoredFile, UploadCategory};
use bizdesk_storage::Storage;

use crate::constants::{FILES_FIELD, FILE_FIELD};

/// Shape of the multipart request an endpoint accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMode {
    /// Exactly one part named `file`
    Single,
    /// One or more parts named `files`, at most `max_files`
    Batch { max_files: usize },
}

impl UploadMode {
    pub fn field_name(&self) -> &'static str {
        match self {
            UploadMode::Single => FILE_FIELD,
            UploadMode::Batch { .. } => FILES_FIELD,
        }
    }

    pub fn max_files(&self) -> usize {
        match self {
            UploadMode::Single => 1,
            UploadMode::Batch { max_files } => *max_files,
        }
    }

    pub fn missing(&self) -> AppError {
        match self {
            UploadMode::Single => AppError::MissingFile("No file uploaded".to_string()),
            UploadMode::Batch { .. } => AppError::MissingFile("No files uploaded".to_string()),
        }
    }

    pub fn too_many(&self) -> AppError {
        match self {
            UploadMode::Single => AppError::ValidationFailure(format!(
                "Only one file may be sent in the '{}' field",
                FILE_FIELD
            )),
            UploadMode::Batch { max_files } => AppError::ValidationFailure(format!(
                "Too many files. Maximum is {} files per upload",
                max_files
            )),
        }
    }
}

/// Files stored so far by one request.
///
/// Unless [`PendingBatch::commit`] is called, dropping the batch removes every
/// file in it. That covers early returns, errors and the request future being
/// dropped on timeout or client disconnect.
pub struct PendingBatch {
    storage: Arc<dyn Storage>,
    category: UploadCategory,
    files: Vec<StoredFile>,
    committed: bool,
}

impl PendingBatch {
    pub fn new(storage: Arc<dyn Storage>, category: UploadCategory) -> Self {
        Self {
            storage,
            category,
            files: Vec::new(),
            committed: false,
        }
    }

    pub fn push(&mut self, file: StoredFile) {
        self.files.push(file);
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn commit(mut self) -> Vec<StoredFile> {
        self.committed = true;
        std::mem::take(&mut self.files)
    }
}

impl Drop for PendingBatch {
    fn drop(&mut self) {
        if self.committed || self.files.is_empty() {
            return;
        }

        tracing::warn!(
            category = %self.category,
            count = self.files.len(),
            "Upload did not complete, removing files already stored by this request"
        );
        for file in &self.files {
            self.storage.discard(self.category, &file.filename);
        }
    }
}
