//! Upload dispatcher
//!
//! Reads a multipart request, validates each file part against its category
//! before any byte is written, streams accepted parts into storage and builds
//! the response payload. The whole request runs under a deadline; anything
//! stored by a request that does not complete is removed again.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::multipart::Field;
use axum::extract::Multipart;
use bizdesk_core::{
    AppError, BatchUploadData, CategoryTable, StoredFile, UploadCategory, UploadResult,
    UploadedFileResponse,
};
use bizdesk_processing::CategoryValidator;
use bizdesk_storage::{generate_filename, ByteStream, Storage, StorageError};
use futures::TryStreamExt;

use crate::constants::DEFAULT_CONTENT_TYPE;
use crate::error::{storage_error_to_app, validation_error_to_app};
use crate::state::AppState;
use crate::utils::upload::{multipart_error, original_name, stream_failure};

use super::types::{PendingBatch, UploadMode};

pub struct UploadService {
    storage: Arc<dyn Storage>,
    categories: Arc<CategoryTable>,
    max_files: usize,
    timeout: Duration,
}

impl UploadService {
    pub fn new(state: &AppState) -> Self {
        Self::from_parts(
            state.storage.clone(),
            state.categories.clone(),
            state.config.max_files_per_request(),
            state.upload_timeout(),
        )
    }

    pub fn from_parts(
        storage: Arc<dyn Storage>,
        categories: Arc<CategoryTable>,
        max_files: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            storage,
            categories,
            max_files,
            timeout,
        }
    }

    /// Store the single `file` part of the request
    pub async fn upload_single(
        &self,
        category: UploadCategory,
        multipart: Multipart,
    ) -> Result<UploadResult, AppError> {
        let mode = UploadMode::Single;
        let mut files = self.receive(category, multipart, mode).await?;
        let file = files.pop().ok_or_else(|| mode.missing())?;

        let url = self.storage.public_url(category, &file.filename);
        Ok(UploadResult::Single(UploadedFileResponse::new(
            &file, url, true,
        )))
    }

    /// Store every `files` part of the request, all or nothing
    pub async fn upload_many(
        &self,
        category: UploadCategory,
        multipart: Multipart,
    ) -> Result<UploadResult, AppError> {
        let mode = UploadMode::Batch {
            max_files: self.max_files,
        };
        let files = self.receive(category, multipart, mode).await?;

        let responses = files
            .iter()
            .map(|file| {
                let url = self.storage.public_url(category, &file.filename);
                UploadedFileResponse::new(file, url, false)
            })
            .collect();
        Ok(UploadResult::Batch(BatchUploadData::new(responses)))
    }

    /// Delete a stored file. `category_name` may be the category or its directory.
    pub async fn delete(
        &self,
        category_name: &str,
        filename: &str,
    ) -> Result<UploadCategory, AppError> {
        let category: UploadCategory = category_name.parse().map_err(|_| {
            AppError::NotFound(format!("Unknown upload category: {}", category_name))
        })?;

        let removed = self
            .storage
            .delete(category, filename)
            .await
            .map_err(storage_error_to_app)?;
        if !removed {
            return Err(AppError::NotFound(format!("File not found: {}", filename)));
        }

        tracing::info!(category = %category, filename = %filename, "File deleted");
        Ok(category)
    }

    async fn receive(
        &self,
        category: UploadCategory,
        multipart: Multipart,
        mode: UploadMode,
    ) -> Result<Vec<StoredFile>, AppError> {
        match tokio::time::timeout(self.timeout, self.collect(category, multipart, mode)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    category = %category,
                    timeout_secs = self.timeout.as_secs_f64(),
                    "Upload timed out"
                );
                Err(AppError::Timeout(format!(
                    "Upload did not complete within {} seconds",
                    self.timeout.as_secs()
                )))
            }
        }
    }

    async fn collect(
        &self,
        category: UploadCategory,
        mut multipart: Multipart,
        mode: UploadMode,
    ) -> Result<Vec<StoredFile>, AppError> {
        let validator = CategoryValidator::new(self.categories.get(category));
        let mut batch = PendingBatch::new(self.storage.clone(), category);

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(&e))?
        {
            // Parts without a filename are plain form fields
            if !field.file_name().is_some_and(|name| !name.is_empty()) {
                continue;
            }

            let field_name = field.name().unwrap_or_default();
            if field_name != mode.field_name() {
                return Err(AppError::ValidationFailure(format!(
                    "Unexpected file field '{}', expected '{}'",
                    field_name,
                    mode.field_name()
                )));
            }
            if batch.len() >= mode.max_files() {
                return Err(mode.too_many());
            }

            let stored = self.store_field(&validator, field).await?;
            batch.push(stored);
        }

        if batch.is_empty() {
            return Err(mode.missing());
        }
        Ok(batch.commit())
    }

    async fn store_field(
        &self,
        validator: &CategoryValidator,
        field: Field<'_>,
    ) -> Result<StoredFile, AppError> {
        let category = validator.category();
        let original_name = original_name(field.file_name().unwrap_or_default());
        let mime_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        validator
            .validate(&mime_type, &original_name)
            .map_err(validation_error_to_app)?;

        let filename = generate_filename(&original_name);
        let body: ByteStream<'_> = Box::pin(field.map_err(io::Error::other));

        let written = self
            .storage
            .write_stream(category, &filename, validator.max_bytes(), body)
            .await
            .map_err(|err| match err {
                StorageError::TooLarge { .. } => validation_error_to_app(validator.too_large()),
                StorageError::StreamError(ref io_err) => stream_failure(io_err),
                other => storage_error_to_app(other),
            })?;

        tracing::info!(
            category = %category,
            filename = %filename,
            original_name = %original_name,
            mime_type = %mime_type,
            size_bytes = written.size,
            "File stored"
        );

        Ok(StoredFile {
            filename,
            original_name,
            mime_type,
            size: written.size,
            path: written.path,
            category,
        })
    }
}
