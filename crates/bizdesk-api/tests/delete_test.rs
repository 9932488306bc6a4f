//! Delete endpoint and storage failure integration tests.
//!
//! Run with: `cargo test -p bizdesk-api --test delete_test`

mod helpers;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use axum_test::multipart::MultipartForm;
use bizdesk_core::{CategoryTable, UploadCategory};
use bizdesk_storage::{ByteStream, Storage, StorageError, StorageResult, WrittenFile};
use helpers::fixtures::png_part;
use helpers::{bearer, setup_test_app, setup_test_app_with_storage};
use serde_json::Value;

async fn upload_avatar(app: &helpers::TestApp) -> String {
    let response = app
        .client()
        .post("/api/upload/avatar")
        .add_header("Authorization", bearer())
        .multipart(MultipartForm::new().add_part("file", png_part("me.png")))
        .await;
    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    body["data"]["filename"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_delete_stored_file() {
    let app = setup_test_app().await;
    let filename = upload_avatar(&app).await;
    assert_eq!(app.stored_count("avatars"), 1);

    let response = app
        .client()
        .delete(&format!("/api/upload/avatar/{}", filename))
        .add_header("Authorization", bearer())
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "File deleted successfully");
    assert_eq!(body["data"]["category"], "avatar");
    assert_eq!(body["data"]["filename"], filename.as_str());
    assert_eq!(app.stored_count("avatars"), 0);

    let served = app
        .client()
        .get(&format!("/uploads/avatars/{}", filename))
        .await;
    assert_eq!(served.status_code(), 404);
}

#[tokio::test]
async fn test_delete_accepts_directory_name() {
    let app = setup_test_app().await;
    let filename = upload_avatar(&app).await;

    let response = app
        .client()
        .delete(&format!("/api/upload/avatars/{}", filename))
        .add_header("Authorization", bearer())
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(app.stored_count("avatars"), 0);
}

#[tokio::test]
async fn test_delete_missing_file() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .delete("/api/upload/image/1700000000000-0123456789abcdef.png")
        .add_header("Authorization", bearer())
        .await;

    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_delete_unknown_category() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .delete("/api/upload/invoices/1-abc.pdf")
        .add_header("Authorization", bearer())
        .await;

    assert_eq!(response.status_code(), 404);
    let body: Value = response.json();
    assert_eq!(body["message"], "Unknown upload category: invoices");
}

#[tokio::test]
async fn test_delete_rejects_hidden_name() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .delete("/api/upload/image/.staging")
        .add_header("Authorization", bearer())
        .await;

    assert_eq!(response.status_code(), 400);
    assert!(app.root.join(".staging").is_dir());
}

/// Storage whose writes always fail.
struct FailingStorage {
    root: PathBuf,
}

#[async_trait]
impl Storage for FailingStorage {
    async fn provision(&self, _categories: &CategoryTable) -> StorageResult<()> {
        Ok(())
    }

    async fn write_stream<'a>(
        &self,
        _category: UploadCategory,
        _filename: &str,
        _max_bytes: u64,
        _stream: ByteStream<'a>,
    ) -> StorageResult<WrittenFile> {
        Err(StorageError::WriteFailed(format!(
            "disk full at {}",
            self.root.display()
        )))
    }

    async fn delete(&self, _category: UploadCategory, _filename: &str) -> StorageResult<bool> {
        Ok(false)
    }

    fn discard(&self, _category: UploadCategory, _filename: &str) {}

    async fn exists(&self, _category: UploadCategory, _filename: &str) -> StorageResult<bool> {
        Err(StorageError::IoError(std::io::Error::other("unreachable")))
    }

    fn public_url(&self, category: UploadCategory, filename: &str) -> String {
        format!("/uploads/{}/{}", category.directory(), filename)
    }

    fn root(&self) -> &Path {
        &self.root
    }
}

#[tokio::test]
async fn test_storage_failure_hides_details() {
    let storage = Arc::new(FailingStorage {
        root: PathBuf::from("/srv/bizdesk-uploads"),
    });
    let server = setup_test_app_with_storage(storage).await;

    let response = server
        .post("/api/upload/any")
        .add_header("Authorization", bearer())
        .multipart(MultipartForm::new().add_part("file", png_part("a.png")))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "STORAGE_ERROR");
    assert_eq!(body["message"], "Failed to store file");
    assert!(body.get("details").is_none());
    assert!(!response.text().contains("/srv/bizdesk-uploads"));
}

#[tokio::test]
async fn test_health_reports_degraded_storage() {
    let storage = Arc::new(FailingStorage {
        root: PathBuf::from("/srv/bizdesk-uploads"),
    });
    let server = setup_test_app_with_storage(storage).await;

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), 503);
    let body: Value = response.json();
    assert_eq!(body["status"], "degraded");
}
