//! Test helpers: build AppState and router for integration tests.
//!
//! Every test app gets its own temporary upload root, so tests can run in
//! parallel and inspect the directories they wrote to.

pub mod fixtures;

use axum_test::TestServer;
use bizdesk_api::setup::{routes, storage};
use bizdesk_api::state::AppState;
use bizdesk_core::{BaseConfig, CategoryTable, Config, UploadLimits, UploadServiceConfig};
use bizdesk_storage::Storage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Bearer token accepted by test apps.
pub const TEST_TOKEN: &str = "test-token-3f9c2a7be14d4c0a9e61b2d8f07c5a13";

/// Test application: server plus the upload root it writes into.
pub struct TestApp {
    pub server: TestServer,
    pub root: PathBuf,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Number of files in a category directory.
    pub fn stored_count(&self, directory: &str) -> usize {
        count_entries(&self.root.join(directory))
    }

    pub fn staging_count(&self) -> usize {
        count_entries(&self.root.join(".staging"))
    }
}

pub fn count_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| entries.count())
        .unwrap_or(0)
}

pub fn bearer() -> String {
    format!("Bearer {}", TEST_TOKEN)
}

pub fn test_config(root: &Path, limits: UploadLimits) -> Config {
    let request_body_limit_bytes = limits.default_body_limit(10);
    Config(Box::new(UploadServiceConfig {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
        },
        upload_root: root.to_path_buf(),
        public_url_prefix: "/uploads".to_string(),
        route_prefix: "/api/upload".to_string(),
        limits,
        max_files_per_request: 10,
        upload_timeout_secs: 30,
        request_body_limit_bytes,
        auth_tokens: vec![TEST_TOKEN.to_string()],
    }))
}

/// Setup test app with default ceilings and local storage in a temp dir.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_limits(UploadLimits::default()).await
}

pub async fn setup_test_app_with_limits(limits: UploadLimits) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = test_config(temp_dir.path(), limits);

    let (categories, storage) = storage::setup_storage(&config)
        .await
        .expect("Failed to set up storage");
    let root = storage.root().to_path_buf();

    let server = build_server(config, categories, storage).await;

    TestApp {
        server,
        root,
        _temp_dir: temp_dir,
    }
}

/// Test app backed by a custom storage implementation.
pub async fn setup_test_app_with_storage(storage: Arc<dyn Storage>) -> TestServer {
    let config = test_config(storage.root(), UploadLimits::default());
    let categories = CategoryTable::new(config.limits()).expect("Invalid limits");
    build_server(config, categories, storage).await
}

async fn build_server(
    config: Config,
    categories: CategoryTable,
    storage: Arc<dyn Storage>,
) -> TestServer {
    let state = Arc::new(AppState::new(config.clone(), categories, storage));
    let app = routes::setup_routes(&config, state)
        .await
        .expect("Failed to build router");

    TestServer::new(app.into_make_service()).expect("Failed to create test server")
}
