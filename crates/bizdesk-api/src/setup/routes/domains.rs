//! Domain route groups: authenticated upload endpoints and public file serving.

use crate::handlers;
use crate::state::AppState;
use axum::routing::{delete, post};
use axum::Router;
use bizdesk_core::{Config, UploadCategory};
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;

/// Upload endpoints, relative to the configured route prefix
pub fn upload_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/image", post(handlers::upload::upload_image))
        .route("/images", post(handlers::upload::upload_images))
        .route("/document", post(handlers::upload::upload_document))
        .route("/documents", post(handlers::upload::upload_documents))
        .route("/video", post(handlers::upload::upload_video))
        .route("/avatar", post(handlers::upload::upload_avatar))
        .route("/receipt", post(handlers::upload::upload_receipt))
        .route("/any", post(handlers::upload::upload_any))
        .route(
            "/{category}/{filename}",
            delete(handlers::upload::delete_file),
        )
        .with_state(state)
}

/// Serves stored files at their public URLs. Only category directories are
/// mounted, so in-progress staging files are never reachable.
pub fn static_file_routes(config: &Config, root: &Path) -> Router<Arc<AppState>> {
    let prefix = config.public_url_prefix();

    UploadCategory::ALL
        .iter()
        .fold(Router::new(), |router, category| {
            let directory = category.directory();
            router.nest_service(
                &format!("{}/{}", prefix, directory),
                ServeDir::new(root.join(directory)),
            )
        })
}
