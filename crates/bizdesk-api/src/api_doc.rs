//! OpenAPI documentation.
//! Handler annotations use the default `/api/upload` mount; when
//! `UPLOAD_ROUTE_PREFIX` differs the served spec is rewritten to match.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::constants::DEFAULT_UPLOAD_PREFIX;
use crate::error;
use crate::handlers;
use bizdesk_core::models;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

/// Rewrites path keys from the annotation prefix to the mounted one.
fn transform_openapi_paths(spec: &mut utoipa::openapi::OpenApi, route_prefix: &str) {
    if route_prefix == DEFAULT_UPLOAD_PREFIX {
        return;
    }
    let path_map = std::mem::take(&mut spec.paths.paths);
    for (key, item) in path_map {
        let new_key = key.replacen(DEFAULT_UPLOAD_PREFIX, route_prefix, 1);
        spec.paths.paths.insert(new_key, item);
    }
}

/// Returns the OpenAPI spec with upload paths under `route_prefix`.
pub fn get_openapi_spec(route_prefix: &str) -> utoipa::openapi::OpenApi {
    let mut spec = ApiDoc::openapi();
    transform_openapi_paths(&mut spec, route_prefix);
    spec
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bizdesk Upload API",
        version = "0.1.0",
        description = "File upload service for the Bizdesk CRM. Images, documents, videos, avatars, receipts and arbitrary files are validated per category, stored on local disk and served back under /uploads."
    ),
    paths(
        handlers::upload::upload_image,
        handlers::upload::upload_images,
        handlers::upload::upload_document,
        handlers::upload::upload_documents,
        handlers::upload::upload_video,
        handlers::upload::upload_avatar,
        handlers::upload::upload_receipt,
        handlers::upload::upload_any,
        handlers::upload::delete_file,
    ),
    components(
        schemas(
            models::UploadCategory,
            models::UploadedFileResponse,
            models::BatchUploadData,
            models::UploadResult,
            handlers::upload::UploadResponse,
            handlers::upload::DeleteResponse,
            handlers::upload::DeletedFile,
            error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "uploads", description = "Category-specific file uploads and deletion")
    )
)]
pub struct ApiDoc;
