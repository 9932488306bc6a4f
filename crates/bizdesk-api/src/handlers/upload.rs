//! Upload endpoints
//!
//! One handler per route. Each picks its category and request shape and hands
//! the multipart body to [`UploadService`].

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bizdesk_core::{UploadCategory, UploadResult};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::AuthContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::upload::UploadService;
use crate::state::AppState;
use crate::utils::upload::multipart_rejection;

/// Success envelope of every upload endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub data: UploadResult,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedFile {
    pub category: UploadCategory,
    pub filename: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
    pub data: DeletedFile,
}

type UploadReply = Result<(StatusCode, Json<UploadResponse>), HttpAppError>;

fn created(message: &str, data: UploadResult) -> (StatusCode, Json<UploadResponse>) {
    (
        StatusCode::CREATED,
        Json(UploadResponse {
            success: true,
            message: message.to_string(),
            data,
        }),
    )
}

async fn single(
    state: &AppState,
    category: UploadCategory,
    multipart: Result<Multipart, MultipartRejection>,
    message: &str,
) -> UploadReply {
    let multipart = multipart.map_err(multipart_rejection)?;
    let data = UploadService::new(state)
        .upload_single(category, multipart)
        .await?;
    Ok(created(message, data))
}

async fn many(
    state: &AppState,
    category: UploadCategory,
    multipart: Result<Multipart, MultipartRejection>,
    message: &str,
) -> UploadReply {
    let multipart = multipart.map_err(multipart_rejection)?;
    let data = UploadService::new(state)
        .upload_many(category, multipart)
        .await?;
    Ok(created(message, data))
}

/// Upload one image (`file` field)
#[utoipa::path(
    post,
    path = "/api/upload/image",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image uploaded successfully", body = UploadResponse),
        (status = 400, description = "Missing, rejected or oversized file", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(token = auth.token_index, operation = "upload_image"))]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    multipart: Result<Multipart, MultipartRejection>,
) -> UploadReply {
    single(
        &state,
        UploadCategory::Image,
        multipart,
        "Image uploaded successfully",
    )
    .await
}

/// Upload up to `MAX_FILES_PER_REQUEST` images (`files` field)
#[utoipa::path(
    post,
    path = "/api/upload/images",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Images uploaded successfully", body = UploadResponse),
        (status = 400, description = "Missing, rejected or too many files", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(token = auth.token_index, operation = "upload_images"))]
pub async fn upload_images(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    multipart: Result<Multipart, MultipartRejection>,
) -> UploadReply {
    many(
        &state,
        UploadCategory::Image,
        multipart,
        "Images uploaded successfully",
    )
    .await
}

/// Upload one document (`file` field)
#[utoipa::path(
    post,
    path = "/api/upload/document",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document uploaded successfully", body = UploadResponse),
        (status = 400, description = "Missing, rejected or oversized file", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(token = auth.token_index, operation = "upload_document"))]
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    multipart: Result<Multipart, MultipartRejection>,
) -> UploadReply {
    single(
        &state,
        UploadCategory::Document,
        multipart,
        "Document uploaded successfully",
    )
    .await
}

/// Upload up to `MAX_FILES_PER_REQUEST` documents (`files` field)
#[utoipa::path(
    post,
    path = "/api/upload/documents",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Documents uploaded successfully", body = UploadResponse),
        (status = 400, description = "Missing, rejected or too many files", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(token = auth.token_index, operation = "upload_documents"))]
pub async fn upload_documents(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    multipart: Result<Multipart, MultipartRejection>,
) -> UploadReply {
    many(
        &state,
        UploadCategory::Document,
        multipart,
        "Documents uploaded successfully",
    )
    .await
}

/// Upload one video (`file` field)
#[utoipa::path(
    post,
    path = "/api/upload/video",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Video uploaded successfully", body = UploadResponse),
        (status = 400, description = "Missing, rejected or oversized file", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 408, description = "Upload timed out", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(token = auth.token_index, operation = "upload_video"))]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    multipart: Result<Multipart, MultipartRejection>,
) -> UploadReply {
    single(
        &state,
        UploadCategory::Video,
        multipart,
        "Video uploaded successfully",
    )
    .await
}

/// Upload a profile picture (`file` field)
#[utoipa::path(
    post,
    path = "/api/upload/avatar",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Avatar uploaded successfully", body = UploadResponse),
        (status = 400, description = "Missing, rejected or oversized file", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(token = auth.token_index, operation = "upload_avatar"))]
pub async fn upload_avatar(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    multipart: Result<Multipart, MultipartRejection>,
) -> UploadReply {
    single(
        &state,
        UploadCategory::Avatar,
        multipart,
        "Avatar uploaded successfully",
    )
    .await
}

/// Upload a scanned receipt (`file` field)
#[utoipa::path(
    post,
    path = "/api/upload/receipt",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Receipt uploaded successfully", body = UploadResponse),
        (status = 400, description = "Missing, rejected or oversized file", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(token = auth.token_index, operation = "upload_receipt"))]
pub async fn upload_receipt(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    multipart: Result<Multipart, MultipartRejection>,
) -> UploadReply {
    single(
        &state,
        UploadCategory::Receipt,
        multipart,
        "Receipt uploaded successfully",
    )
    .await
}

/// Upload a file of any type into the temporary area (`file` field)
#[utoipa::path(
    post,
    path = "/api/upload/any",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File uploaded successfully", body = UploadResponse),
        (status = 400, description = "Missing or oversized file", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, multipart), fields(token = auth.token_index, operation = "upload_any"))]
pub async fn upload_any(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    multipart: Result<Multipart, MultipartRejection>,
) -> UploadReply {
    single(
        &state,
        UploadCategory::Generic,
        multipart,
        "File uploaded successfully",
    )
    .await
}

/// Delete a stored file
#[utoipa::path(
    delete,
    path = "/api/upload/{category}/{filename}",
    tag = "uploads",
    params(
        ("category" = String, Path, description = "Category name or directory, e.g. `avatar` or `avatars`"),
        ("filename" = String, Path, description = "Generated filename returned by the upload")
    ),
    responses(
        (status = 200, description = "File deleted successfully", body = DeleteResponse),
        (status = 400, description = "Invalid filename", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Unknown category or file", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state), fields(token = auth.token_index, operation = "delete_file"))]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path((category, filename)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>, HttpAppError> {
    let category = UploadService::new(&state)
        .delete(&category, &filename)
        .await?;

    Ok(Json(DeleteResponse {
        success: true,
        message: "File deleted successfully".to_string(),
        data: DeletedFile { category, filename },
    }))
}
