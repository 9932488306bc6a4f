//! API constants
//!
//! Multipart field names and fixed public paths. The upload route prefix and
//! the public URL prefix are configurable and live in `Config`.

/// Multipart field carrying the file on single-file endpoints
pub const FILE_FIELD: &str = "file";

/// Multipart field carrying the files on batch endpoints
pub const FILES_FIELD: &str = "files";

/// Content type assumed when a part does not declare one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Route path of the upload endpoints used in OpenAPI annotations.
/// The router mounts them under `Config::route_prefix()`.
pub const DEFAULT_UPLOAD_PREFIX: &str = "/api/upload";

pub const OPENAPI_JSON_PATH: &str = "/api/openapi.json";

pub const DOCS_PATH: &str = "/docs";

/// Default in-flight request cap when `HTTP_CONCURRENCY_LIMIT` is unset
pub const DEFAULT_HTTP_CONCURRENCY_LIMIT: usize = 10_000;
