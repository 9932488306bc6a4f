//! Shared constants and defaults.

/// One mebibyte; size ceilings are configured in MB and stored in bytes.
pub const MIB: u64 = 1024 * 1024;

pub const DEFAULT_IMAGE_MAX_MB: u64 = 10;
pub const DEFAULT_RECEIPT_MAX_MB: u64 = 10;
pub const DEFAULT_AVATAR_MAX_MB: u64 = 5;
pub const DEFAULT_DOCUMENT_MAX_MB: u64 = 50;
pub const DEFAULT_VIDEO_MAX_MB: u64 = 500;
pub const DEFAULT_GENERIC_MAX_MB: u64 = 100;

/// Cap on the number of files accepted by a multi-file endpoint.
pub const DEFAULT_MAX_FILES_PER_REQUEST: usize = 10;

pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 300;

pub const DEFAULT_UPLOAD_ROOT: &str = "uploads";
pub const DEFAULT_PUBLIC_URL_PREFIX: &str = "/uploads";
pub const DEFAULT_ROUTE_PREFIX: &str = "/api/upload";

/// Slack added on top of the largest payload for multipart boundaries and headers.
pub const MULTIPART_OVERHEAD_BYTES: u64 = MIB;
