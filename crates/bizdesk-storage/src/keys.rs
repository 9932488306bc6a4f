//! Filename generation and URL resolution.
//!
//! Filename format: `{unix_millis}-{16 hex chars}{.ext}`. The random part is 64
//! bits from the thread-local CSPRNG, so concurrent callers never coordinate.

use bizdesk_core::models::file_extension;
use bizdesk_core::UploadCategory;

/// Generate a collision-resistant storage filename that keeps the original's
/// (lowercased) extension. Extensions with anything but ASCII letters and
/// digits are dropped, so the name is always safe in a URL path.
pub fn generate_filename(original_name: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: [u8; 8] = rand::random();
    let ext = file_extension(original_name)
        .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    format!("{}-{}{}", millis, hex::encode(suffix), ext)
}

/// Public URL of a stored file: `{prefix}/{category_dir}/{filename}`.
pub fn public_url(prefix: &str, category: UploadCategory, filename: &str) -> String {
    format!(
        "{}/{}/{}",
        prefix.trim_end_matches('/'),
        category.directory(),
        filename
    )
}
