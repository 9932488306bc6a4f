//! Common utilities for file upload handlers

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;
use bizdesk_core::AppError;
use std::io;

const MAX_ORIGINAL_NAME_LENGTH: usize = 255;
/// Longest extension kept intact when an overlong name is shortened.
const MAX_KEPT_EXTENSION_LENGTH: usize = 16;

/// Client-supplied filename reduced to its last path component.
///
/// Browsers on Windows may send `C:\fakepath\photo.png`; both separators are
/// stripped. Overlong names are shortened before the extension, so
/// `{300 chars}.png` still ends in `.png`. The result is only echoed back and
/// used to pick the extension, never used as a path.
pub fn original_name(filename: &str) -> String {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if name.chars().count() <= MAX_ORIGINAL_NAME_LENGTH {
        return name.to_string();
    }

    match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty() && ext.chars().count() <= MAX_KEPT_EXTENSION_LENGTH =>
        {
            let stem_length = MAX_ORIGINAL_NAME_LENGTH - ext.chars().count() - 1;
            let stem: String = stem.chars().take(stem_length).collect();
            format!("{}.{}", stem, ext)
        }
        _ => name.chars().take(MAX_ORIGINAL_NAME_LENGTH).collect(),
    }
}

/// Multipart parse failure. A body over the configured limit becomes a size
/// rejection, anything else is a malformed request.
pub fn multipart_error(err: &MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooLarge(format!("Request body too large: {}", err.body_text()))
    } else {
        AppError::InvalidInput(format!("Failed to read multipart body: {}", err.body_text()))
    }
}

/// Failure while streaming a part's bytes to storage.
pub fn stream_failure(err: &io::Error) -> AppError {
    match err
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<MultipartError>())
    {
        Some(multipart) => multipart_error(multipart),
        None => AppError::InvalidInput(format!("Failed to read upload: {}", err)),
    }
}

/// Request is not a multipart form at all
pub fn multipart_rejection(rejection: MultipartRejection) -> AppError {
    AppError::InvalidInput(rejection.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_original_name_strips_directories() {
        assert_eq!(original_name("photo.png"), "photo.png");
        assert_eq!(original_name("../../etc/passwd"), "passwd");
        assert_eq!(original_name("C:\\fakepath\\scan.PDF"), "scan.PDF");
        assert_eq!(original_name("dir/"), "");
    }

    #[test]
    fn test_original_name_truncated_keeps_extension() {
        let long = format!("{}.png", "a".repeat(400));
        let name = original_name(&long);
        assert_eq!(name.chars().count(), MAX_ORIGINAL_NAME_LENGTH);
        assert!(name.ends_with(".png"));
        assert!(name.starts_with("aaa"));

        let path = format!("C:\\scans\\{}.PDF", "é".repeat(300));
        let name = original_name(&path);
        assert_eq!(name.chars().count(), MAX_ORIGINAL_NAME_LENGTH);
        assert!(name.ends_with(".PDF"));
    }

    #[test]
    fn test_original_name_truncated_without_extension() {
        let long = "b".repeat(300);
        assert_eq!(original_name(&long), "b".repeat(MAX_ORIGINAL_NAME_LENGTH));

        let odd = format!("{}.{}", "c".repeat(250), "x".repeat(40));
        assert_eq!(original_name(&odd).chars().count(), MAX_ORIGINAL_NAME_LENGTH);
    }

    #[test]
    fn test_stream_failure_without_multipart_source() {
        let err = io::Error::new(io::ErrorKind::UnexpectedEof, "connection reset");
        match stream_failure(&err) {
            AppError::InvalidInput(msg) => assert!(msg.contains("connection reset")),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }
}
