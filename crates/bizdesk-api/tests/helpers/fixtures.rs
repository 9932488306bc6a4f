//! Test fixtures: small file bodies and ready-made multipart parts.

use axum_test::multipart::Part;
use bytes::Bytes;

/// Minimal valid 1x1 PNG bytes.
pub fn png_bytes() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
        0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08, 0xD7, 0x63, 0xF8,
        0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x18, 0xDD, 0x8D, 0x89, 0x00, 0x00, 0x00,
        0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}

/// Just enough of a PDF for the name and MIME type to be believable.
pub fn pdf_bytes() -> Vec<u8> {
    b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n<< /Root 1 0 R >>\n%%EOF\n".to_vec()
}

/// Minimal MP4 (ftyp + mdat).
pub fn mp4_bytes() -> Vec<u8> {
    let mut mp4 = Vec::new();
    mp4.extend_from_slice(&[0x00, 0x00, 0x00, 0x20]);
    mp4.extend_from_slice(b"ftyp");
    mp4.extend_from_slice(b"isom");
    mp4.extend_from_slice(&[0x00, 0x00, 0x02, 0x00]);
    mp4.extend_from_slice(b"isomiso2mp41");
    mp4.extend_from_slice(&[0x00, 0x00, 0x00, 0x08]);
    mp4.extend_from_slice(b"mdat");
    mp4
}

pub fn file_part(data: Vec<u8>, filename: &str, mime_type: &str) -> Part {
    Part::bytes(Bytes::from(data))
        .file_name(filename.to_string())
        .mime_type(mime_type.to_string())
}

pub fn png_part(filename: &str) -> Part {
    file_part(png_bytes(), filename, "image/png")
}

pub fn pdf_part(filename: &str) -> Part {
    file_part(pdf_bytes(), filename, "application/pdf")
}

pub fn text_file_part(filename: &str, contents: &str) -> Part {
    file_part(contents.as_bytes().to_vec(), filename, "text/plain")
}
