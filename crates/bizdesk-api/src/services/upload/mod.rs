//! Upload service
//!
//! Category-aware multipart ingestion shared by every upload handler.

mod service;
mod types;

pub use service::UploadService;
