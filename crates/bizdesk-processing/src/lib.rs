//! Bizdesk Processing Library
//!
//! Content validation for uploads: per-category extension, MIME type and size
//! checks that run before any byte reaches storage.

pub mod validator;

pub use validator::{CategoryValidator, ValidationError};
