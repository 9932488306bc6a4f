//! Data models for the upload pipeline
//!
//! `category` holds the fixed upload categories and their validation rules;
//! `upload` holds the stored-file record and the response shapes built from it.

mod category;
mod upload;

pub use category::*;
pub use upload::*;
