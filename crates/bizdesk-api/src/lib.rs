//! Bizdesk upload API library
//!
//! This crate provides the HTTP handlers, middleware and application setup of
//! the upload service.

mod api_doc;
pub mod constants;
mod handlers;
mod services;
pub mod setup;
mod telemetry;
mod utils;

pub mod auth;
pub mod error;
pub mod middleware;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
