use crate::auth::models::AuthContext;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use bizdesk_core::AppError;
use std::sync::Arc;
use subtle::ConstantTimeEq;

const BEARER_PREFIX: &str = "Bearer ";

/// Tokens accepted on the upload routes
#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<Vec<String>>,
}

impl AuthState {
    pub fn new(tokens: &[String]) -> Self {
        Self {
            tokens: Arc::new(tokens.to_vec()),
        }
    }

    /// Index of the matching token. Every configured token is compared so the
    /// time taken does not depend on which one matched.
    fn match_token(&self, candidate: &str) -> Option<usize> {
        let mut matched = None;
        for (index, token) in self.tokens.iter().enumerate() {
            if secure_compare(candidate, token) && matched.is_none() {
                matched = Some(index);
            }
        }
        matched
    }
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn reject(reason: &str) -> Response {
    tracing::debug!(reason = reason, "Authentication failed");
    HttpAppError(AppError::Unauthorized(reason.to_string())).into_response()
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => return reject("Missing authorization header"),
    };

    let token = match auth_header.strip_prefix(BEARER_PREFIX) {
        Some(token) => token.trim(),
        None => return reject("Invalid authorization header format"),
    };

    match auth_state.match_token(token) {
        Some(token_index) => {
            request
                .extensions_mut()
                .insert(AuthContext { token_index });
            next.run(request).await
        }
        None => reject("Invalid token"),
    }
}
