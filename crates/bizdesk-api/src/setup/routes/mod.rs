//! Route configuration and setup.
//!
//! Upload route group and static file serving live in [domains](domains); health checks in [health](health).

mod domains;
mod health;

use crate::auth::{auth_middleware, AuthState};
use crate::constants::{DEFAULT_HTTP_CONCURRENCY_LIMIT, DOCS_PATH, OPENAPI_JSON_PATH};
use crate::middleware::{
    request_id_middleware, security_headers_middleware, SecurityHeadersConfig,
};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::get,
    Json, Router,
};
use bizdesk_core::Config;
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa_rapidoc::RapiDoc;

/// Setup all application routes
pub async fn setup_routes(
    config: &Config,
    state: Arc<AppState>,
) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let auth_state = Arc::new(AuthState::new(config.auth_tokens()));

    let upload_routes = domains::upload_routes(state.clone())
        .layer(axum::middleware::from_fn_with_state(auth_state, auth_middleware));

    let security_headers_config = Arc::new(SecurityHeadersConfig::new(config.is_production()));

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_HTTP_CONCURRENCY_LIMIT)
        .max(1);
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        "HTTP concurrency limit layer enabled"
    );

    // Enforced by the multipart extractor, so an oversized body surfaces as a
    // stream error and gets the standard error envelope.
    let body_limit = usize::try_from(config.request_body_limit_bytes()).unwrap_or(usize::MAX);
    tracing::info!(request_body_limit_bytes = body_limit, "Request body limit set");

    let app = public_routes(config, state.clone())
        .nest(config.route_prefix(), upload_routes)
        .merge(domains::static_file_routes(config, state.storage.root()))
        .merge(RapiDoc::new(OPENAPI_JSON_PATH).path(DOCS_PATH))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn_with_state(
            security_headers_config,
            security_headers_middleware,
        ))
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}

fn public_routes(config: &Config, state: Arc<AppState>) -> Router<Arc<AppState>> {
    let route_prefix = config.route_prefix().to_string();

    Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
        .route(
            OPENAPI_JSON_PATH,
            get(move || {
                let route_prefix = route_prefix.clone();
                async move { Json(crate::api_doc::get_openapi_spec(&route_prefix)) }
            }),
        )
        .with_state(state)
}
