//! Server startup and graceful shutdown

use anyhow::{Context, Result};
use axum::Router;
use bizdesk_core::constants::MIB;
use bizdesk_core::{Config, UploadCategory};

/// Start the server with graceful shutdown
pub async fn start_server(config: &Config, app: Router) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server_port());
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let limits = config.limits();
    tracing::info!(
        upload_root = %config.upload_root().display(),
        route_prefix = %config.route_prefix(),
        public_url_prefix = %config.public_url_prefix(),
        image_max_mb = limits.max_bytes_for(UploadCategory::Image) / MIB,
        document_max_mb = limits.max_bytes_for(UploadCategory::Document) / MIB,
        video_max_mb = limits.max_bytes_for(UploadCategory::Video) / MIB,
        receipt_max_mb = limits.max_bytes_for(UploadCategory::Receipt) / MIB,
        avatar_max_mb = limits.max_bytes_for(UploadCategory::Avatar) / MIB,
        generic_max_mb = limits.max_bytes_for(UploadCategory::Generic) / MIB,
        max_files_per_request = config.max_files_per_request(),
        upload_timeout_secs = config.upload_timeout_secs(),
        "Server ready and accepting connections"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolves on Ctrl+C (SIGINT) or SIGTERM.
///
/// If a handler cannot be installed the failure is logged and that signal is
/// simply never observed.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}
