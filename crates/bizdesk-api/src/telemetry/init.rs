use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

const DEFAULT_FILTER: &str = "bizdesk=debug,tower_http=debug";

/// Initialize tracing: `RUST_LOG` style filter from the environment, JSON
/// lines in production and compact console output elsewhere.
///
/// Returns an error if a global subscriber is already installed.
pub fn init_telemetry(environment: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let console_fmt = tracing_subscriber::fmt::layer().event_format(
        Format::default()
            .compact()
            .with_target(false)
            .without_time(),
    );

    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()));

    if environment == "production" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init()?;
    } else {
        registry.with(console_fmt).try_init()?;
    }

    tracing::info!(environment = %environment, "Tracing initialized");
    Ok(())
}
