//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use bizdesk_core::{Config, UploadCategory};

/// Validate critical configuration values
///
/// Hard errors come from [`Config::validate`]; this adds the checks that only
/// warrant a warning.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    let is_production = config.is_production();
    let env_var = std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .ok();

    if is_production && env_var.is_none() {
        tracing::warn!(
            "Production mode detected but ENVIRONMENT/APP_ENV not set - error details may leak"
        );
    }

    if !is_production && config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS allows all origins - set CORS_ORIGINS before deploying");
    }

    let largest = UploadCategory::ALL
        .iter()
        .map(|category| config.limits().max_bytes_for(*category))
        .max()
        .unwrap_or_default();
    if config.request_body_limit_bytes() < largest {
        tracing::warn!(
            request_body_limit_bytes = config.request_body_limit_bytes(),
            largest_ceiling_bytes = largest,
            "Request body limit is below the largest category ceiling - such uploads will be refused early"
        );
    }

    if config.upload_root().is_relative() {
        tracing::warn!(
            upload_root = %config.upload_root().display(),
            "UPLOAD_ROOT is relative - it resolves against the working directory"
        );
    }

    tracing::info!("Configuration validation passed");
    Ok(())
}
