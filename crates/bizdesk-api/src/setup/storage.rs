//! Storage setup and initialization

use anyhow::{Context, Result};
use bizdesk_core::{CategoryTable, Config};
use bizdesk_storage::{LocalStorage, Storage};
use std::sync::Arc;

/// Build the category table, open the upload root and create every category
/// directory. Any failure here aborts startup before the listener binds.
pub async fn setup_storage(config: &Config) -> Result<(CategoryTable, Arc<dyn Storage>)> {
    let categories =
        CategoryTable::new(config.limits()).context("Invalid upload category configuration")?;

    tracing::info!(root = %config.upload_root().display(), "Initializing local storage...");
    let storage = LocalStorage::new(config.upload_root(), config.public_url_prefix())
        .await
        .with_context(|| {
            format!(
                "Failed to open upload root {}",
                config.upload_root().display()
            )
        })?;

    storage
        .provision(&categories)
        .await
        .context("Failed to provision upload directories")?;

    tracing::info!(
        root = %storage.root().display(),
        "Local storage initialized successfully"
    );

    Ok((categories, Arc::new(storage)))
}
