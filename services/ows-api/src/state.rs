//! Application state for the OWS API.

use anyhow::{Context, Result};
use std::sync::Arc;

use opensearch_protocol::FormatRegistry;
use ows_protocol::Dispatcher;

use crate::catalog::Catalog;
use crate::config::OwsConfig;
use crate::operations;

/// Shared application state.
pub struct AppState {
    /// Request dispatcher over the frozen capability registry.
    pub dispatcher: Arc<Dispatcher>,

    /// Coverage catalog.
    pub catalog: Arc<Catalog>,

    /// Public base URL (scheme and authority) used for links, when the
    /// service sits behind a proxy. Taken from the Host header otherwise.
    pub base_url: Option<String>,
}

impl AppState {
    /// Build state from configuration. Any registration error is fatal.
    pub fn new(config: &OwsConfig, base_url: Option<String>) -> Result<Self> {
        let catalog = Arc::new(
            Catalog::from_config(&config.collections).context("Failed to build coverage catalog")?,
        );

        let registry = operations::build_registry(
            config,
            Arc::clone(&catalog),
            FormatRegistry::with_defaults(),
        )
        .context("Failed to register OWS operations")?;
        let exceptions = operations::build_exception_mapper(&config.exceptions);

        Ok(Self {
            dispatcher: Arc::new(Dispatcher::new(Arc::new(registry), exceptions)),
            catalog,
            base_url: base_url.map(|url| url.trim_end_matches('/').to_string()),
        })
    }
}
