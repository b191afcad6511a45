//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::{Config, DataBackend};
use crate::datasource::{DataSource, MemoryDataSource, PgDataSource, RestDataSource};
use crate::db;
use crate::listing::{ListingRegistry, ListingService};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Listing service (owns the registry and the data source).
    listings: Arc<ListingService>,
}

impl AppState {
    /// Create application state from configuration.
    ///
    /// Connects to the configured data backend and loads listing
    /// definitions, applying overrides from `LISTINGS_FILE` when set.
    pub async fn new(config: &Config) -> Result<Self> {
        let registry = load_registry(config)?;
        let source = connect_source(config, &registry).await?;

        info!(
            backend = source.name(),
            listings = registry.len(),
            "application state initialized"
        );

        Ok(Self::from_parts(source, Arc::new(registry)))
    }

    /// Assemble state from an existing data source and registry.
    pub fn from_parts(source: Arc<dyn DataSource>, registry: Arc<ListingRegistry>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                listings: ListingService::new(source, registry),
            }),
        }
    }

    /// Get the listing service.
    pub fn listings(&self) -> &Arc<ListingService> {
        &self.inner.listings
    }

    /// Get the listing registry.
    pub fn registry(&self) -> &ListingRegistry {
        self.inner.listings.registry()
    }

    /// Check if the data source is reachable.
    pub async fn data_source_healthy(&self) -> bool {
        self.inner.listings.source().healthy().await
    }
}

/// Built-in listings plus any overrides from the configured TOML file.
pub fn load_registry(config: &Config) -> Result<ListingRegistry> {
    match config.listings_file {
        Some(ref path) => ListingRegistry::builtin_with_overrides(path)
            .with_context(|| format!("failed to load listings from {}", path.display())),
        None => Ok(ListingRegistry::builtin()),
    }
}

/// Connect the configured data backend.
pub async fn connect_source(
    config: &Config,
    registry: &ListingRegistry,
) -> Result<Arc<dyn DataSource>> {
    let source: Arc<dyn DataSource> = match config.backend {
        DataBackend::Postgres => {
            let pool = db::create_pool(config)
                .await
                .context("failed to create database pool")?;
            Arc::new(PgDataSource::new(pool))
        }
        DataBackend::Rest => {
            let url = config
                .data_api_url
                .as_deref()
                .context("DATA_API_URL is not set")?;
            Arc::new(RestDataSource::new(url, config.data_api_key.clone())?)
        }
        DataBackend::Memory => {
            let source = match config.seed_file {
                Some(ref path) => MemoryDataSource::from_seed_file(path)?,
                None => MemoryDataSource::new(),
            };
            // Every listing resolves, even without seed rows for it.
            for listing in registry.iter() {
                if !source.contains(&listing.collection) {
                    source.replace_collection(&listing.collection, Vec::new());
                }
            }
            Arc::new(source)
        }
    };

    Ok(source)
}
