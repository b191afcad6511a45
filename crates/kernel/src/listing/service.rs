//! Listing service for executing queries.
//!
//! Provides high-level query execution with:
//! - Listing lookup from the registry
//! - Filter validation and predicate building
//! - Window computation and a single page-plus-count fetch
//! - Single-row lookup for detail pages

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error};

use super::filters::{FilterError, build_predicates};
use super::paginator::PageWindow;
use super::registry::{ListingDefinition, ListingRegistry};
use super::types::{ListQuery, ListResult};
use crate::datasource::{DataSource, PageRequest};

/// Errors from listing operations.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("unknown listing: {0}")]
    UnknownListing(String),

    #[error("invalid filter: {0}")]
    InvalidFilter(#[from] FilterError),

    #[error("not found")]
    NotFound,

    #[error("data service error: {0:#}")]
    Backend(anyhow::Error),
}

/// Service for executing listing queries.
pub struct ListingService {
    source: Arc<dyn DataSource>,
    registry: Arc<ListingRegistry>,
}

impl ListingService {
    /// Create a new ListingService.
    pub fn new(source: Arc<dyn DataSource>, registry: Arc<ListingRegistry>) -> Arc<Self> {
        Arc::new(Self { source, registry })
    }

    pub fn registry(&self) -> &ListingRegistry {
        &self.registry
    }

    /// The data source queries run against.
    pub fn source(&self) -> &Arc<dyn DataSource> {
        &self.source
    }

    /// Get a listing definition by id.
    pub fn definition(&self, listing_id: &str) -> Result<&ListingDefinition, ListingError> {
        self.registry
            .get(listing_id)
            .ok_or_else(|| ListingError::UnknownListing(listing_id.to_string()))
    }

    /// Execute a listing query: one page of matching rows plus the total.
    pub async fn list(&self, listing_id: &str, query: &ListQuery) -> Result<ListResult, ListingError> {
        let listing = self.definition(listing_id)?;

        let predicates = build_predicates(listing, query)?;
        let sorts = listing.stable_sorts();
        let page = query.normalized_page();
        let window = PageWindow::for_page(page, listing.per_page);

        debug!(
            listing = listing_id,
            page,
            offset = window.offset,
            predicates = predicates.len(),
            "executing listing query"
        );

        let fetched = self
            .source
            .fetch_page(PageRequest {
                collection: &listing.collection,
                predicates: &predicates,
                sorts: &sorts,
                window,
            })
            .await
            .map_err(|e| {
                error!(
                    listing = listing_id,
                    source = self.source.name(),
                    error = %format!("{e:#}"),
                    "listing query failed"
                );
                ListingError::Backend(e)
            })?;

        let per_page = u32::try_from(window.limit).unwrap_or(listing.per_page);
        Ok(ListResult::new(fetched.rows, fetched.total, page, per_page))
    }

    /// Fetch a single row by the listing's key field.
    pub async fn get(&self, listing_id: &str, key: &str) -> Result<serde_json::Value, ListingError> {
        let listing = self.definition(listing_id)?;

        let row = self
            .source
            .fetch_one(&listing.collection, &listing.key_field, key)
            .await
            .map_err(|e| {
                error!(
                    listing = listing_id,
                    key,
                    source = self.source.name(),
                    error = %format!("{e:#}"),
                    "detail query failed"
                );
                ListingError::Backend(e)
            })?;

        row.ok_or(ListingError::NotFound)
    }
}
