#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Builds the REAL kernel routes and state over an in-memory data source,
//! plus data sources that fail or respond slowly on demand.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use trailhub_kernel::AppState;
use trailhub_kernel::datasource::{DataSource, MemoryDataSource, Page, PageRequest};
use trailhub_kernel::listing::{ListingRegistry, ListingService, Predicate};
use trailhub_test_utils::{TestRow, seed_document};

/// Test application wrapper using the REAL kernel routes and state.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// App over an in-memory source seeded with `rows`. Every built-in
    /// listing's collection exists, empty when no rows were given for it.
    pub fn new(rows: Vec<TestRow>) -> Self {
        Self::with_source(Arc::new(memory_source(rows)))
    }

    /// App over an arbitrary data source.
    pub fn with_source(source: Arc<dyn DataSource>) -> Self {
        let state = AppState::from_parts(source, Arc::new(ListingRegistry::builtin()));
        let router = trailhub_kernel::routes::router(state.clone());
        Self { router, state }
    }

    /// Send a request to the test application.
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request")
    }

    /// Send a GET request.
    pub async fn get(&self, uri: &str) -> Response {
        self.request(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }
}

/// Memory source seeded with `rows` and an empty collection for every
/// built-in listing that has none.
pub fn memory_source(rows: Vec<TestRow>) -> MemoryDataSource {
    let seed = seed_document(rows).to_string();
    let source = MemoryDataSource::from_json_str(&seed).expect("Invalid seed document");
    for listing in ListingRegistry::builtin().iter() {
        if !source.contains(&listing.collection) {
            source.replace_collection(&listing.collection, Vec::new());
        }
    }
    source
}

/// Listing service over a memory source seeded with `rows`.
pub fn memory_service(rows: Vec<TestRow>) -> Arc<ListingService> {
    ListingService::new(
        Arc::new(memory_source(rows)),
        Arc::new(ListingRegistry::builtin()),
    )
}

/// Read a response body as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}

/// Data source whose backend is always unreachable.
pub struct FailingDataSource;

#[async_trait]
impl DataSource for FailingDataSource {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn fetch_page(&self, _request: PageRequest<'_>) -> Result<Page> {
        anyhow::bail!("connection refused")
    }

    async fn fetch_one(&self, _collection: &str, _field: &str, _value: &str) -> Result<Option<Value>> {
        anyhow::bail!("connection refused")
    }

    async fn healthy(&self) -> bool {
        false
    }
}

/// Memory source that stalls any page request searching for `slow_term`.
pub struct DelayedDataSource {
    pub inner: MemoryDataSource,
    pub slow_term: String,
    pub delay: Duration,
}

#[async_trait]
impl DataSource for DelayedDataSource {
    fn name(&self) -> &'static str {
        "delayed"
    }

    async fn fetch_page(&self, request: PageRequest<'_>) -> Result<Page> {
        let slow = request
            .predicates
            .iter()
            .any(|p| matches!(p, Predicate::Search { term, .. } if *term == self.slow_term));
        if slow {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.fetch_page(request).await
    }

    async fn fetch_one(&self, collection: &str, field: &str, value: &str) -> Result<Option<Value>> {
        self.inner.fetch_one(collection, field, value).await
    }

    async fn healthy(&self) -> bool {
        true
    }
}
