//! Data source abstraction.
//!
//! The site owns no entities; every row lives in an external relational
//! data service. This module hides which service behind one trait so the
//! listing service can ask "rows matching these predicates, with a total
//! count, windowed by offset/limit" without caring how it is answered.
//!
//! # Implementations
//!
//! - [`PgDataSource`]: direct PostgreSQL access (SeaQuery + sqlx)
//! - [`RestDataSource`]: PostgREST-style HTTP API (reqwest)
//! - [`MemoryDataSource`]: in-process rows for tests and local demos

mod memory;
mod postgres;
mod rest;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use memory::MemoryDataSource;
pub use postgres::PgDataSource;
pub use rest::RestDataSource;

use crate::listing::{PageWindow, Predicate, QuerySort};

/// One page request against a collection.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<'a> {
    /// Collection (table) name.
    pub collection: &'a str,
    /// Conjunctive predicates.
    pub predicates: &'a [Predicate],
    /// Sort order, including a unique tie-breaker.
    pub sorts: &'a [QuerySort],
    /// Row window.
    pub window: PageWindow,
}

/// Rows for one window plus the total matching count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub rows: Vec<serde_json::Value>,
    pub total: u64,
}

/// An external data service.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Short name for logs and health output.
    fn name(&self) -> &'static str;

    /// Fetch one window of matching rows and the total count in a single
    /// logical operation.
    async fn fetch_page(&self, request: PageRequest<'_>) -> Result<Page>;

    /// Fetch the first row whose `field` equals `value`.
    async fn fetch_one(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<serde_json::Value>>;

    /// Whether the service is reachable.
    async fn healthy(&self) -> bool;
}

/// Extract a string value from a JSON row by field name.
///
/// Returns `None` for null or missing values to prevent false matches.
pub fn extract_field_value(row: &serde_json::Value, field: &str) -> Option<String> {
    row.get(field).and_then(json_value_to_string)
}

/// Convert a JSON value to its string representation for comparison.
/// Returns `None` for null values to prevent false matches.
fn json_value_to_string(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}
