//! In-memory data source.
//!
//! Holds collections of JSON rows and evaluates predicates in process with
//! the same semantics the SQL backends use: AND across predicates,
//! case-insensitive substring search, NULL never matches a comparison, and
//! NULLs sort last ascending (first descending).

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use super::{DataSource, Page, PageRequest, extract_field_value};
use crate::listing::{FilterValue, Predicate, QuerySort, SortDirection};

/// Data source backed by in-process collections.
#[derive(Default)]
pub struct MemoryDataSource {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collection, replacing any existing rows.
    pub fn with_collection(self, name: &str, rows: Vec<Value>) -> Self {
        self.replace_collection(name, rows);
        self
    }

    /// Replace the rows of a collection.
    pub fn replace_collection(&self, name: &str, rows: Vec<Value>) {
        self.collections.write().insert(name.to_string(), rows);
    }

    /// Load collections from a JSON document of the form
    /// `{"vehicles": [{...}, ...], "trails": [...]}`.
    pub fn from_json_str(source: &str) -> Result<Self> {
        let collections: HashMap<String, Vec<Value>> =
            serde_json::from_str(source).context("seed data must map collection names to arrays")?;
        Ok(Self {
            collections: RwLock::new(collections),
        })
    }

    /// Load collections from a JSON seed file.
    pub fn from_seed_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file {}", path.display()))?;
        Self::from_json_str(&source)
            .with_context(|| format!("failed to load seed file {}", path.display()))
    }

    pub fn contains(&self, collection: &str) -> bool {
        self.collections.read().contains_key(collection)
    }

    /// Number of rows in a collection.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl DataSource for MemoryDataSource {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_page(&self, request: PageRequest<'_>) -> Result<Page> {
        let collections = self.collections.read();
        let rows = collections
            .get(request.collection)
            .with_context(|| format!("unknown collection '{}'", request.collection))?;

        let mut matching: Vec<&Value> = rows
            .iter()
            .filter(|row| request.predicates.iter().all(|p| matches(row, p)))
            .collect();
        let total = matching.len() as u64;

        matching.sort_by(|a, b| compare_rows(a, b, request.sorts));

        let offset = usize::try_from(request.window.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(request.window.limit).unwrap_or(usize::MAX);
        let rows: Vec<Value> = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        debug!(
            collection = request.collection,
            total,
            returned = rows.len(),
            "memory page fetched"
        );

        Ok(Page { rows, total })
    }

    async fn fetch_one(&self, collection: &str, field: &str, value: &str) -> Result<Option<Value>> {
        let collections = self.collections.read();
        let rows = collections
            .get(collection)
            .with_context(|| format!("unknown collection '{collection}'"))?;

        Ok(rows
            .iter()
            .find(|row| extract_field_value(row, field).as_deref() == Some(value))
            .cloned())
    }

    async fn healthy(&self) -> bool {
        true
    }
}

/// Evaluate one predicate against a row.
fn matches(row: &Value, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Equals { field, value } => field_equals(row, field, value),
        Predicate::GreaterOrEqual { field, value } => {
            compare_number(row, field, value).is_some_and(|o| o != Ordering::Less)
        }
        Predicate::LessOrEqual { field, value } => {
            compare_number(row, field, value).is_some_and(|o| o != Ordering::Greater)
        }
        Predicate::In { field, values } => values.iter().any(|v| field_equals(row, field, v)),
        Predicate::Search { fields, term } => {
            let needle = term.to_lowercase();
            fields.iter().any(|field| {
                extract_field_value(row, field)
                    .is_some_and(|text| text.to_lowercase().contains(&needle))
            })
        }
    }
}

fn field_equals(row: &Value, field: &str, value: &FilterValue) -> bool {
    let Some(actual) = row.get(field) else {
        return false;
    };
    if let (Some(a), Some(b)) = (actual.as_f64(), value.as_f64()) {
        return a == b;
    }
    extract_field_value(row, field).is_some_and(|a| a == value.as_string())
}

fn compare_number(row: &Value, field: &str, value: &FilterValue) -> Option<Ordering> {
    let actual = numeric(row.get(field)?)?;
    actual.partial_cmp(&value.as_f64()?)
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn compare_rows(a: &Value, b: &Value, sorts: &[QuerySort]) -> Ordering {
    for sort in sorts {
        let ordering = compare_values(a.get(&sort.field), b.get(&sort.field));
        let ordering = match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Total order over optional JSON scalars, NULL greatest.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => json_text(x).cmp(&json_text(y)),
    }
}

fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
