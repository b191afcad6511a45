//! Listing query types.
//!
//! Provides type definitions shared by the filter parser, the SQL builder,
//! and every data source:
//! - Predicate: a single validated filter condition
//! - FilterValue: scalar values compared against row fields
//! - QuerySort: ordering specification
//! - ListQuery / ListResult: request state and paged response

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Filter value types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FilterValue {
    /// Boolean value.
    Boolean(bool),
    /// Integer value.
    Integer(i64),
    /// Float value.
    Float(f64),
    /// String value.
    String(String),
}

impl FilterValue {
    /// Convert to string representation for comparison and wire encoding.
    pub fn as_string(&self) -> String {
        match self {
            FilterValue::String(s) => s.clone(),
            FilterValue::Integer(i) => i.to_string(),
            FilterValue::Float(f) => f.to_string(),
            FilterValue::Boolean(b) => b.to_string(),
        }
    }

    /// Convert to a number if possible.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FilterValue::Integer(i) => Some(*i as f64),
            FilterValue::Float(f) => Some(*f),
            FilterValue::String(s) => s.parse().ok(),
            FilterValue::Boolean(_) => None,
        }
    }

    /// Build the narrowest numeric value for a parsed bound.
    ///
    /// Whole numbers become `Integer` so they render as `500`, not `500.0`.
    pub fn number(value: f64) -> Self {
        if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            FilterValue::Integer(value as i64)
        } else {
            FilterValue::Float(value)
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::String(value.to_string())
    }
}

/// A single filter condition. Predicates in a list are combined with AND.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    /// Exact match.
    Equals { field: String, value: FilterValue },
    /// Field is greater than or equal to the value.
    GreaterOrEqual { field: String, value: FilterValue },
    /// Field is less than or equal to the value.
    LessOrEqual { field: String, value: FilterValue },
    /// Field matches any value in the list.
    In {
        field: String,
        values: Vec<FilterValue>,
    },
    /// Case-insensitive substring match against any of the fields.
    Search { fields: Vec<String>, term: String },
}

impl Predicate {
    /// Field names this predicate reads.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Predicate::Equals { field, .. }
            | Predicate::GreaterOrEqual { field, .. }
            | Predicate::LessOrEqual { field, .. }
            | Predicate::In { field, .. } => vec![field.as_str()],
            Predicate::Search { fields, .. } => fields.iter().map(String::as_str).collect(),
        }
    }
}

/// Sort specification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuerySort {
    /// Field to sort by.
    pub field: String,

    /// Sort direction.
    #[serde(default)]
    pub direction: SortDirection,
}

impl QuerySort {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Desc,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Raw UI state for one listing request.
///
/// Filter values are kept as the strings the UI sent; the filter parser
/// turns them into predicates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListQuery {
    /// Free-text search term.
    #[serde(default)]
    pub search: String,

    /// Exposed filter values keyed by filter key.
    #[serde(default)]
    pub filters: BTreeMap<String, String>,

    /// Current page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_page() -> u32 {
    1
}

impl ListQuery {
    /// Query for the first page with no constraints.
    pub fn new() -> Self {
        Self {
            page: 1,
            ..Default::default()
        }
    }

    pub fn with_search(mut self, term: &str) -> Self {
        self.search = term.to_string();
        self
    }

    pub fn with_filter(mut self, key: &str, value: &str) -> Self {
        self.filters.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Page number with the `page >= 1` invariant applied.
    pub fn normalized_page(&self) -> u32 {
        self.page.max(1)
    }
}

/// Result from executing a listing query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListResult {
    /// Rows for the current page as JSON values.
    pub items: Vec<serde_json::Value>,

    /// Total count of matching rows (before paging).
    pub total: u64,

    /// Current page number (1-indexed).
    pub page: u32,

    /// Items per page.
    pub per_page: u32,

    /// Total number of pages.
    pub total_pages: u32,

    /// Whether there's a next page.
    pub has_next: bool,

    /// Whether there's a previous page.
    pub has_prev: bool,
}

impl ListResult {
    /// Create a new result with paging calculations.
    pub fn new(items: Vec<serde_json::Value>, total: u64, page: u32, per_page: u32) -> Self {
        let total_pages = super::paginator::total_pages(total, per_page);

        Self {
            items,
            total,
            page,
            per_page,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    /// Create an empty result.
    pub fn empty(page: u32, per_page: u32) -> Self {
        Self::new(Vec::new(), 0, page, per_page)
    }

    /// Whether the query matched nothing.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Whether the query matched rows but the requested page lies beyond
    /// the last one.
    pub fn is_past_end(&self) -> bool {
        self.items.is_empty() && self.total > 0
    }
}
