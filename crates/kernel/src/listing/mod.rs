//! Listing query engine module.
//!
//! This module provides:
//! - ListingRegistry: Declarative listing definitions (collection, filters, sorts)
//! - Filter parsing: Raw UI state to validated predicates
//! - ListingQueryBuilder: SeaQuery-based SQL generation
//! - Paginator: Page windows and page counts
//! - ListingService: Executes listing queries against a data source
//! - ListView: Per-view state with stale-response protection

pub mod filters;
pub mod paginator;
pub(crate) mod query_builder;
pub mod registry;
mod service;
pub mod types;
mod view;

pub use filters::{ALL_SENTINEL, FilterError, RangeBounds, build_predicates, parse_range_token};
pub use paginator::{MAX_ITEMS_PER_PAGE, PageWindow};
pub use query_builder::ListingQueryBuilder;
pub use registry::{ExposedFilter, FilterKind, ListingDefinition, ListingRegistry};
pub use service::{ListingError, ListingService};
pub use types::{FilterValue, ListQuery, ListResult, Predicate, QuerySort, SortDirection};
pub use view::{Completion, ListView, Ticket, ViewStatus};
