//! Filter state parsing.
//!
//! Turns raw UI filter state (strings straight from a query string or a
//! dropdown) into an ordered, validated list of predicates. Malformed
//! input is rejected here so no query is ever built from it.

use thiserror::Error;

use super::registry::{ExposedFilter, FilterKind, ListingDefinition};
use super::types::{FilterValue, ListQuery, Predicate};

/// Filter value meaning "no constraint".
pub const ALL_SENTINEL: &str = "all";

/// Errors from validating filter input.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FilterError {
    #[error("malformed range for '{key}': {token:?} ({reason})")]
    MalformedRange {
        key: String,
        token: String,
        reason: &'static str,
    },

    #[error("unknown option for '{key}': {value:?}")]
    UnknownOption { key: String, value: String },
}

/// Inclusive numeric bounds parsed from a range token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Parse a range token.
///
/// Accepted forms:
/// - `"500-1000"`: both bounds
/// - `"2000"` or `"2000+"`: lower bound only
/// - `"-500"`: upper bound only
///
/// Bounds must be non-negative numbers with `min <= max`.
pub fn parse_range_token(token: &str) -> Result<RangeBounds, &'static str> {
    let token = token.trim();
    if token.is_empty() {
        return Err("empty range");
    }

    let (min, max) = match token.split_once('-') {
        Some((lo, hi)) => (lo.trim(), Some(hi.trim())),
        None => (token.strip_suffix('+').unwrap_or(token).trim(), None),
    };

    let min = if min.is_empty() {
        None
    } else {
        Some(parse_bound(min)?)
    };
    let max = match max {
        Some(hi) if hi.is_empty() => None,
        Some(hi) => Some(parse_bound(hi)?),
        None => None,
    };

    match (min, max) {
        (None, None) => Err("range has no bounds"),
        (Some(lo), Some(hi)) if lo > hi => Err("lower bound exceeds upper bound"),
        _ => Ok(RangeBounds { min, max }),
    }
}

fn parse_bound(raw: &str) -> Result<f64, &'static str> {
    let value: f64 = raw.parse().map_err(|_| "bound is not a number")?;
    if !value.is_finite() {
        return Err("bound is not a number");
    }
    if value < 0.0 {
        return Err("bound is negative");
    }
    Ok(value)
}

/// Whether a raw filter value carries no constraint.
fn is_unconstrained(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case(ALL_SENTINEL)
}

/// Build the predicate list for a listing query.
///
/// The search predicate comes first, then one or two predicates per set
/// filter in definition order. Keys the listing does not expose are
/// ignored.
pub fn build_predicates(
    listing: &ListingDefinition,
    query: &ListQuery,
) -> Result<Vec<Predicate>, FilterError> {
    let mut predicates = Vec::new();

    let term = query.search.trim();
    if !term.is_empty() && !listing.search_fields.is_empty() {
        predicates.push(Predicate::Search {
            fields: listing.search_fields.clone(),
            term: term.to_string(),
        });
    }

    for filter in &listing.filters {
        let Some(raw) = query.filters.get(&filter.key) else {
            continue;
        };
        if is_unconstrained(raw) {
            continue;
        }
        filter_predicates(filter, raw.trim(), &mut predicates)?;
    }

    for key in query.filters.keys() {
        if listing.filter(key).is_none() {
            tracing::debug!(listing = %listing.listing_id, key = %key, "ignoring unexposed filter");
        }
    }

    Ok(predicates)
}

fn filter_predicates(
    filter: &ExposedFilter,
    value: &str,
    out: &mut Vec<Predicate>,
) -> Result<(), FilterError> {
    let field = filter.field().to_string();

    match filter.kind {
        FilterKind::Text => out.push(Predicate::Equals {
            field,
            value: FilterValue::String(value.to_string()),
        }),
        FilterKind::Enum => {
            let canonical = if filter.options.is_empty() {
                value.to_string()
            } else {
                filter
                    .options
                    .iter()
                    .find(|o| o.eq_ignore_ascii_case(value))
                    .cloned()
                    .ok_or_else(|| FilterError::UnknownOption {
                        key: filter.key.clone(),
                        value: value.to_string(),
                    })?
            };
            out.push(Predicate::Equals {
                field,
                value: FilterValue::String(canonical),
            });
        }
        FilterKind::Range => {
            let bounds =
                parse_range_token(value).map_err(|reason| FilterError::MalformedRange {
                    key: filter.key.clone(),
                    token: value.to_string(),
                    reason,
                })?;
            if let Some(min) = bounds.min {
                out.push(Predicate::GreaterOrEqual {
                    field: field.clone(),
                    value: FilterValue::number(min),
                });
            }
            if let Some(max) = bounds.max {
                out.push(Predicate::LessOrEqual {
                    field,
                    value: FilterValue::number(max),
                });
            }
        }
    }

    Ok(())
}
