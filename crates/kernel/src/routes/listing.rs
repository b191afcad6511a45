//! Listing API routes.
//!
//! REST endpoints for browsing any listing in the registry. Paths are
//! resolved against the registry at request time, so a listing added in
//! the listings file is served without new routes.

use std::collections::HashMap;

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json,
    routing::get,
};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::listing::{ExposedFilter, ListQuery, ListResult};
use crate::models::EntityKind;
use crate::render::{self, Card, DEFAULT_EMPTY_TEXT};
use crate::state::AppState;

/// Query-string key for the free-text search box.
const SEARCH_PARAM: &str = "q";

/// Query-string key for the page number.
const PAGE_PARAM: &str = "page";

/// Create the listing router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/listings", get(list_listings))
        .route("/api/{listing}", get(execute_listing))
        .route("/api/{listing}/{key}", get(get_entry))
}

// -------------------------------------------------------------------------
// Response types
// -------------------------------------------------------------------------

#[derive(Serialize)]
struct ListingSummary {
    listing_id: String,
    label: String,
    entity: EntityKind,
    per_page: u32,
    filters: Vec<ExposedFilter>,
}

#[derive(Serialize)]
struct ListingResponse {
    #[serde(flatten)]
    result: ListResult,
    cards: Vec<Card>,
    /// Present only when the query matched nothing.
    #[serde(skip_serializing_if = "Option::is_none")]
    empty_text: Option<String>,
    /// Present only when the page lies beyond the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    notice: Option<String>,
}

// -------------------------------------------------------------------------
// Handlers
// -------------------------------------------------------------------------

async fn list_listings(State(state): State<AppState>) -> Json<Vec<ListingSummary>> {
    Json(
        state
            .registry()
            .iter()
            .map(|l| ListingSummary {
                listing_id: l.listing_id.clone(),
                label: l.label.clone(),
                entity: l.entity,
                per_page: l.per_page,
                filters: l.filters.clone(),
            })
            .collect(),
    )
}

async fn execute_listing(
    State(state): State<AppState>,
    Path(listing_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Json<ListingResponse>> {
    let query = parse_list_query(params)?;
    let service = state.listings();

    let result = service.list(&listing_id, &query).await?;
    let listing = service.definition(&listing_id)?;

    let empty_text = result.is_empty().then(|| {
        listing
            .empty_text
            .clone()
            .unwrap_or_else(|| DEFAULT_EMPTY_TEXT.to_string())
    });

    let notice = result.is_past_end().then(|| render::past_end_text(&result));

    Ok(Json(ListingResponse {
        cards: render::cards(listing.entity, &result),
        result,
        empty_text,
        notice,
    }))
}

async fn get_entry(
    State(state): State<AppState>,
    Path((listing_id, key)): Path<(String, String)>,
) -> AppResult<Json<serde_json::Value>> {
    let row = state.listings().get(&listing_id, &key).await?;
    Ok(Json(row))
}

/// Split query-string parameters into search, page and filter values.
fn parse_list_query(mut params: HashMap<String, String>) -> AppResult<ListQuery> {
    let search = params.remove(SEARCH_PARAM).unwrap_or_default();

    let page = match params.remove(PAGE_PARAM) {
        Some(raw) if !raw.is_empty() => raw
            .parse::<u32>()
            .map_err(|_| AppError::BadRequest(format!("invalid page number: {raw:?}")))?,
        _ => 1,
    };

    Ok(ListQuery {
        search,
        filters: params.into_iter().collect(),
        page,
    })
}
