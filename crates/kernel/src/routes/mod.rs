//! HTTP route handlers.

pub mod health;
pub mod listing;

use axum::Router;

use crate::state::AppState;

/// All application routes, without outer middleware layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(listing::router())
        .with_state(state)
}
