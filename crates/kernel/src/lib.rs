//! Trailhub Kernel Library
//!
//! Listing engine, data sources, entity models and HTTP routes for the
//! off-road content site. The main entry point is the `trailhub` binary.

pub mod config;
pub mod datasource;
pub mod db;
pub mod error;
pub mod listing;
pub mod models;
pub mod render;
pub mod routes;
pub mod state;

pub use config::{Config, DataBackend};
pub use state::AppState;
