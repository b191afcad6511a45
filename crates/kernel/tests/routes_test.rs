#![allow(clippy::unwrap_used, clippy::expect_used)]
//! HTTP API integration tests.
//!
//! Drives the real router with `oneshot` requests over in-memory and
//! failing data sources.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{FailingDataSource, TestApp, body_json};
use serde_json::json;
use trailhub_test_utils::{
    assert, numbered, test_blog_post, test_product, test_trail, test_vehicle,
};

fn parts_app() -> TestApp {
    TestApp::new(vec![
        test_product("Jeep Lift Kit", "Suspension")
            .with_brand("Rough Country")
            .with_price(499.0),
        test_product("Jeep Light Bar", "Lighting").with_price(249.0),
        test_product("Coilovers", "Suspension").with_price(1800.0),
    ])
}

#[tokio::test]
async fn listings_index() {
    let app = TestApp::new(vec![]);
    let response = app.get("/api/listings").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["listing_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["vehicles", "parts", "trails", "blog", "builds"]);
    assert_eq!(body[1]["per_page"], 20);
    assert_eq!(body[1]["filters"][0]["key"], "category");
}

#[tokio::test]
async fn listing_with_search_and_filter() {
    let app = parts_app();
    let response = app.get("/api/parts?q=jeep&category=Suspension").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["page"], 1);
    assert_eq!(body["items"][0]["name"], "Jeep Lift Kit");
    assert_eq!(body["cards"][0]["title"], "Jeep Lift Kit");
    assert_eq!(body["cards"][0]["href"], "/parts/jeep-lift-kit");
    assert::lacks_key(&body, "empty_text");
}

#[tokio::test]
async fn listing_paging_fields() {
    let app = TestApp::new(numbered(30, "Trail", |name| test_trail(name, "Moderate")));

    let body = body_json(app.get("/api/trails?page=3").await).await;
    assert_eq!(body["total"], 30);
    assert_eq!(body["total_pages"], 3);
    assert_eq!(body["items"].as_array().unwrap().len(), 6);
    assert_eq!(body["has_next"], false);
    assert_eq!(body["has_prev"], true);
}

#[tokio::test]
async fn zero_matches_is_ok_with_empty_text() {
    let app = parts_app();
    let response = app.get("/api/parts?q=snorkel").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total"], 0);
    assert!(body["items"].as_array().unwrap().is_empty());
    assert::has_key(&body, "empty_text");
}

#[tokio::test]
async fn rows_with_nulls_and_integer_ids_still_get_cards() {
    let app = TestApp::new(vec![
        test_vehicle("Tacoma TRD Pro").with_field("brand", json!(null)),
        test_vehicle("Gladiator Mojave").with_field("id", json!(42)),
    ]);

    let body = body_json(app.get("/api/vehicles").await).await;
    assert_eq!(body["total"], 2);
    let cards = body["cards"].as_array().unwrap();
    assert_eq!(cards.len(), body["items"].as_array().unwrap().len());
    assert!(cards.iter().any(|c| c["title"] == "Tacoma TRD Pro"));
    assert!(cards.iter().any(|c| c["title"] == "Gladiator Mojave"));
}

#[tokio::test]
async fn page_past_end_keeps_total_without_empty_text() {
    let app = TestApp::new(numbered(45, "Part", |name| test_product(name, "Armor")));
    let response = app.get("/api/parts?page=9").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total"], 45);
    assert_eq!(body["total_pages"], 3);
    assert!(body["items"].as_array().unwrap().is_empty());
    assert::lacks_key(&body, "empty_text");
    assert_eq!(
        body["notice"],
        "Page 9 is past the last page (3). 45 results in total."
    );
}

#[tokio::test]
async fn listing_specific_empty_text() {
    let app = TestApp::new(vec![]);
    let body = body_json(app.get("/api/blog").await).await;
    assert_eq!(body["empty_text"], "No posts yet. Check back soon.");
}

#[tokio::test]
async fn malformed_range_is_bad_request() {
    let app = parts_app();
    let response = app.get("/api/parts?price=abc-1").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert::contains(body["error"].as_str().unwrap(), "price");
}

#[tokio::test]
async fn invalid_page_is_bad_request() {
    let app = parts_app();
    let response = app.get("/api/parts?page=last").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_listing_is_not_found() {
    let app = parts_app();
    let response = app.get("/api/videos").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn entry_by_slug() {
    let app = TestApp::new(vec![test_blog_post("Airing Down 101")]);

    let response = app.get("/api/blog/airing-down-101").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["title"], "Airing Down 101");

    let response = app.get("/api/blog/airing-up").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn backend_failure_is_bad_gateway() {
    let app = TestApp::with_source(Arc::new(FailingDataSource));

    let response = app.get("/api/parts").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = body_json(response).await;
    assert::not_contains(body["error"].as_str().unwrap(), "connection refused");

    let response = app.get("/api/parts/anything").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn health_reflects_data_source() {
    let app = TestApp::new(vec![]);
    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["backend"], "memory");

    let app = TestApp::with_source(Arc::new(FailingDataSource));
    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
