#![allow(clippy::unwrap_used, clippy::expect_used)]
//! List view integration tests.
//!
//! Exercises view state against real services, including out-of-order
//! responses from a slow backend.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{DelayedDataSource, FailingDataSource, memory_source};
use trailhub_kernel::listing::{
    Completion, ListView, ListingRegistry, ListingService, ViewStatus,
};
use trailhub_kernel::models::EntityKind;
use trailhub_kernel::render::{self, DisplayMode};
use trailhub_test_utils::{numbered, test_product};

fn loaded_names(status: &ViewStatus) -> Vec<String> {
    match status {
        ViewStatus::Loaded(result) => result
            .items
            .iter()
            .map(|row| row["name"].as_str().unwrap().to_string())
            .collect(),
        other => panic!("expected loaded view, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_stale_response_does_not_overwrite_newer() {
    let source = DelayedDataSource {
        inner: memory_source(vec![
            test_product("Slow Winch", "Recovery"),
            test_product("Jeep Bumper", "Armor"),
        ]),
        slow_term: "slow".to_string(),
        delay: Duration::from_millis(200),
    };
    let service = ListingService::new(Arc::new(source), Arc::new(ListingRegistry::builtin()));
    let view = Arc::new(ListView::new("parts"));

    view.set_search("slow");
    let stale = view.begin();
    let first = {
        let (view, service) = (Arc::clone(&view), Arc::clone(&service));
        tokio::spawn(async move {
            let outcome = service.list(view.listing_id(), &stale.query).await;
            view.complete(&stale, outcome)
        })
    };

    view.set_search("jeep");
    let fresh = view.begin();
    let second = {
        let (view, service) = (Arc::clone(&view), Arc::clone(&service));
        tokio::spawn(async move {
            let outcome = service.list(view.listing_id(), &fresh.query).await;
            view.complete(&fresh, outcome)
        })
    };

    assert_eq!(second.await.unwrap(), Completion::Applied);
    assert_eq!(first.await.unwrap(), Completion::Stale);
    assert_eq!(loaded_names(&view.status()), vec!["Jeep Bumper"]);
}

#[tokio::test]
async fn refresh_after_filter_change_shows_first_page() {
    let service = common::memory_service(numbered(45, "Part", |name| {
        test_product(name, "Lighting")
    }));
    let view = ListView::new("parts");

    view.set_page(3);
    view.refresh(&service).await;
    assert_eq!(loaded_names(&view.status()).len(), 5);

    view.set_filter("category", "Lighting");
    assert_eq!(view.refresh(&service).await, Completion::Applied);

    match view.status() {
        ViewStatus::Loaded(result) => {
            assert_eq!(result.page, 1);
            assert_eq!(result.items.len(), 20);
        }
        other => panic!("expected loaded view, got {other:?}"),
    }
}

#[tokio::test]
async fn failure_and_empty_render_differently() {
    let registry = Arc::new(ListingRegistry::builtin());

    let failing = ListingService::new(Arc::new(FailingDataSource), Arc::clone(&registry));
    let view = ListView::new("parts");
    view.refresh(&failing).await;
    assert!(matches!(view.status(), ViewStatus::Failed(_)));
    let failed_text =
        render::render_status(EntityKind::Product, &view.status(), DisplayMode::Grid, None);
    assert!(failed_text.starts_with("Could not load results"));

    let empty = common::memory_service(vec![]);
    let view = ListView::new("parts");
    view.refresh(&empty).await;
    assert!(matches!(view.status(), ViewStatus::Loaded(ref r) if r.total == 0));
    let empty_text =
        render::render_status(EntityKind::Product, &view.status(), DisplayMode::Grid, None);
    assert_eq!(empty_text, render::DEFAULT_EMPTY_TEXT);
}

#[tokio::test]
async fn rendered_list_mode_shows_cards() {
    let service = common::memory_service(vec![
        test_product("Rock Sliders", "Armor")
            .with_brand("Metal Cloak")
            .with_price(1095.0),
    ]);
    let view = ListView::new("parts");
    view.set_mode(DisplayMode::List);
    view.refresh(&service).await;

    let text = render::render_status(EntityKind::Product, &view.status(), view.mode(), None);
    assert!(text.contains("Rock Sliders"));
    assert!(text.contains("Metal Cloak"));
    assert!(text.contains("/parts/rock-sliders"));
    assert!(text.contains("Page 1 of 1"));
}

#[tokio::test]
async fn dropped_refresh_does_not_leave_view_loading() {
    let source = DelayedDataSource {
        inner: memory_source(vec![
            test_product("Slow Winch", "Recovery"),
            test_product("Jeep Bumper", "Armor"),
        ]),
        slow_term: "slow".to_string(),
        delay: Duration::from_millis(500),
    };
    let service = ListingService::new(Arc::new(source), Arc::new(ListingRegistry::builtin()));
    let view = ListView::new("parts");

    view.set_search("jeep");
    assert_eq!(view.refresh(&service).await, Completion::Applied);

    view.set_search("slow");
    let timed_out = tokio::time::timeout(Duration::from_millis(20), view.refresh(&service)).await;
    assert!(timed_out.is_err());

    assert!(!view.status().is_loading());
    assert_eq!(loaded_names(&view.status()), vec!["Jeep Bumper"]);
}
