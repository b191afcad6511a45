#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Checks the bundled development seed data against the built-in listings.

use std::path::Path;
use std::sync::Arc;

use trailhub_kernel::datasource::MemoryDataSource;
use trailhub_kernel::listing::{ListQuery, ListingRegistry, ListingService};
use trailhub_kernel::render;

fn seeded_service() -> Arc<ListingService> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/seed.json");
    let source = MemoryDataSource::from_seed_file(&path).expect("Failed to load seed data");
    ListingService::new(Arc::new(source), Arc::new(ListingRegistry::builtin()))
}

#[tokio::test]
async fn every_listing_has_decodable_rows() {
    let service = seeded_service();

    for listing in service.registry().iter() {
        let result = service
            .list(&listing.listing_id, &ListQuery::new())
            .await
            .unwrap();
        assert!(!result.is_empty(), "{} has no seed rows", listing.listing_id);

        let cards = render::cards(listing.entity, &result);
        assert_eq!(
            cards.len(),
            result.items.len(),
            "{} has rows that do not decode",
            listing.listing_id
        );
    }
}

#[tokio::test]
async fn seed_supports_the_exposed_filters() {
    let service = seeded_service();

    let moab = service
        .list("trails", &ListQuery::new().with_search("moab"))
        .await
        .unwrap();
    assert_eq!(moab.total, 2);

    let recovery = service
        .list(
            "parts",
            &ListQuery::new()
                .with_filter("category", "Recovery")
                .with_filter("price", "0-500"),
        )
        .await
        .unwrap();
    assert_eq!(recovery.total, 1);
    assert_eq!(recovery.items[0]["name"], "Recovery Boards");
}
