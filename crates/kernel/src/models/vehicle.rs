//! Vehicle model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, EntityKind, null_as_default};
use crate::render::Card;

/// A vehicle listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Vehicle {
    /// Identifier as stored by the data service (UUID, integer or text).
    pub id: serde_json::Value,

    /// URL key (e.g., "jeep-wrangler-rubicon").
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,

    /// Display name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,

    /// Manufacturer.
    #[serde(deserialize_with = "null_as_default")]
    pub brand: String,

    pub model: Option<String>,

    pub year: Option<i32>,

    /// Category (e.g., "SUV", "Truck", "UTV").
    pub category: Option<String>,

    /// Starting price in dollars.
    pub price: Option<f64>,

    pub description: Option<String>,

    pub image_url: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Vehicle {
    const KIND: EntityKind = EntityKind::Vehicle;

    fn card(&self) -> Card {
        let subtitle = match (self.year, self.brand.is_empty()) {
            (Some(year), false) => Some(format!("{year} {}", self.brand)),
            (Some(year), true) => Some(year.to_string()),
            (None, false) => Some(self.brand.clone()),
            (None, true) => None,
        };

        Card {
            title: self.name.clone(),
            subtitle,
            badge: self.category.clone(),
            price: self.price,
            href: format!("/vehicles/{}", self.slug),
        }
    }
}
