//! Product (part or mod) model.

use serde::{Deserialize, Serialize};

use super::{Entity, EntityKind, null_as_default};
use crate::render::Card;

/// A part or modification sold or reviewed on the site.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    /// Identifier as stored by the data service (UUID, integer or text).
    pub id: serde_json::Value,

    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,

    #[serde(deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(deserialize_with = "null_as_default")]
    pub brand: String,

    /// Category (e.g., "Suspension", "Lighting", "Armor").
    pub category: Option<String>,

    pub price: Option<f64>,

    /// Vehicle names or ids this part fits.
    #[serde(deserialize_with = "null_as_default")]
    pub compatible_vehicles: Vec<String>,

    pub description: Option<String>,

    pub image_url: Option<String>,

    pub in_stock: Option<bool>,
}

impl Entity for Product {
    const KIND: EntityKind = EntityKind::Product;

    fn card(&self) -> Card {
        Card {
            title: self.name.clone(),
            subtitle: (!self.brand.is_empty()).then(|| self.brand.clone()),
            badge: match self.in_stock {
                Some(false) => Some("Out of stock".to_string()),
                _ => self.category.clone(),
            },
            price: self.price,
            href: format!("/parts/{}", self.slug),
        }
    }
}
