//! Community build model.

use serde::{Deserialize, Serialize};

use super::{Entity, EntityKind, null_as_default};
use crate::render::Card;

/// A member's vehicle build.
///
/// The vehicle and mods are referenced by id only; nothing here checks
/// that they exist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Build {
    /// Identifier as stored by the data service (UUID, integer or text).
    pub id: serde_json::Value,

    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,

    #[serde(deserialize_with = "null_as_default")]
    pub title: String,

    pub owner_name: Option<String>,

    pub vehicle_id: Option<String>,

    #[serde(deserialize_with = "null_as_default")]
    pub mod_ids: Vec<String>,

    pub description: Option<String>,

    pub image_url: Option<String>,
}

impl Entity for Build {
    const KIND: EntityKind = EntityKind::Build;

    fn card(&self) -> Card {
        let badge = match self.mod_ids.len() {
            0 => None,
            1 => Some("1 mod".to_string()),
            n => Some(format!("{n} mods")),
        };

        Card {
            title: self.title.clone(),
            subtitle: self.owner_name.clone(),
            badge,
            price: None,
            href: format!("/builds/{}", self.slug),
        }
    }
}
