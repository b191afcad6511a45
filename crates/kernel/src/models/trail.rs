//! Trail model.

use serde::{Deserialize, Serialize};

use super::{Entity, EntityKind, null_as_default};
use crate::render::Card;

/// Trail difficulty rating.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum TrailDifficulty {
    Easy,
    Moderate,
    Difficult,
    Extreme,
    /// Missing or unrecognized rating.
    #[default]
    #[serde(other)]
    Unrated,
}

impl TrailDifficulty {
    /// Every rated difficulty, easiest first.
    pub const ALL: [TrailDifficulty; 4] = [
        TrailDifficulty::Easy,
        TrailDifficulty::Moderate,
        TrailDifficulty::Difficult,
        TrailDifficulty::Extreme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrailDifficulty::Easy => "Easy",
            TrailDifficulty::Moderate => "Moderate",
            TrailDifficulty::Difficult => "Difficult",
            TrailDifficulty::Extreme => "Extreme",
            TrailDifficulty::Unrated => "Unrated",
        }
    }
}

/// An off-road trail.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Trail {
    /// Identifier as stored by the data service (UUID, integer or text).
    pub id: serde_json::Value,

    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,

    #[serde(deserialize_with = "null_as_default")]
    pub name: String,

    /// Nearest town or area.
    pub location: Option<String>,

    /// Two-letter state code.
    pub state: Option<String>,

    pub difficulty: Option<TrailDifficulty>,

    pub length_miles: Option<f64>,

    pub description: Option<String>,

    pub image_url: Option<String>,
}

impl Entity for Trail {
    const KIND: EntityKind = EntityKind::Trail;

    fn card(&self) -> Card {
        let subtitle = match (&self.location, &self.state) {
            (Some(location), Some(state)) => Some(format!("{location}, {state}")),
            (Some(place), None) | (None, Some(place)) => Some(place.clone()),
            (None, None) => None,
        };

        Card {
            title: self.name.clone(),
            subtitle,
            badge: Some(self.difficulty.unwrap_or_default().as_str().to_string()),
            price: None,
            href: format!("/trails/{}", self.slug),
        }
    }
}
