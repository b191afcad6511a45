//! Entity models.
//!
//! Rows arrive from the data service as JSON; these types give each
//! listing a typed view with defaults for absent optional fields.

pub mod blog_post;
pub mod build;
pub mod product;
pub mod trail;
pub mod vehicle;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

pub use blog_post::BlogPost;
pub use build::Build;
pub use product::Product;
pub use trail::{Trail, TrailDifficulty};
pub use vehicle::Vehicle;

use crate::render::Card;

/// Kinds of entity the site browses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Vehicle,
    Product,
    Trail,
    BlogPost,
    Build,
}

impl EntityKind {
    /// Machine name used in logs and listing definitions.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Vehicle => "vehicle",
            EntityKind::Product => "product",
            EntityKind::Trail => "trail",
            EntityKind::BlogPost => "blog_post",
            EntityKind::Build => "build",
        }
    }

    /// Decode a row as this kind of entity and build its card.
    pub fn card_from_row(&self, row: &serde_json::Value) -> Result<Card> {
        let card = match self {
            EntityKind::Vehicle => decode::<Vehicle>(row)?.card(),
            EntityKind::Product => decode::<Product>(row)?.card(),
            EntityKind::Trail => decode::<Trail>(row)?.card(),
            EntityKind::BlogPost => decode::<BlogPost>(row)?.card(),
            EntityKind::Build => decode::<Build>(row)?.card(),
        };
        Ok(card)
    }
}

/// A browsable record.
pub trait Entity: DeserializeOwned {
    /// Which kind of entity this is.
    const KIND: EntityKind;

    /// Presentational summary.
    fn card(&self) -> Card;
}

/// Deserialize an explicit `null` as the type's default.
///
/// `#[serde(default)]` only covers absent keys; database and API rows
/// carry nullable columns as `null`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Decode a JSON row into an entity.
pub fn decode<T: Entity>(row: &serde_json::Value) -> Result<T> {
    T::deserialize(row).with_context(|| format!("failed to decode {} row", T::KIND.as_str()))
}
