//! Blog post model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, EntityKind, null_as_default};
use crate::render::Card;

/// A community or editorial blog post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogPost {
    /// Identifier as stored by the data service (UUID, integer or text).
    pub id: serde_json::Value,

    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,

    #[serde(deserialize_with = "null_as_default")]
    pub title: String,

    pub author: Option<String>,

    pub category: Option<String>,

    /// Short summary shown on cards.
    pub excerpt: Option<String>,

    pub content: Option<String>,

    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,

    pub published_at: Option<DateTime<Utc>>,
}

impl Entity for BlogPost {
    const KIND: EntityKind = EntityKind::BlogPost;

    fn card(&self) -> Card {
        let subtitle = match (&self.author, self.published_at) {
            (Some(author), Some(at)) => Some(format!("{author} · {}", at.format("%Y-%m-%d"))),
            (Some(author), None) => Some(author.clone()),
            (None, Some(at)) => Some(at.format("%Y-%m-%d").to_string()),
            (None, None) => None,
        };

        Card {
            title: self.title.clone(),
            subtitle,
            badge: self.category.clone(),
            price: None,
            href: format!("/blog/{}", self.slug),
        }
    }
}
