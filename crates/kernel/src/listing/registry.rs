//! Listing registry.
//!
//! A static, declarative table describing every browsable listing: which
//! collection it reads, its page size, search columns, exposed filters,
//! default sort and detail key. Routes are mounted from this table.
//!
//! The built-in table can be overridden from a TOML file:
//!
//! ```toml
//! [[listing]]
//! listing_id = "parts"
//! label = "Parts & Mods"
//! collection = "products"
//! entity = "product"
//! per_page = 24
//! search_fields = ["name", "brand"]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::paginator::MAX_ITEMS_PER_PAGE;
use super::types::QuerySort;
use crate::models::{EntityKind, TrailDifficulty};

/// Kinds of exposed filter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Exact match against a fixed (or open) option set.
    Enum,
    /// Exact match against free text.
    Text,
    /// Numeric range token such as `500-1000` or `2000`.
    Range,
}

/// A filter the UI may set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExposedFilter {
    /// Query-string key (e.g., "category").
    pub key: String,

    /// Row field the filter applies to. Defaults to the key.
    #[serde(default)]
    pub field: Option<String>,

    pub kind: FilterKind,

    /// Label for the filter UI.
    pub label: Option<String>,

    /// Allowed values for enum filters. Empty means any value.
    #[serde(default)]
    pub options: Vec<String>,
}

impl ExposedFilter {
    pub fn new(key: &str, kind: FilterKind) -> Self {
        Self {
            key: key.to_string(),
            field: None,
            kind,
            label: None,
            options: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Field name the predicate targets.
    pub fn field(&self) -> &str {
        self.field.as_deref().unwrap_or(&self.key)
    }
}

/// Complete listing definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingDefinition {
    /// Unique listing identifier, also the URL segment (e.g., "vehicles").
    pub listing_id: String,

    /// Human-readable label.
    pub label: String,

    /// Backend collection (table) to query.
    pub collection: String,

    /// Entity type rows decode as.
    pub entity: EntityKind,

    /// Number of items per page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Text columns searched by the free-text box.
    #[serde(default)]
    pub search_fields: Vec<String>,

    #[serde(default)]
    pub filters: Vec<ExposedFilter>,

    /// Default sort order.
    #[serde(default)]
    pub sorts: Vec<QuerySort>,

    /// Field used to look up a single row for detail pages.
    #[serde(default = "default_key_field")]
    pub key_field: String,

    /// Unique field appended to every sort so paging is stable.
    #[serde(default = "default_id_field")]
    pub id_field: String,

    /// Text to show when results are empty.
    pub empty_text: Option<String>,
}

fn default_per_page() -> u32 {
    12
}

fn default_key_field() -> String {
    "slug".to_string()
}

fn default_id_field() -> String {
    "id".to_string()
}

impl ListingDefinition {
    /// Look up an exposed filter by key.
    pub fn filter(&self, key: &str) -> Option<&ExposedFilter> {
        self.filters.iter().find(|f| f.key == key)
    }

    /// Default sorts followed by the id tie-breaker.
    pub fn stable_sorts(&self) -> Vec<QuerySort> {
        let mut sorts = self.sorts.clone();
        if !sorts.iter().any(|s| s.field == self.id_field) {
            sorts.push(QuerySort::asc(&self.id_field));
        }
        sorts
    }

    /// Validate a definition for safety and correctness.
    ///
    /// Returns a list of validation errors. Empty list means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.listing_id.is_empty()
            || !self
                .listing_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            errors.push(format!(
                "Listing id '{}' must be non-empty and URL-safe",
                self.listing_id
            ));
        }

        if !is_valid_field_name(&self.collection) {
            errors.push(format!(
                "Collection '{}' contains invalid characters",
                self.collection
            ));
        }

        if self.per_page == 0 || self.per_page > MAX_ITEMS_PER_PAGE {
            errors.push(format!(
                "per_page {} is outside 1..={MAX_ITEMS_PER_PAGE}",
                self.per_page
            ));
        }

        for field in &self.search_fields {
            if !is_valid_field_name(field) {
                errors.push(format!("Search field '{field}' contains invalid characters"));
            }
        }

        for filter in &self.filters {
            if !is_valid_field_name(filter.field()) {
                errors.push(format!(
                    "Filter field '{}' contains invalid characters",
                    filter.field()
                ));
            }
            if filter.kind != FilterKind::Enum && !filter.options.is_empty() {
                errors.push(format!(
                    "Filter '{}' lists options but is not an enum filter",
                    filter.key
                ));
            }
        }

        for sort in &self.sorts {
            if !is_valid_field_name(&sort.field) {
                errors.push(format!(
                    "Sort field '{}' contains invalid characters",
                    sort.field
                ));
            }
        }

        for field in [&self.key_field, &self.id_field] {
            if !is_valid_field_name(field) {
                errors.push(format!("Key field '{field}' contains invalid characters"));
            }
        }

        errors
    }
}

/// Validate a field name for use in queries.
///
/// Allows ASCII alphanumerics and underscores. Must be non-empty and start
/// with a letter or underscore.
pub fn is_valid_field_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() && first != '_' {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Ordered table of listing definitions.
#[derive(Debug, Clone, Default)]
pub struct ListingRegistry {
    listings: Vec<ListingDefinition>,
}

#[derive(Deserialize)]
struct ListingFile {
    #[serde(default, rename = "listing")]
    listings: Vec<ListingDefinition>,
}

impl ListingRegistry {
    /// Build a registry, rejecting invalid or duplicate definitions.
    pub fn new(listings: Vec<ListingDefinition>) -> Result<Self> {
        let mut registry = Self::default();
        for listing in listings {
            registry.insert(listing)?;
        }
        Ok(registry)
    }

    /// Insert or replace a definition.
    pub fn insert(&mut self, listing: ListingDefinition) -> Result<()> {
        let errors = listing.validate();
        if !errors.is_empty() {
            anyhow::bail!(
                "invalid listing '{}': {}",
                listing.listing_id,
                errors.join("; ")
            );
        }

        match self
            .listings
            .iter_mut()
            .find(|l| l.listing_id == listing.listing_id)
        {
            Some(existing) => *existing = listing,
            None => self.listings.push(listing),
        }
        Ok(())
    }

    /// Get a listing by id.
    pub fn get(&self, listing_id: &str) -> Option<&ListingDefinition> {
        self.listings.iter().find(|l| l.listing_id == listing_id)
    }

    /// All listings in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ListingDefinition> {
        self.listings.iter()
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Apply overrides from a TOML document on top of this registry.
    pub fn merge_toml(&mut self, source: &str) -> Result<()> {
        let file: ListingFile = toml::from_str(source).context("failed to parse listings TOML")?;
        for listing in file.listings {
            self.insert(listing)?;
        }
        Ok(())
    }

    /// Load overrides from a TOML file on top of the built-in table.
    pub fn builtin_with_overrides(path: &std::path::Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read listings file {}", path.display()))?;
        let mut registry = Self::builtin();
        registry.merge_toml(&source)?;
        Ok(registry)
    }

    /// The built-in listings for the site.
    pub fn builtin() -> Self {
        let price = || ExposedFilter::new("price", FilterKind::Range).with_label("Price");

        Self {
            listings: vec![
                ListingDefinition {
                    listing_id: "vehicles".to_string(),
                    label: "Vehicles".to_string(),
                    collection: "vehicles".to_string(),
                    entity: EntityKind::Vehicle,
                    per_page: 12,
                    search_fields: fields(&["name", "brand", "model", "description"]),
                    filters: vec![
                        ExposedFilter::new("category", FilterKind::Enum).with_label("Category"),
                        ExposedFilter::new("brand", FilterKind::Text).with_label("Brand"),
                        price(),
                    ],
                    sorts: vec![QuerySort::desc("created_at")],
                    key_field: default_key_field(),
                    id_field: default_id_field(),
                    empty_text: None,
                },
                ListingDefinition {
                    listing_id: "parts".to_string(),
                    label: "Parts & Mods".to_string(),
                    collection: "products".to_string(),
                    entity: EntityKind::Product,
                    per_page: 20,
                    search_fields: fields(&["name", "brand", "description"]),
                    filters: vec![
                        ExposedFilter::new("category", FilterKind::Enum)
                            .with_label("Category")
                            .with_options([
                                "Suspension",
                                "Lighting",
                                "Armor",
                                "Wheels & Tires",
                                "Recovery",
                                "Performance",
                                "Interior",
                                "Exterior",
                            ]),
                        ExposedFilter::new("brand", FilterKind::Text).with_label("Brand"),
                        price(),
                    ],
                    sorts: vec![QuerySort::asc("name")],
                    key_field: default_key_field(),
                    id_field: default_id_field(),
                    empty_text: None,
                },
                ListingDefinition {
                    listing_id: "trails".to_string(),
                    label: "Trails".to_string(),
                    collection: "trails".to_string(),
                    entity: EntityKind::Trail,
                    per_page: 12,
                    search_fields: fields(&["name", "location", "description"]),
                    filters: vec![
                        ExposedFilter::new("difficulty", FilterKind::Enum)
                            .with_label("Difficulty")
                            .with_options(TrailDifficulty::ALL.iter().map(|d| d.as_str())),
                        ExposedFilter::new("state", FilterKind::Text).with_label("State"),
                    ],
                    sorts: vec![QuerySort::asc("name")],
                    key_field: default_key_field(),
                    id_field: default_id_field(),
                    empty_text: None,
                },
                ListingDefinition {
                    listing_id: "blog".to_string(),
                    label: "Blog".to_string(),
                    collection: "blog_posts".to_string(),
                    entity: EntityKind::BlogPost,
                    per_page: 12,
                    search_fields: fields(&["title", "excerpt", "author"]),
                    filters: vec![
                        ExposedFilter::new("category", FilterKind::Enum).with_label("Category"),
                        ExposedFilter::new("author", FilterKind::Text).with_label("Author"),
                    ],
                    sorts: vec![QuerySort::desc("published_at")],
                    key_field: default_key_field(),
                    id_field: default_id_field(),
                    empty_text: Some("No posts yet. Check back soon.".to_string()),
                },
                ListingDefinition {
                    listing_id: "builds".to_string(),
                    label: "Community Builds".to_string(),
                    collection: "builds".to_string(),
                    entity: EntityKind::Build,
                    per_page: 12,
                    search_fields: fields(&["title", "owner_name", "description"]),
                    filters: vec![
                        ExposedFilter::new("vehicle", FilterKind::Text)
                            .with_field("vehicle_id")
                            .with_label("Vehicle"),
                    ],
                    sorts: vec![QuerySort::desc("created_at")],
                    key_field: default_key_field(),
                    id_field: default_id_field(),
                    empty_text: None,
                },
            ],
        }
    }
}

fn fields(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}
