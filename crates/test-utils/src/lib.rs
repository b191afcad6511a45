//! Trailhub test utilities.
//!
//! Helpers for integration testing: row fixtures for each collection,
//! seed document builders, and assertion utilities.

use serde_json::{Map, Value as JsonValue, json};
use uuid::Uuid;

/// Create a vehicle row.
pub fn test_vehicle(name: &str) -> TestRow {
    TestRow::new("vehicles", "name", name)
}

/// Create a part/mod row.
pub fn test_product(name: &str, category: &str) -> TestRow {
    TestRow::new("products", "name", name).with_field("category", json!(category))
}

/// Create a trail row.
pub fn test_trail(name: &str, difficulty: &str) -> TestRow {
    TestRow::new("trails", "name", name).with_field("difficulty", json!(difficulty))
}

/// Create a blog post row.
pub fn test_blog_post(title: &str) -> TestRow {
    TestRow::new("blog_posts", "title", title)
}

/// Create a community build row.
pub fn test_build(title: &str) -> TestRow {
    TestRow::new("builds", "title", title)
}

/// A row builder for creating test fixtures.
#[derive(Debug, Clone)]
pub struct TestRow {
    pub collection: &'static str,
    pub fields: Map<String, JsonValue>,
}

impl TestRow {
    fn new(collection: &'static str, title_field: &str, title: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("id".to_string(), json!(Uuid::now_v7()));
        fields.insert("slug".to_string(), json!(slugify(title)));
        fields.insert(title_field.to_string(), json!(title));
        Self { collection, fields }
    }

    /// Set a custom ID.
    pub fn with_id(self, id: Uuid) -> Self {
        self.with_field("id", json!(id))
    }

    /// Set the URL key.
    pub fn with_slug(self, slug: &str) -> Self {
        self.with_field("slug", json!(slug))
    }

    pub fn with_brand(self, brand: &str) -> Self {
        self.with_field("brand", json!(brand))
    }

    pub fn with_price(self, price: f64) -> Self {
        self.with_field("price", json!(price))
    }

    /// Set an RFC 3339 creation timestamp.
    pub fn with_created_at(self, timestamp: &str) -> Self {
        self.with_field("created_at", json!(timestamp))
    }

    /// Add a single field.
    pub fn with_field(mut self, name: &str, value: JsonValue) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.fields.get("id").and_then(JsonValue::as_str)
    }

    pub fn into_json(self) -> JsonValue {
        JsonValue::Object(self.fields)
    }
}

/// Build `count` rows named "{prefix} 01", "{prefix} 02", ...
pub fn numbered<F>(count: usize, prefix: &str, make: F) -> Vec<TestRow>
where
    F: Fn(&str) -> TestRow,
{
    (1..=count)
        .map(|i| make(&format!("{prefix} {i:02}")))
        .collect()
}

/// Group rows into a seed document: `{"collection": [row, ...]}`.
pub fn seed_document(rows: impl IntoIterator<Item = TestRow>) -> JsonValue {
    let mut doc = Map::new();
    for row in rows {
        let collection = row.collection;
        let entry = doc
            .entry(collection.to_string())
            .or_insert_with(|| JsonValue::Array(Vec::new()));
        if let JsonValue::Array(items) = entry {
            items.push(row.into_json());
        }
    }
    JsonValue::Object(doc)
}

fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

/// Assertion helpers for JSON content.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a JSON value does not have a key.
    pub fn lacks_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_none(),
            "Expected JSON to NOT have key '{key}', got: {value}"
        );
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string to NOT contain '{needle}'\nActual: {haystack}"
        );
    }
}
