//! PostgREST-style HTTP data source.
//!
//! Translates predicates into query-string operators (`eq`, `gte`, `lte`,
//! `in`, `ilike`), requests the window with a `Range` header, and reads
//! the exact total from `Content-Range`.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_RANGE, HeaderMap, HeaderValue};
use tracing::debug;
use url::Url;

use super::{DataSource, Page, PageRequest};
use crate::listing::query_builder::escape_like_wildcards;
use crate::listing::{FilterValue, Predicate, QuerySort, SortDirection};

/// Data source backed by a PostgREST-compatible HTTP API.
#[derive(Clone)]
pub struct RestDataSource {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl RestDataSource {
    /// Create a client for the API rooted at `base_url`.
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).with_context(|| format!("invalid data API URL '{base_url}'"))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn collection_url(&self, collection: &str) -> Result<Url> {
        self.base_url
            .join(collection)
            .with_context(|| format!("invalid collection name '{collection}'"))
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(ref key) = self.api_key {
            headers.insert(
                "apikey",
                HeaderValue::from_str(key).context("API key is not a valid header value")?,
            );
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {key}"))
                    .context("API key is not a valid header value")?,
            );
        }
        Ok(headers)
    }
}

#[async_trait]
impl DataSource for RestDataSource {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn fetch_page(&self, request: PageRequest<'_>) -> Result<Page> {
        let url = self.collection_url(request.collection)?;
        let range = format!("{}-{}", request.window.offset, request.window.last_index());

        let response = self
            .client
            .get(url)
            .headers(self.auth_headers()?)
            .header("Range-Unit", "items")
            .header("Range", &range)
            .header("Prefer", "count=exact")
            .query(&query_params(request.predicates, request.sorts))
            .send()
            .await
            .with_context(|| format!("request for {} failed", request.collection))?;

        let status = response.status();
        let total = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range);

        // Past the last row: the API still reports the total.
        if status == StatusCode::RANGE_NOT_SATISFIABLE {
            let total = total.context("416 response without a total in Content-Range")?;
            return Ok(Page {
                rows: Vec::new(),
                total,
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "data API returned {status} for {}: {body}",
                request.collection
            );
        }

        let total = total.context("response is missing an exact count in Content-Range")?;
        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .with_context(|| format!("invalid JSON rows for {}", request.collection))?;

        debug!(
            collection = request.collection,
            %range,
            total,
            returned = rows.len(),
            "rest page fetched"
        );

        Ok(Page { rows, total })
    }

    async fn fetch_one(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<serde_json::Value>> {
        let url = self.collection_url(collection)?;
        let predicate = Predicate::Equals {
            field: field.to_string(),
            value: FilterValue::from(value),
        };
        let mut params = query_params(std::slice::from_ref(&predicate), &[]);
        params.push(("limit".to_string(), "1".to_string()));

        let response = self
            .client
            .get(url)
            .headers(self.auth_headers()?)
            .query(&params)
            .send()
            .await
            .with_context(|| format!("request for {collection} failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("data API returned {status} for {collection}: {body}");
        }

        let mut rows: Vec<serde_json::Value> = response
            .json()
            .await
            .with_context(|| format!("invalid JSON rows for {collection}"))?;

        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    async fn healthy(&self) -> bool {
        let Ok(headers) = self.auth_headers() else {
            return false;
        };
        match self
            .client
            .get(self.base_url.clone())
            .headers(headers)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "data API health check failed");
                false
            }
        }
    }
}

/// Build the query string for a page request.
pub(crate) fn query_params(predicates: &[Predicate], sorts: &[QuerySort]) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];

    for predicate in predicates {
        match predicate {
            Predicate::Equals { field, value } => {
                params.push((field.clone(), format!("eq.{}", value.as_string())));
            }
            Predicate::GreaterOrEqual { field, value } => {
                params.push((field.clone(), format!("gte.{}", value.as_string())));
            }
            Predicate::LessOrEqual { field, value } => {
                params.push((field.clone(), format!("lte.{}", value.as_string())));
            }
            Predicate::In { field, values } => {
                let items: Vec<String> = values.iter().map(|v| quote(&v.as_string())).collect();
                params.push((field.clone(), format!("in.({})", items.join(","))));
            }
            Predicate::Search { fields, term } => {
                let pattern = quote(&format!("*{}*", search_pattern(term)));
                let any: Vec<String> = fields
                    .iter()
                    .map(|field| format!("{field}.ilike.{pattern}"))
                    .collect();
                params.push(("or".to_string(), format!("({})", any.join(","))));
            }
        }
    }

    if !sorts.is_empty() {
        let order: Vec<String> = sorts
            .iter()
            .map(|s| {
                let dir = match s.direction {
                    SortDirection::Asc => "asc",
                    SortDirection::Desc => "desc",
                };
                format!("{}.{dir}", s.field)
            })
            .collect();
        params.push(("order".to_string(), order.join(",")));
    }

    params
}

/// Escape a search term for an `ilike` pattern.
///
/// The API rewrites every `*` to `%` and has no escape for it, so a
/// literal `*` becomes `_` and matches any single character. "4*4" also
/// matches "4x4", which the SQL and memory backends do not.
fn search_pattern(term: &str) -> String {
    escape_like_wildcards(term).replace('*', "_")
}

/// Double-quote a value when it contains characters reserved by the
/// logical-tree and list syntax.
fn quote(value: &str) -> String {
    let reserved = |c: char| matches!(c, ',' | '.' | ':' | '(' | ')' | '"' | '\\') || c.is_whitespace();
    if !value.chars().any(reserved) {
        return value.to_string();
    }
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Parse the total from a `Content-Range` value such as `0-19/45` or `*/45`.
///
/// Returns `None` when the total is unknown (`0-19/*`) or malformed.
pub(crate) fn parse_content_range(value: &str) -> Option<u64> {
    let (_, total) = value.trim().rsplit_once('/')?;
    total.trim().parse().ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Vec<&'a str> {
        params
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[test]
    fn range_predicates_become_operators() {
        let predicates = vec![
            Predicate::GreaterOrEqual {
                field: "price".to_string(),
                value: FilterValue::Integer(500),
            },
            Predicate::LessOrEqual {
                field: "price".to_string(),
                value: FilterValue::Integer(1000),
            },
        ];
        let params = query_params(&predicates, &[]);

        assert_eq!(param(&params, "select"), vec!["*"]);
        assert_eq!(param(&params, "price"), vec!["gte.500", "lte.1000"]);
        assert!(param(&params, "order").is_empty());
    }

    #[test]
    fn search_becomes_or_group() {
        let predicates = vec![
            Predicate::Search {
                fields: vec!["name".to_string(), "brand".to_string()],
                term: "jeep".to_string(),
            },
            Predicate::Equals {
                field: "category".to_string(),
                value: FilterValue::from("Suspension"),
            },
        ];
        let params = query_params(&predicates, &[]);

        assert_eq!(
            param(&params, "or"),
            vec!["(name.ilike.*jeep*,brand.ilike.*jeep*)"]
        );
        assert_eq!(param(&params, "category"), vec!["eq.Suspension"]);
    }

    #[test]
    fn reserved_characters_are_quoted() {
        let predicates = vec![Predicate::Search {
            fields: vec!["name".to_string()],
            term: "2.5in lift, 100%".to_string(),
        }];
        let params = query_params(&predicates, &[]);

        assert_eq!(
            param(&params, "or"),
            vec![r#"(name.ilike."*2.5in lift, 100\\%*")"#]
        );
    }

    #[test]
    fn asterisk_in_term_is_not_a_wildcard() {
        let predicates = vec![Predicate::Search {
            fields: vec!["name".to_string()],
            term: "4*4".to_string(),
        }];
        let params = query_params(&predicates, &[]);

        assert_eq!(param(&params, "or"), vec!["(name.ilike.*4_4*)"]);
    }

    #[test]
    fn in_list_quotes_items() {
        let predicates = vec![Predicate::In {
            field: "category".to_string(),
            values: vec![FilterValue::from("Armor"), FilterValue::from("Wheels, Tires")],
        }];
        let params = query_params(&predicates, &[]);
        assert_eq!(
            param(&params, "category"),
            vec![r#"in.(Armor,"Wheels, Tires")"#]
        );
    }

    #[test]
    fn sorts_become_order() {
        let sorts = vec![QuerySort::desc("published_at"), QuerySort::asc("id")];
        let params = query_params(&[], &sorts);
        assert_eq!(param(&params, "order"), vec!["published_at.desc,id.asc"]);
    }

    #[test]
    fn content_range_totals() {
        assert_eq!(parse_content_range("0-19/45"), Some(45));
        assert_eq!(parse_content_range("*/45"), Some(45));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-19/*"), None);
        assert_eq!(parse_content_range("garbage"), None);
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let source = RestDataSource::new("https://example.com/rest/v1", None).unwrap();
        let url = source.collection_url("vehicles").unwrap();
        assert_eq!(url.as_str(), "https://example.com/rest/v1/vehicles");

        assert!(RestDataSource::new("not a url", None).is_err());
    }

    #[test]
    fn api_key_sets_auth_headers() {
        let source =
            RestDataSource::new("https://example.com/rest/v1/", Some("anon-key".to_string()))
                .unwrap();
        let headers = source.auth_headers().unwrap();
        assert_eq!(headers.get("apikey").unwrap(), "anon-key");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer anon-key");
    }
}
