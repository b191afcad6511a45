//! Result rendering.
//!
//! Maps listing rows to presentational cards and lays them out as plain
//! text for the terminal browser.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::listing::{ListResult, ViewStatus};
use crate::models::EntityKind;

/// Text shown when a query succeeded but matched nothing.
pub const DEFAULT_EMPTY_TEXT: &str = "No results found. Try adjusting your filters.";

/// Presentational summary of one row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub title: String,
    pub subtitle: Option<String>,
    pub badge: Option<String>,
    pub price: Option<f64>,
    /// Site path for the detail page.
    pub href: String,
}

/// How cards are laid out.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Grid,
    List,
}

impl std::str::FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grid" => Ok(DisplayMode::Grid),
            "list" => Ok(DisplayMode::List),
            other => Err(format!("unknown display mode '{other}' (expected grid or list)")),
        }
    }
}

/// Cards per row in grid mode.
const GRID_COLUMNS: usize = 3;
const GRID_CELL_WIDTH: usize = 28;

/// Build cards for every row in a result.
///
/// Rows that do not decode as the listing's entity are skipped with a
/// warning rather than failing the whole page.
pub fn cards(kind: EntityKind, result: &ListResult) -> Vec<Card> {
    result
        .items
        .iter()
        .filter_map(|row| match kind.card_from_row(row) {
            Ok(card) => Some(card),
            Err(e) => {
                warn!(entity = kind.as_str(), error = %e, "skipping undecodable row");
                None
            }
        })
        .collect()
}

/// Render a loaded page of results.
pub fn render_page(
    kind: EntityKind,
    result: &ListResult,
    mode: DisplayMode,
    empty_text: Option<&str>,
) -> String {
    if result.is_empty() {
        return empty_text.unwrap_or(DEFAULT_EMPTY_TEXT).to_string();
    }
    if result.is_past_end() {
        return past_end_text(result);
    }

    let cards = cards(kind, result);
    let mut out = match mode {
        DisplayMode::Grid => render_grid(&cards),
        DisplayMode::List => render_list(&cards),
    };

    let _ = write!(
        out,
        "\nPage {} of {} ({} total)",
        result.page, result.total_pages, result.total
    );
    out
}

/// Render whatever state a list view is in.
pub fn render_status(
    kind: EntityKind,
    status: &ViewStatus,
    mode: DisplayMode,
    empty_text: Option<&str>,
) -> String {
    match status {
        ViewStatus::Idle => String::new(),
        ViewStatus::Loading => "Loading...".to_string(),
        ViewStatus::Loaded(result) => render_page(kind, result, mode, empty_text),
        ViewStatus::Failed(message) => format!("Could not load results: {message}"),
    }
}

/// Text for a page number beyond the last page of a non-empty result.
pub fn past_end_text(result: &ListResult) -> String {
    format!(
        "Page {} is past the last page ({}). {} results in total.",
        result.page, result.total_pages, result.total
    )
}

fn render_list(cards: &[Card]) -> String {
    let mut out = String::new();
    for card in cards {
        let _ = write!(out, "- {}", card.title);
        if let Some(ref subtitle) = card.subtitle {
            let _ = write!(out, " ({subtitle})");
        }
        if let Some(ref badge) = card.badge {
            let _ = write!(out, " [{badge}]");
        }
        if let Some(price) = card.price {
            let _ = write!(out, " {}", format_price(price));
        }
        let _ = writeln!(out, "  {}", card.href);
    }
    out
}

fn render_grid(cards: &[Card]) -> String {
    let mut out = String::new();
    for row in cards.chunks(GRID_COLUMNS) {
        let lines: [Vec<String>; 3] = [
            row.iter().map(|c| c.title.clone()).collect(),
            row.iter()
                .map(|c| c.subtitle.clone().unwrap_or_default())
                .collect(),
            row.iter()
                .map(|c| {
                    let badge = c.badge.as_deref().unwrap_or("");
                    match c.price {
                        Some(price) => format!("{badge} {}", format_price(price)),
                        None => badge.to_string(),
                    }
                })
                .collect(),
        ];
        for line in lines {
            let cells: Vec<String> = line
                .iter()
                .map(|cell| format!("{:<width$}", truncate(cell, GRID_CELL_WIDTH), width = GRID_CELL_WIDTH))
                .collect();
            let _ = writeln!(out, "{}", cells.join(" | ").trim_end());
        }
        out.push('\n');
    }
    out
}

fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("${price:.0}")
    } else {
        format!("${price:.2}")
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parts_page() -> ListResult {
        ListResult::new(
            vec![
                json!({"slug": "lift", "name": "Lift Kit", "brand": "Rough Country", "category": "Suspension", "price": 499}),
                json!({"slug": "bar", "name": "Light Bar", "brand": "Baja", "category": "Lighting", "price": 249.99}),
            ],
            2,
            1,
            20,
        )
    }

    #[test]
    fn empty_result_uses_empty_text() {
        let result = ListResult::empty(1, 20);
        let out = render_page(EntityKind::Product, &result, DisplayMode::List, None);
        assert_eq!(out, DEFAULT_EMPTY_TEXT);

        let custom = render_page(
            EntityKind::Product,
            &result,
            DisplayMode::Grid,
            Some("No parts yet."),
        );
        assert_eq!(custom, "No parts yet.");
    }

    #[test]
    fn page_past_end_is_not_reported_as_no_results() {
        let result = ListResult::new(vec![], 45, 9, 20);
        let out = render_page(EntityKind::Product, &result, DisplayMode::List, None);
        assert_ne!(out, DEFAULT_EMPTY_TEXT);
        assert_eq!(out, "Page 9 is past the last page (3). 45 results in total.");
    }

    #[test]
    fn list_mode_renders_one_line_per_card() {
        let out = render_page(EntityKind::Product, &parts_page(), DisplayMode::List, None);
        assert!(out.contains("- Lift Kit (Rough Country) [Suspension] $499  /parts/lift"));
        assert!(out.contains("$249.99"));
        assert!(out.contains("Page 1 of 1 (2 total)"));
    }

    #[test]
    fn grid_mode_places_cards_side_by_side() {
        let out = render_page(EntityKind::Product, &parts_page(), DisplayMode::Grid, None);
        let first_line = out.lines().next().unwrap();
        assert!(first_line.contains("Lift Kit"));
        assert!(first_line.contains("Light Bar"));
    }

    #[test]
    fn failure_is_not_rendered_as_empty() {
        let out = render_status(
            EntityKind::Trail,
            &ViewStatus::Failed("backend unavailable".to_string()),
            DisplayMode::List,
            None,
        );
        assert!(out.starts_with("Could not load results"));
        assert_ne!(out, DEFAULT_EMPTY_TEXT);
    }

    #[test]
    fn display_mode_parses() {
        assert_eq!("GRID".parse::<DisplayMode>().unwrap(), DisplayMode::Grid);
        assert_eq!("list".parse::<DisplayMode>().unwrap(), DisplayMode::List);
        assert!("table".parse::<DisplayMode>().is_err());
    }

    #[test]
    fn truncate_long_titles() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 5), "abcd…");
    }
}
