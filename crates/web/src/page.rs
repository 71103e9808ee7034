//! Server-rendered search page

use crate::error::Result;
use chrono::{Datelike, Utc};
use handlebars::Handlebars;
use recall_radar_core::config::ConfigSchema;
use recall_radar_search::{ClassificationState, RecallRecord};
use serde::Serialize;

const PAGE_TEMPLATE: &str = include_str!("../templates/page.hbs");
const PAGE: &str = "page";

/// Input placeholder
pub const PLACEHOLDER: &str = "e.g. ToyWorld Teddy or SafeSeat";

/// Shown while no query is entered
pub const IDLE_HINT: &str = "Enter a product name to check its safety status.";

/// Shown when the search backend fails
pub const UNAVAILABLE_NOTICE: &str = "Search is temporarily unavailable. Please try again shortly.";

/// Badge text including its icon; empty for IDLE
pub fn badge_text(state: ClassificationState) -> String {
    match state {
        ClassificationState::Idle => String::new(),
        ClassificationState::Red | ClassificationState::Orange => {
            format!("⚠️ {}", state.label())
        }
        ClassificationState::Green => format!("✅ {}", state.label()),
    }
}

/// One result card
#[derive(Debug, Serialize)]
pub struct CardView {
    pub product_name: String,
    pub risk_level: String,
    pub serious: bool,
    pub brand_model: String,
    pub source: String,
    pub description: String,
    pub batch_number: Option<String>,
}

impl From<&RecallRecord> for CardView {
    fn from(record: &RecallRecord) -> Self {
        Self {
            product_name: record.product_name.clone(),
            risk_level: record.risk_level.to_string(),
            serious: record.risk_level.is_serious(),
            brand_model: record.brand_model(),
            source: record.source.clone(),
            description: record.description.clone(),
            batch_number: record.batch_number.clone(),
        }
    }
}

/// Everything the template needs
#[derive(Debug, Serialize)]
pub struct PageView {
    pub site_title: String,
    pub query: String,
    pub state: &'static str,
    pub state_class: &'static str,
    pub badge: String,
    pub is_idle: bool,
    pub is_green: bool,
    pub show_hint: bool,
    pub cards: Vec<CardView>,
    pub notice: Option<&'static str>,
    pub placeholder: &'static str,
    pub idle_hint: &'static str,
    pub data_sources: String,
    pub year: i32,
    pub debounce_ms: u64,
    pub max_query_length: usize,
}

impl PageView {
    /// View of a classified query
    pub fn new(
        config: &ConfigSchema,
        query: &str,
        state: ClassificationState,
        hits: &[RecallRecord],
    ) -> Self {
        Self {
            site_title: config.ui.site_title.clone(),
            query: query.to_string(),
            state: state.as_str(),
            state_class: state.css_class(),
            badge: badge_text(state),
            is_idle: state == ClassificationState::Idle,
            is_green: state == ClassificationState::Green,
            show_hint: state == ClassificationState::Idle,
            cards: hits.iter().map(CardView::from).collect(),
            notice: None,
            placeholder: PLACEHOLDER,
            idle_hint: IDLE_HINT,
            data_sources: config.ui.data_sources.join(", "),
            year: Utc::now().year(),
            debounce_ms: config.ui.debounce_ms,
            max_query_length: config.search.max_query_length,
        }
    }

    /// IDLE view with the unavailable notice
    pub fn unavailable(config: &ConfigSchema, query: &str) -> Self {
        Self {
            notice: Some(UNAVAILABLE_NOTICE),
            show_hint: false,
            ..Self::new(config, query, ClassificationState::Idle, &[])
        }
    }
}

/// Renders the page template
pub struct PageRenderer {
    registry: Handlebars<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.register_template_string(PAGE, PAGE_TEMPLATE)?;
        Ok(Self { registry })
    }

    pub fn render(&self, view: &PageView) -> Result<String> {
        Ok(self.registry.render(PAGE, view)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(query: &str, state: ClassificationState, hits: &[RecallRecord]) -> String {
        let config = ConfigSchema::default();
        PageRenderer::new()
            .unwrap()
            .render(&PageView::new(&config, query, state, hits))
            .unwrap()
    }

    #[test]
    fn test_idle_page() {
        let html = render("", ClassificationState::Idle, &[]);
        assert!(html.contains("<span class=\"brand\">Recall Radar</span>"));
        assert!(html.contains(PLACEHOLDER));
        assert!(html.contains(&format!("id=\"idle-hint\" class=\"hint\">{IDLE_HINT}")));
        assert!(html.contains("id=\"no-recall\" class=\"panel\" hidden"));
        assert!(html.contains("data-state=\"IDLE\" role=\"status\" hidden"));
        assert!(html.contains("Data sources: RAPEX (EU), DGCCRF (FR)"));
        assert!(html.contains(&Utc::now().year().to_string()));
    }

    #[test]
    fn test_red_page_renders_cards() {
        let hit = RecallRecord::new("1", "Teddy Bear")
            .with_brand_model("ToyWorld", "Classic")
            .with_risk_level("Serious")
            .with_source("RAPEX")
            .with_description("Eyes can detach; choking hazard.")
            .with_batch_number("TW-2231")
            .with_typos(0);
        let html = render("ToyWorld Teddy", ClassificationState::Red, &[hit]);

        assert!(html.contains("⚠️ Product Recalled"));
        assert!(html.contains("Eyes can detach; choking hazard."));
        assert!(html.contains("ToyWorld Classic"));
        assert!(html.contains("Serious Risk"));
        assert!(html.contains("TW-2231"));
        assert!(html.contains("value=\"ToyWorld Teddy\""));
        assert!(html.contains("id=\"idle-hint\" class=\"hint\" hidden"));
        assert!(html.contains("<article class=\"card\">"));
    }

    #[test]
    fn test_green_page_shows_disclaimer_not_results() {
        let html = render("zzz-nonexistent-zzz", ClassificationState::Green, &[]);
        assert!(html.contains("✅ No recall found"));
        assert!(html.contains("id=\"no-recall\" class=\"panel\">"));
        assert!(html.contains("We could not find any official recall notices"));
        assert!(html.contains("Disclaimer: Based on official recall databases"));
        assert!(!html.contains("<article class=\"card\">"));
    }

    #[test]
    fn test_query_is_escaped() {
        let html = render("<script>alert(1)</script>", ClassificationState::Green, &[]);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_unavailable_notice() {
        let config = ConfigSchema::default();
        let html = PageRenderer::new()
            .unwrap()
            .render(&PageView::unavailable(&config, "teddy"))
            .unwrap();
        assert!(html.contains(&format!("id=\"notice\" class=\"notice\">{UNAVAILABLE_NOTICE}")));
        assert!(html.contains("id=\"idle-hint\" class=\"hint\" hidden"));
        assert!(html.contains("data-state=\"IDLE\""));
    }

    #[test]
    fn test_badge_text() {
        assert_eq!(badge_text(ClassificationState::Idle), "");
        assert_eq!(badge_text(ClassificationState::Red), "⚠️ Product Recalled");
        assert_eq!(
            badge_text(ClassificationState::Orange),
            "⚠️ Possible recall match — verify brand/model details"
        );
    }
}
