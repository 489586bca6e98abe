// src/sources/providers/ninja.rs
//! poe.ninja economy overviews. Prices are quoted in Divine Orbs; the
//! Currency overview carries the Exalted Orb line used as the divisor.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::{PipelineError, Result};
use crate::sources::segment_upper;
use crate::sources::types::{
    BaseValue, Category, Item, RawRecord, SelectedCategory, ThresholdKind, Thresholds,
};
use crate::sources::SourceAdapter;

pub const NAME: &str = "Poe.Ninja";
pub const REFERENCE_ID: &str = "exalted";
pub const TEMPLATE: &str = r#"[Type] == "{name}" # [StashItem] == "true" // ExValue = {value}"#;

const fn cat(name: &'static str, token: &'static str, required: bool) -> Category {
    Category {
        name,
        token,
        required,
    }
}

pub static CATEGORIES: &[Category] = &[
    cat("Currency", "Currency", true),
    cat("Fragments", "Fragments", false),
    cat("Abyss", "Abyss", false),
    cat("Uncut Gems", "UncutGems", false),
    cat("Lineage Support Gems", "LineageSupportGems", false),
    cat("Essences", "Essences", false),
    cat("Ultimatum", "Ultimatum", false),
    cat("Talismans", "Talismans", false),
    cat("Runes", "Runes", false),
    cat("Ritual", "Ritual", false),
    cat("Expedition", "Expedition", false),
    cat("Delirium", "Delirium", false),
    cat("Breach", "Breach", false),
];

#[derive(Debug, Deserialize)]
struct Overview {
    #[serde(default)]
    items: Vec<OverviewItem>,
    #[serde(default)]
    lines: Vec<Line>,
}

#[derive(Debug, Deserialize)]
struct OverviewItem {
    id: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Line {
    id: String,
    primary_value: f64,
}

#[derive(Debug, Clone)]
pub struct NinjaSource {
    base_url: String,
    league: String,
}

impl NinjaSource {
    pub fn new(base_url: impl Into<String>, league: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            league: league.into(),
        }
    }

    fn parse(&self, record: &RawRecord) -> Result<Overview> {
        Overview::deserialize(record).map_err(|e| PipelineError::parse(NAME, e))
    }
}

impl SourceAdapter for NinjaSource {
    fn name(&self) -> &'static str {
        NAME
    }

    fn template(&self) -> &'static str {
        TEMPLATE
    }

    fn registry(&self) -> &'static [Category] {
        CATEGORIES
    }

    fn endpoint_for(&self, category: &Category) -> String {
        format!(
            "{}/poe2/api/economy/temp2/overview?leagueName={}&overviewName={}",
            self.base_url,
            self.league.replace(' ', "+"),
            category.token
        )
    }

    fn extract_base_value(&self, record: &RawRecord) -> Result<Option<BaseValue>> {
        let overview = self.parse(record)?;
        Ok(overview
            .lines
            .iter()
            .find(|l| l.id == REFERENCE_ID)
            .and_then(|l| BaseValue::new(l.primary_value)))
    }

    fn reference_id(&self) -> &'static str {
        REFERENCE_ID
    }

    fn convert_items(&self, record: &RawRecord, base: BaseValue) -> Result<Vec<Item>> {
        let overview = self.parse(record)?;

        let names: HashMap<&str, &str> = overview
            .items
            .iter()
            .filter_map(|it| it.name.as_deref().map(|n| (it.id.as_str(), n)))
            .collect();

        Ok(overview
            .lines
            .iter()
            .map(|line| Item {
                id: line.id.clone(),
                display_name: names
                    .get(line.id.as_str())
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| line.id.clone()),
                item_type: None,
                value: base.convert(line.primary_value),
            })
            .collect())
    }

    fn section_name(&self, endpoint: &str) -> String {
        static RE_OVERVIEW: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"overviewName=([^&]+)").expect("overview regex"));
        RE_OVERVIEW
            .captures(endpoint)
            .and_then(|c| c.get(1))
            .map(|m| segment_upper(m.as_str()))
            .unwrap_or_else(|| "UNKNOWN SECTION".to_string())
    }

    /// The primary category (Currency, or whatever was fetched first) uses
    /// the currency threshold; everything else the generic one.
    fn threshold_for(&self, entry: &SelectedCategory, thresholds: &Thresholds) -> (f64, ThresholdKind) {
        if entry.primary || entry.required {
            (thresholds.currency, ThresholdKind::Currency)
        } else {
            (thresholds.generic, ThresholdKind::Generic)
        }
    }
}
