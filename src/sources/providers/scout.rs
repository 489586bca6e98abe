// src/sources/providers/scout.rs
//! poe2scout unique listings. Prices are already quoted in Exalted Orbs
//! (`referenceCurrency=exalted`), so the divisor is the constant 1.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::{PipelineError, Result};
use crate::sources::segment_upper;
use crate::sources::types::{BaseValue, Category, Item, RawRecord};
use crate::sources::SourceAdapter;

pub const NAME: &str = "Scout";
pub const TEMPLATE: &str = r#"[Type] == "{type}" && [Rarity] == "Unique" # [UniqueName] == "{name}" && [StashItem] == "true" // ExValue = {value}"#;

const fn cat(name: &'static str, token: &'static str) -> Category {
    Category {
        name,
        token,
        required: false,
    }
}

pub static CATEGORIES: &[Category] = &[
    cat("Accessories", "accessory"),
    cat("Armour", "armour"),
    cat("Jewels", "jewel"),
    cat("Maps", "map"),
    cat("Weapons", "weapon"),
    cat("Sanctum", "sanctum"),
];

#[derive(Debug, Deserialize)]
struct Listing {
    #[serde(default)]
    items: Vec<ListingItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListingItem {
    #[serde(default)]
    id: serde_json::Value,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    current_price: Option<f64>,
}

fn id_string(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct ScoutSource {
    base_url: String,
    league: String,
    per_page: u32,
}

impl ScoutSource {
    pub fn new(base_url: impl Into<String>, league: impl Into<String>, per_page: u32) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            league: league.into(),
            per_page,
        }
    }
}

impl SourceAdapter for ScoutSource {
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
            "{}/api/items/unique/{}?page=1&perPage={}&league={}&search=&referenceCurrency=exalted",
            self.base_url,
            category.token,
            self.per_page,
            self.league.replace(' ', "%20")
        )
    }

    fn extract_base_value(&self, _record: &RawRecord) -> Result<Option<BaseValue>> {
        Ok(Some(BaseValue::ONE))
    }

    fn reference_id(&self) -> &'static str {
        "exalted"
    }

    fn convert_items(&self, record: &RawRecord, base: BaseValue) -> Result<Vec<Item>> {
        let listing = Listing::deserialize(record).map_err(|e| PipelineError::parse(NAME, e))?;

        Ok(listing
            .items
            .iter()
            .map(|it| {
                let id = id_string(&it.id);
                let display_name = non_empty(&it.name)
                    .or_else(|| non_empty(&it.text))
                    .map(str::to_string)
                    .unwrap_or_else(|| id.clone());
                Item {
                    display_name,
                    item_type: Some(non_empty(&it.kind).unwrap_or("Unknown").to_string()),
                    value: base.convert(it.current_price.unwrap_or(0.0)),
                    id,
                }
            })
            .collect())
    }

    fn section_name(&self, endpoint: &str) -> String {
        static RE_UNIQUE: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"/unique/([^?/]+)").expect("unique regex"));
        RE_UNIQUE
            .captures(endpoint)
            .and_then(|c| c.get(1))
            .map(|m| format!("UNIQUE {}", segment_upper(m.as_str())))
            .unwrap_or_else(|| "UNIQUE ITEMS".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::types::{ThresholdKind, Thresholds};
    use serde_json::json;

    fn src() -> ScoutSource {
        ScoutSource::new("https://poe2scout.com", "Rise of the Abyssal", 250)
    }

    #[test]
    fn endpoint_and_section_name() {
        let s = src();
        let ep = s.endpoint_for(&CATEGORIES[0]);
        assert_eq!(
            ep,
            "https://poe2scout.com/api/items/unique/accessory?page=1&perPage=250&league=Rise%20of%20the%20Abyssal&search=&referenceCurrency=exalted"
        );
        assert_eq!(s.section_name(&ep), "UNIQUE ACCESSORY");
    }

    #[test]
    fn base_value_is_constant_one() {
        let b = src().extract_base_value(&json!({})).unwrap();
        assert_eq!(b, Some(BaseValue::ONE));
    }

    #[test]
    fn no_required_category_and_generic_threshold_everywhere() {
        let s = src();
        let sel = s
            .select_active(&["Jewels".to_string(), "Armour".to_string()])
            .unwrap();
        assert_eq!(sel.primary().name, "Jewels");
        let t = Thresholds {
            generic: 10.0,
            currency: 1.0,
        };
        for e in sel.iter() {
            assert_eq!(s.threshold_for(e, &t), (10.0, ThresholdKind::Generic));
        }
    }

    #[test]
    fn name_fallbacks_and_type_formatting() {
        let rec = json!({"items": [
            {"id": 7, "name": "Headhunter", "type": "Leather Belt", "currentPrice": 42.5},
            {"id": 8, "name": "", "text": "Some Text", "currentPrice": 11.0},
            {"id": 9}
        ]});
        let items = src().convert_items(&rec, BaseValue::ONE).unwrap();
        assert_eq!(items[0].id, "7");
        assert_eq!(items[1].display_name, "Some Text");
        assert_eq!(items[1].item_type.as_deref(), Some("Unknown"));
        assert_eq!(items[2].display_name, "9");
        assert_eq!(items[2].value, 0.0);

        assert_eq!(
            src().format_line(&items[0]),
            r#"[Type] == "Leather Belt" && [Rarity] == "Unique" # [UniqueName] == "Headhunter" && [StashItem] == "true" // ExValue = 42.50"#
        );
    }

    #[test]
    fn listing_without_id_does_not_sink_the_category() {
        let rec = json!({"items": [
            {"id": 1, "name": "Keeper", "type": "Gold Ring", "currentPrice": 30.0},
            {"name": "NoId", "type": "Ring", "currentPrice": 60.0},
            {"id": null, "text": "Null Id", "currentPrice": 5.0}
        ]});
        let items = src().convert_items(&rec, BaseValue::ONE).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].id, "");
        assert_eq!(items[1].display_name, "NoId");
        assert_eq!(items[1].value, 60.0);
        assert_eq!(items[2].id, "");
        assert_eq!(items[2].display_name, "Null Id");
    }
}
