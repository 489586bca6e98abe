// src/static_rules.rs
//! Fixed rule blocks that need no price data. One numeric input (minimum
//! waystone tier) is substituted into categories that declare it.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::pipeline::format::section_header;

/// Declared numeric input of a static category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NumericInput {
    #[serde(rename = "input_type")]
    pub kind: &'static str,
    #[serde(rename = "input_min")]
    pub min: i64,
    #[serde(rename = "input_max")]
    pub max: i64,
    #[serde(rename = "input_default")]
    pub default: i64,
    #[serde(rename = "input_label")]
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct StaticCategory {
    pub name: &'static str,
    pub input: Option<NumericInput>,
    /// `(subcategory, rule template)` in display order.
    pub subcategories: &'static [(&'static str, &'static str)],
}

impl StaticCategory {
    fn rule(&self, subcategory: &str) -> Option<&'static str> {
        self.subcategories
            .iter()
            .find(|(name, _)| *name == subcategory)
            .map(|(_, tpl)| *tpl)
    }
}

const TIER_INPUT: NumericInput = NumericInput {
    kind: "number",
    min: 1,
    max: 16,
    default: 1,
    label: "Min Tier",
};

pub static CATEGORIES: &[StaticCategory] = &[
    StaticCategory {
        name: "Splinters",
        input: None,
        subcategories: &[
            (
                "Breach Splinter",
                r#"[Type] == "Breach Splinter" # [StashItem] == "true""#,
            ),
            (
                "Simulacrum Splinter",
                r#"[Type] == "Simulacrum Splinter" # [StashItem] == "true""#,
            ),
        ],
    },
    StaticCategory {
        name: "Waystones",
        input: Some(TIER_INPUT),
        subcategories: &[
            (
                "Normal Waystones",
                r#"[Category] == "Waystone" && [Rarity] == "Normal" && [WaystoneTier] >= "{tier}" # [StashItem] == "true""#,
            ),
            (
                "Magic Waystones",
                r#"[Category] == "Waystone" && [Rarity] == "Magic" && [WaystoneTier] >= "{tier}" # [StashItem] == "true""#,
            ),
            (
                "Rare Waystones",
                r#"[Category] == "Waystone" && [Rarity] == "Rare" && [WaystoneTier] >= "{tier}" # [StashItem] == "true""#,
            ),
        ],
    },
    StaticCategory {
        name: "Special Waystones",
        input: None,
        subcategories: &[
            (
                "An Audience with the King",
                r#"[Type] == "An Audience with the King" # [StashItem] == "true""#,
            ),
            (
                "Expedition Logbook",
                r#"[Type] == "Expedition Logbook" # [StashItem] == "true""#,
            ),
        ],
    },
    StaticCategory {
        name: "Tablets",
        input: None,
        subcategories: &[
            (
                "Precursor Tablet",
                r#"[Type] == "Precursor Tablet" # [StashItem] == "true""#,
            ),
            (
                "Breach Precursor Tablet",
                r#"[Type] == "Breach Precursor Tablet" # [StashItem] == "true""#,
            ),
            (
                "Expedition Precursor Tablet",
                r#"[Type] == "Expedition Precursor Tablet" # [StashItem] == "true""#,
            ),
            (
                "Delirium Precursor Tablet",
                r#"[Type] == "Delirium Precursor Tablet" # [StashItem] == "true""#,
            ),
            (
                "Ritual Precursor Tablet",
                r#"[Type] == "Ritual Precursor Tablet" # [StashItem] == "true""#,
            ),
            (
                "Overseer Precursor Tablet",
                r#"[Type] == "Overseer Precursor Tablet" # [StashItem] == "true""#,
            ),
        ],
    },
];

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SubcategoryInfo {
    pub id: String,
    pub name: String,
}

/// Discovery view of a static category.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StaticCategoryInfo {
    pub id: String,
    pub name: String,
    pub has_input: bool,
    #[serde(flatten)]
    pub input: Option<NumericInput>,
    pub subcategories: Vec<SubcategoryInfo>,
}

/// Rendered static block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticBlock {
    pub text: String,
    pub rules: usize,
    pub categories: usize,
}

impl StaticBlock {
    pub fn is_empty(&self) -> bool {
        self.categories == 0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StaticRules;

impl StaticRules {
    pub fn list_categories(&self) -> Vec<StaticCategoryInfo> {
        CATEGORIES
            .iter()
            .map(|c| StaticCategoryInfo {
                id: c.name.to_string(),
                name: c.name.to_string(),
                has_input: c.input.is_some(),
                input: c.input,
                subcategories: c
                    .subcategories
                    .iter()
                    .map(|(n, _)| SubcategoryInfo {
                        id: n.to_string(),
                        name: n.to_string(),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Render the selected rules. Categories come out in registry order,
    /// subcategories in caller order; unknown names are ignored. Every known
    /// category with a non-empty selection gets its header, even when none of
    /// the selected subcategories exist.
    pub fn generate(&self, selected: &BTreeMap<String, Vec<String>>, tier: i64) -> StaticBlock {
        let mut lines: Vec<String> = Vec::new();
        let mut block = StaticBlock::default();

        for category in CATEGORIES {
            let Some(picked) = selected.get(category.name).filter(|p| !p.is_empty()) else {
                continue;
            };
            let rules: Vec<String> = picked
                .iter()
                .filter_map(|sub| category.rule(sub))
                .map(|tpl| match category.input {
                    Some(_) => tpl.replace("{tier}", &tier.to_string()),
                    None => tpl.to_string(),
                })
                .collect();

            lines.push(section_header(&category.name.to_uppercase()));
            lines.push(String::new());
            block.rules += rules.len();
            block.categories += 1;
            lines.extend(rules);
            lines.push(String::new());
        }

        block.text = lines.join("\n");
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(pairs: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    #[test]
    fn waystone_tier_is_substituted_once() {
        let out = StaticRules.generate(&sel(&[("Waystones", &["Normal Waystones"])]), 5);
        assert_eq!(out.rules, 1);
        assert_eq!(out.categories, 1);

        let rule_lines: Vec<&str> = out.text.lines().filter(|l| l.starts_with('[')).collect();
        assert_eq!(rule_lines.len(), 1);
        assert!(rule_lines[0].contains(r#"[WaystoneTier] >= "5""#));
        assert!(!out.text.contains("{tier}"));

        let headers = out.text.lines().filter(|l| l.contains("WAYSTONES")).count();
        assert_eq!(headers, 1);
        assert!(out.text.starts_with(&section_header("WAYSTONES")));
    }

    #[test]
    fn tier_ignored_without_numeric_input() {
        let out = StaticRules.generate(&sel(&[("Tablets", &["Precursor Tablet"])]), 9);
        assert!(out.text.contains(r#"[Type] == "Precursor Tablet""#));
        assert!(!out.text.contains('9'));
    }

    #[test]
    fn unknown_names_produce_nothing() {
        let out = StaticRules.generate(&sel(&[("Nope", &["x"]), ("Tablets", &[])]), 1);
        assert!(out.is_empty());
        assert_eq!(out.text, "");
    }

    #[test]
    fn known_category_keeps_header_without_known_subcategories() {
        let out = StaticRules.generate(
            &sel(&[("Splinters", &["Not A Splinter"]), ("Tablets", &["Precursor Tablet"])]),
            1,
        );
        assert!(!out.is_empty());
        assert_eq!(out.categories, 2);
        assert_eq!(out.rules, 1);
        assert!(out.text.starts_with(&section_header("SPLINTERS")));
        assert!(out.text.contains(&section_header("TABLETS")));
        assert!(!out.text.contains("Not A Splinter"));
    }

    #[test]
    fn listing_exposes_input_metadata() {
        let cats = StaticRules.list_categories();
        let w = cats.iter().find(|c| c.id == "Waystones").unwrap();
        assert!(w.has_input);
        assert_eq!(w.input.unwrap().max, 16);
        assert_eq!(w.subcategories.len(), 3);

        let v = serde_json::to_value(w).unwrap();
        assert_eq!(v["input_label"], "Min Tier");
        assert_eq!(v["input_default"], 1);
    }
}
