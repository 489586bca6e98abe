// src/sources/mod.rs
//! Price sources: the adapter contract every provider implements, plus the
//! transport used to reach them.

pub mod fetch;
pub mod providers;
pub mod types;

use std::collections::HashSet;

use crate::error::Result;
use crate::pipeline::filter::{self, FilterOutcome};
use crate::pipeline::format;
use crate::sources::types::{
    BaseValue, Category, CategoryInfo, CategorySelection, Item, RawRecord, SelectedCategory,
    ThresholdKind, Thresholds,
};

pub use fetch::{Fetcher, FixtureFetcher, HttpFetcher};
pub use providers::{ninja::NinjaSource, scout::ScoutSource};

/// Uniform capability set of a price provider.
///
/// Adapters are immutable once built; the active selection is a value passed
/// around per run, so one adapter can serve concurrent requests.
pub trait SourceAdapter: Send + Sync {
    /// Display name used in logs ("Poe.Ninja", "Scout").
    fn name(&self) -> &'static str;

    /// Output line template with `{name}`, `{value}` and optionally `{type}`.
    fn template(&self) -> &'static str;

    /// Static category table, in display order.
    fn registry(&self) -> &'static [Category];

    fn endpoint_for(&self, category: &Category) -> String;

    /// Pull the conversion divisor out of the first category's payload.
    /// `Ok(None)` means the reference record is absent (or zero).
    fn extract_base_value(&self, record: &RawRecord) -> Result<Option<BaseValue>>;

    /// Id of the distinguished reference record, for error messages.
    fn reference_id(&self) -> &'static str;

    /// Convert every record to the reference unit, unfiltered, in payload order.
    fn convert_items(&self, record: &RawRecord, base: BaseValue) -> Result<Vec<Item>>;

    fn section_name(&self, endpoint: &str) -> String;

    fn list_categories(&self) -> Vec<CategoryInfo> {
        self.registry()
            .iter()
            .map(|c| CategoryInfo {
                id: c.name.to_string(),
                name: c.name.to_string(),
                endpoint: self.endpoint_for(c),
                required: c.required,
            })
            .collect()
    }

    /// Required category first (deduplicated), then caller names in caller order.
    fn select_active(&self, names: &[String]) -> Option<CategorySelection> {
        let registry = self.registry();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut picked = Vec::with_capacity(names.len() + 1);
        let mut unknown = Vec::new();

        if let Some(req) = registry.iter().find(|c| c.required) {
            seen.insert(req.name);
            picked.push((*req, self.endpoint_for(req)));
        }

        for n in names {
            match registry.iter().find(|c| c.name == n.as_str()) {
                Some(c) => {
                    if seen.insert(c.name) {
                        picked.push((*c, self.endpoint_for(c)));
                    }
                }
                None => unknown.push(n.clone()),
            }
        }

        CategorySelection::from_ordered(picked, unknown)
    }

    /// Threshold applied to one category of this source. Generic by default.
    fn threshold_for(&self, _entry: &SelectedCategory, thresholds: &Thresholds) -> (f64, ThresholdKind) {
        (thresholds.generic, ThresholdKind::Generic)
    }

    /// Convert and keep items at or above `min_threshold` (inclusive).
    fn compute_item_values(
        &self,
        record: &RawRecord,
        base: BaseValue,
        min_threshold: f64,
    ) -> Result<FilterOutcome> {
        let items = self.convert_items(record, base)?;
        Ok(filter::retain_at_least(items, min_threshold))
    }

    fn format_line(&self, item: &Item) -> String {
        format::render_template(self.template(), item)
    }
}

/// `UncutGems` → `UNCUT GEMS`: a space before each internal upper-case
/// letter, then upper-case everything.
pub fn segment_upper(token: &str) -> String {
    let mut out = String::with_capacity(token.len() + 4);
    for (i, ch) in token.trim().chars().enumerate() {
        if i > 0 && ch.is_uppercase() {
            out.push(' ');
        }
        out.push(ch);
    }
    out.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_upper_splits_camel_case() {
        assert_eq!(segment_upper("UncutGems"), "UNCUT GEMS");
        assert_eq!(segment_upper("LineageSupportGems"), "LINEAGE SUPPORT GEMS");
        assert_eq!(segment_upper("Currency"), "CURRENCY");
        assert_eq!(segment_upper("accessory"), "ACCESSORY");
    }
}
