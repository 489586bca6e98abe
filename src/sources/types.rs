// src/sources/types.rs
use serde::Serialize;

/// Provider JSON payload for one category fetch.
pub type RawRecord = serde_json::Value;

/// Registry row: one selectable category of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub name: &'static str,
    /// Provider-side token used to build the endpoint (e.g. `UncutGems`, `accessory`).
    pub token: &'static str,
    pub required: bool,
}

/// Discovery view of a category, as exposed on `/categories`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CategoryInfo {
    pub id: String,
    pub name: String,
    pub endpoint: String,
    pub required: bool,
}

/// One entry of an active selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedCategory {
    pub name: String,
    pub endpoint: String,
    pub required: bool,
    /// Tagged on the first element only: the category the base value comes from.
    pub primary: bool,
}

/// Non-empty, ordered list of categories to fetch for one source run.
/// The first element is always tagged `primary`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySelection {
    entries: Vec<SelectedCategory>,
    /// Caller-supplied names that are not in the registry.
    pub unknown: Vec<String>,
}

impl CategorySelection {
    /// Build a selection from ordered `(category, endpoint)` pairs.
    /// Returns `None` when nothing would be fetched.
    pub fn from_ordered(picked: Vec<(Category, String)>, unknown: Vec<String>) -> Option<Self> {
        if picked.is_empty() {
            return None;
        }
        let entries = picked
            .into_iter()
            .enumerate()
            .map(|(i, (cat, endpoint))| SelectedCategory {
                name: cat.name.to_string(),
                endpoint,
                required: cat.required,
                primary: i == 0,
            })
            .collect();
        Some(Self { entries, unknown })
    }

    pub fn primary(&self) -> &SelectedCategory {
        &self.entries[0]
    }

    pub fn rest(&self) -> &[SelectedCategory] {
        &self.entries[1..]
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedCategory> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn endpoints(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.endpoint.as_str()).collect()
    }
}

/// Price of the reference unit in the provider's native unit.
/// Guaranteed finite and non-zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseValue(f64);

impl BaseValue {
    pub const ONE: BaseValue = BaseValue(1.0);

    pub fn new(v: f64) -> Option<Self> {
        if v.is_finite() && v != 0.0 {
            Some(Self(v))
        } else {
            None
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Convert a native-unit price into the reference unit.
    pub fn convert(self, native: f64) -> f64 {
        native / self.0
    }
}

impl std::fmt::Display for BaseValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalized item; `value` is always in the reference unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
    pub id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    pub value: f64,
}

/// Caller thresholds for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub generic: f64,
    pub currency: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            generic: 10.0,
            currency: 1.0,
        }
    }
}

/// Which threshold was applied to a category, for the run log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdKind {
    Generic,
    Currency,
}
