// src/pipeline/filter.rs
use crate::sources::types::Item;

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub kept: Vec<Item>,
    pub dropped: usize,
}

/// Keep items with `value >= threshold` (inclusive), preserving order.
/// NaN values never pass.
pub fn retain_at_least(items: Vec<Item>, threshold: f64) -> FilterOutcome {
    let total = items.len();
    let kept: Vec<Item> = items.into_iter().filter(|it| it.value >= threshold).collect();
    FilterOutcome {
        dropped: total - kept.len(),
        kept,
    }
}
