// src/pipeline/format.rs
//! Rendering: template substitution, bordered section headers and the final
//! document layout.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;

use crate::sources::types::Item;

pub const BOX_WIDTH: usize = 85;

/// Five-line `//` box with the label centered. Left pad is `floor(pad / 2)`,
/// the odd column (if any) goes to the right.
pub fn section_header(label: &str) -> String {
    let interior = BOX_WIDTH - 4;
    let border = "/".repeat(BOX_WIDTH);
    let blank = format!("//{}//", " ".repeat(interior));

    let padding = interior.saturating_sub(label.chars().count());
    let left = padding / 2;
    let right = padding - left;

    [
        border.clone(),
        blank.clone(),
        format!("//{}{}{}//", " ".repeat(left), label, " ".repeat(right)),
        blank,
        border,
    ]
    .join("\n")
}

/// Substitute `{name}`, `{value}` (two decimals) and `{type}` in one pass.
/// `{type}` is only filled for items that carry a type; otherwise the
/// placeholder is left untouched.
pub fn render_template(template: &str, item: &Item) -> String {
    static RE_PLACEHOLDER: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\{(name|value|type)\}").expect("placeholder regex"));

    RE_PLACEHOLDER
        .replace_all(template, |caps: &Captures| match &caps[1] {
            "name" => item.display_name.clone(),
            "value" => format!("{:.2}", item.value),
            _ => match &item.item_type {
                Some(t) => t.clone(),
                None => caps[0].to_string(),
            },
        })
        .into_owned()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedItem {
    #[serde(flatten)]
    pub item: Item,
    pub line: String,
}

/// One fetched category, rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub name: String,
    pub source: &'static str,
    pub items: Vec<FormattedItem>,
}

impl Section {
    /// Header, blank line, item lines, blank line.
    pub fn render_lines(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.items.len() + 3);
        out.push(section_header(&self.name));
        out.push(String::new());
        out.extend(self.items.iter().map(|fi| fi.line.clone()));
        out.push(String::new());
        out
    }
}

/// All dynamic sections in run order plus the optional static block.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    pub sections: Vec<Section>,
    pub static_block: Option<String>,
}

impl Document {
    pub fn total_items(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.static_block.is_none()
    }

    pub fn render(&self) -> String {
        let mut lines: Vec<String> = self.sections.iter().flat_map(Section::render_lines).collect();
        if let Some(block) = &self.static_block {
            lines.push(block.clone());
        }
        lines.join("\n")
    }
}
