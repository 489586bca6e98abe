// src/pipeline/log.rs
//! User-facing run log. Each stage returns its own `RunLog`; the orchestrator
//! stitches them together in run order.

use crate::pipeline::format::BOX_WIDTH;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunLog(Vec<String>);

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!(target: "pipeline", "{line}");
        self.0.push(line);
    }

    /// `=` rule as wide as a section header.
    pub fn rule(&mut self) {
        self.push("=".repeat(BOX_WIDTH));
    }

    /// Blank line, rule, title, rule.
    pub fn banner(&mut self, title: &str) {
        self.push(format!("\n{}", "=".repeat(BOX_WIDTH)));
        self.push(title);
        self.rule();
    }

    pub fn append(&mut self, other: RunLog) {
        self.0.extend(other.0);
    }

    pub fn lines(&self) -> &[String] {
        &self.0
    }

    pub fn into_lines(self) -> Vec<String> {
        self.0
    }
}
