// src/pipeline/mod.rs
//! Orchestrator: runs every requested source in order, appends the static
//! block, and assembles the final document and run log.

pub mod filter;
pub mod format;
pub mod log;
pub mod normalize;

use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::settings::{Defaults, Settings};
use crate::error::{PipelineError, RunFailure};
use crate::pipeline::format::Document;
use crate::pipeline::log::RunLog;
use crate::pipeline::normalize::process_source;
use crate::sources::fetch::Fetcher;
use crate::sources::types::{CategoryInfo, Thresholds};
use crate::sources::{NinjaSource, ScoutSource, SourceAdapter};
use crate::static_rules::{StaticCategoryInfo, StaticRules};

pub const NINJA_KEY: &str = "ninja";
pub const SCOUT_KEY: &str = "scout";

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("pickit_fetch_total", "Endpoint fetches attempted.");
        describe_counter!("pickit_fetch_errors_total", "Fetches that failed.");
        describe_histogram!("pickit_fetch_ms", "Successful fetch time in milliseconds.");
        describe_counter!("pickit_items_kept_total", "Items at or above threshold.");
        describe_counter!("pickit_items_filtered_total", "Items below threshold.");
        describe_counter!("pickit_sections_total", "Sections rendered.");
        describe_counter!("pickit_runs_total", "Pipeline runs.");
        describe_counter!("pickit_run_failures_total", "Runs that failed as a whole.");
    });
}

/// Threshold as posted: a JSON number, or a string holding one (form inputs).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ThresholdInput {
    Number(f64),
    Text(String),
}

impl From<f64> for ThresholdInput {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for ThresholdInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Inbound request as posted by the UI / CLI. Missing fields take the
/// configured defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProcessRequest {
    #[serde(default)]
    pub min_value: Option<ThresholdInput>,
    #[serde(default)]
    pub min_value_currency: Option<ThresholdInput>,
    #[serde(default)]
    pub ninja_categories: Vec<String>,
    #[serde(default)]
    pub scout_categories: Vec<String>,
    #[serde(default)]
    pub static_categories: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub waystone_tier: Option<i64>,
}

impl ProcessRequest {
    /// Apply defaults and validate thresholds (numeric, finite, non-negative).
    pub fn resolve(&self, defaults: &Defaults) -> Result<RunOptions, PipelineError> {
        let generic = check_threshold("min_value", self.min_value.as_ref(), defaults.min_value)?;
        let currency = check_threshold(
            "min_value_currency",
            self.min_value_currency.as_ref(),
            defaults.min_value_currency,
        )?;

        Ok(RunOptions {
            thresholds: Thresholds { generic, currency },
            source_categories: vec![
                (NINJA_KEY.to_string(), self.ninja_categories.clone()),
                (SCOUT_KEY.to_string(), self.scout_categories.clone()),
            ],
            static_categories: self.static_categories.clone(),
            waystone_tier: self.waystone_tier.unwrap_or(defaults.waystone_tier),
        })
    }
}

fn check_threshold(
    field: &'static str,
    input: Option<&ThresholdInput>,
    default: f64,
) -> Result<f64, PipelineError> {
    let invalid = |raw: String| PipelineError::InvalidThreshold { field, value: raw };

    let value = match input {
        None => default,
        Some(ThresholdInput::Number(v)) => *v,
        // Blank form field means "not given".
        Some(ThresholdInput::Text(s)) if s.trim().is_empty() => default,
        Some(ThresholdInput::Text(s)) => s.trim().parse::<f64>().map_err(|_| invalid(s.clone()))?,
    };

    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(invalid(value.to_string()))
    }
}

/// Fully resolved options for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub thresholds: Thresholds,
    /// `(source key, caller category names)` in the order sources should run.
    pub source_categories: Vec<(String, Vec<String>)>,
    pub static_categories: BTreeMap<String, Vec<String>>,
    pub waystone_tier: i64,
}

impl RunOptions {
    /// True when no source and no static category was asked for.
    pub fn is_empty(&self) -> bool {
        self.source_categories.iter().all(|(_, names)| names.is_empty())
            && self.static_categories.values().all(|v| v.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct ProcessedOutput {
    pub document: Document,
    pub result: String,
    pub logs: Vec<String>,
    pub total_items: usize,
    pub generated_at: DateTime<Utc>,
}

/// Category listing for discovery.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryListing {
    pub ninja: Vec<CategoryInfo>,
    pub scout: Vec<CategoryInfo>,
    #[serde(rename = "static")]
    pub static_rules: Vec<StaticCategoryInfo>,
}

struct RegisteredSource {
    key: &'static str,
    adapter: Box<dyn SourceAdapter>,
}

pub struct Pipeline {
    sources: Vec<RegisteredSource>,
    statics: StaticRules,
    fetcher: Arc<dyn Fetcher>,
    defaults: Defaults,
}

impl Pipeline {
    pub fn new(settings: &Settings, fetcher: Arc<dyn Fetcher>) -> Self {
        let ninja = NinjaSource::new(&settings.ninja_base_url, &settings.league);
        let scout = ScoutSource::new(&settings.scout_base_url, &settings.league, settings.scout_per_page);
        Self {
            sources: vec![
                RegisteredSource {
                    key: NINJA_KEY,
                    adapter: Box::new(ninja),
                },
                RegisteredSource {
                    key: SCOUT_KEY,
                    adapter: Box::new(scout),
                },
            ],
            statics: StaticRules,
            fetcher,
            defaults: settings.defaults.clone(),
        }
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    fn adapter(&self, key: &str) -> Option<&dyn SourceAdapter> {
        self.sources
            .iter()
            .find(|s| s.key == key)
            .map(|s| s.adapter.as_ref())
    }

    pub fn categories(&self) -> CategoryListing {
        let list = |key| self.adapter(key).map(|a| a.list_categories()).unwrap_or_default();
        CategoryListing {
            ninja: list(NINJA_KEY),
            scout: list(SCOUT_KEY),
            static_rules: self.statics.list_categories(),
        }
    }

    pub async fn run(&self, opts: &RunOptions) -> Result<ProcessedOutput, RunFailure> {
        ensure_metrics_described();
        counter!("pickit_runs_total").increment(1);

        let mut log = RunLog::new();
        log.push("Currency Exchange Rates (in Exalted Orbs)");
        log.rule();
        log.push("");

        let mut document = Document::default();
        let mut failures: Vec<String> = Vec::new();

        // (1) Dynamic sources, strictly one after another.
        for (key, names) in &opts.source_categories {
            if names.is_empty() {
                continue;
            }
            let Some(adapter) = self.adapter(key) else {
                log.push(format!("⚠ Unknown source '{key}', skipping..."));
                continue;
            };
            let Some(selection) = adapter.select_active(names) else {
                log.push(format!(
                    "⚠ No categories configured for {}, skipping...",
                    adapter.name()
                ));
                continue;
            };
            if !selection.unknown.is_empty() {
                log.push(format!(
                    "⚠ Ignoring unknown {} categories: {}",
                    adapter.name(),
                    selection.unknown.join(", ")
                ));
            }

            let report =
                process_source(adapter, &selection, &opts.thresholds, self.fetcher.as_ref()).await;
            log.append(report.log);
            if let Some(err) = report.failure {
                log.push(format!("✗ Error processing {} categories: {err}", adapter.name()));
                failures.push(err.to_string());
            }
            document.sections.extend(report.sections);
        }

        // (2) Static block.
        if !opts.static_categories.is_empty() {
            log.banner("Processing static filter rules...");
            log.push("");
            let block = self.statics.generate(&opts.static_categories, opts.waystone_tier);
            log.push(format!(
                "✓ Generated {} static filter rules from {} categories",
                block.rules, block.categories
            ));
            if !block.is_empty() {
                document.static_block = Some(block.text);
            }
        }

        // (3) Escalate only when nothing at all came out.
        if !failures.is_empty() && document.is_empty() {
            counter!("pickit_run_failures_total").increment(1);
            tracing::error!(target: "pipeline", failures = failures.len(), "run produced no output");
            return Err(RunFailure {
                message: failures.join("; "),
                logs: log.into_lines(),
            });
        }

        log.banner("Generating final output...");
        log.push("");
        let total_items = document.total_items();
        log.push(format!("✓ Success! Total items processed: {total_items}"));
        log.rule();

        tracing::info!(
            target: "pipeline",
            sections = document.sections.len(),
            total_items,
            partial = !failures.is_empty(),
            "run finished"
        );

        Ok(ProcessedOutput {
            result: document.render(),
            document,
            logs: log.into_lines(),
            total_items,
            generated_at: Utc::now(),
        })
    }
}
