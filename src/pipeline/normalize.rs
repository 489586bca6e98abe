// src/pipeline/normalize.rs
//! Per-source fetch loop.
//!
//! The primary category is fetched first and yields the `BaseValue`; every
//! category of the source (primary included) is then converted with that one
//! value. Anything that goes wrong on the primary category ends the source.
//! Later categories fail independently and are simply left out.

use metrics::counter;

use crate::error::PipelineError;
use crate::pipeline::format::{FormattedItem, Section};
use crate::pipeline::log::RunLog;
use crate::sources::fetch::Fetcher;
use crate::sources::types::{
    BaseValue, CategorySelection, RawRecord, SelectedCategory, ThresholdKind, Thresholds,
};
use crate::sources::SourceAdapter;

/// Outcome of one source's run.
#[derive(Debug)]
pub struct SourceReport {
    pub source: &'static str,
    pub sections: Vec<Section>,
    /// Set once from the primary category; `None` when the source failed early.
    pub base_value: Option<BaseValue>,
    /// Fatal error for this source (primary category fetch/parse/base value).
    pub failure: Option<PipelineError>,
    /// Later categories that were skipped, with the reason.
    pub skipped: Vec<(String, PipelineError)>,
    pub log: RunLog,
}

impl SourceReport {
    fn new(source: &'static str) -> Self {
        Self {
            source,
            sections: Vec::new(),
            base_value: None,
            failure: None,
            skipped: Vec::new(),
            log: RunLog::new(),
        }
    }

    fn fail(mut self, section: &str, err: PipelineError) -> Self {
        self.log.push(format!("✗ Error processing {section}: {err}"));
        tracing::warn!(
            target: "pipeline",
            source = self.source,
            section,
            kind = err.kind(),
            error = %err,
            "primary category failed; source aborted"
        );
        self.failure = Some(err);
        self
    }
}

pub async fn process_source(
    adapter: &dyn SourceAdapter,
    selection: &CategorySelection,
    thresholds: &Thresholds,
    fetcher: &dyn Fetcher,
) -> SourceReport {
    let mut report = SourceReport::new(adapter.name());
    let total = selection.len();

    report.log.banner(&format!("Processing {} data...", adapter.name()));

    // (1) Primary category: fetch + base value.
    let primary = selection.primary();
    let primary_section = adapter.section_name(&primary.endpoint);
    report
        .log
        .push(format!("\n[1/{total}] Fetching data from {primary_section}..."));

    let record = match fetcher.fetch_json(&primary.endpoint).await {
        Ok(r) => r,
        Err(e) => return report.fail(&primary_section, e),
    };

    report.log.push("Extracting base value from data...");
    let base = match adapter.extract_base_value(&record) {
        Ok(Some(b)) => b,
        Ok(None) => {
            let err = PipelineError::MissingBaseValue {
                source_name: adapter.name().to_string(),
                reference: adapter.reference_id().to_string(),
            };
            return report.fail(&primary_section, err);
        }
        Err(e) => return report.fail(&primary_section, e),
    };
    report.log.push(format!("✓ Base value found: {base}"));
    report.base_value = Some(base);

    match build_section(adapter, primary, primary_section.clone(), &record, base, thresholds) {
        Ok((section, log)) => {
            report.log.append(log);
            report.sections.push(section);
        }
        Err(e) => {
            report.base_value = None;
            return report.fail(&primary_section, e);
        }
    }

    // (2) Remaining categories reuse the same base value.
    for (i, entry) in selection.rest().iter().enumerate() {
        let section_name = adapter.section_name(&entry.endpoint);
        report.log.push(format!(
            "\n[{}/{total}] Fetching data from {section_name}...",
            i + 2
        ));

        let outcome = match fetcher.fetch_json(&entry.endpoint).await {
            Ok(record) => {
                build_section(adapter, entry, section_name.clone(), &record, base, thresholds)
            }
            Err(e) => Err(e),
        };

        match outcome {
            Ok((section, log)) => {
                report.log.append(log);
                report.sections.push(section);
            }
            Err(e) => {
                report
                    .log
                    .push(format!("✗ Error processing {section_name}: {e}"));
                tracing::warn!(
                    target: "pipeline",
                    source = adapter.name(),
                    section = %section_name,
                    kind = e.kind(),
                    error = %e,
                    "category skipped"
                );
                report.skipped.push((entry.name.clone(), e));
            }
        }
    }

    report
}

/// Convert, filter and format one category's payload.
fn build_section(
    adapter: &dyn SourceAdapter,
    entry: &SelectedCategory,
    name: String,
    record: &RawRecord,
    base: BaseValue,
    thresholds: &Thresholds,
) -> Result<(Section, RunLog), PipelineError> {
    let mut log = RunLog::new();
    log.push(format!("Calculating values using base value: {base}..."));

    let (threshold, kind) = adapter.threshold_for(entry, thresholds);
    let suffix = match kind {
        ThresholdKind::Currency => " (Currency)",
        ThresholdKind::Generic => "",
    };
    log.push(format!("Applying minimum value filter: {threshold} Ex{suffix}"));

    let outcome = adapter.compute_item_values(record, base, threshold)?;
    let fetched = outcome.kept.len() + outcome.dropped;

    counter!("pickit_items_kept_total").increment(outcome.kept.len() as u64);
    counter!("pickit_items_filtered_total").increment(outcome.dropped as u64);
    counter!("pickit_sections_total").increment(1);

    let items: Vec<FormattedItem> = outcome
        .kept
        .into_iter()
        .map(|item| FormattedItem {
            line: adapter.format_line(&item),
            item,
        })
        .collect();

    log.push(format!(
        "✓ Processed {} items from this section (after filtering)",
        items.len()
    ));
    tracing::info!(
        target: "pipeline",
        source = adapter.name(),
        section = %name,
        fetched,
        kept = items.len(),
        threshold,
        "section built"
    );

    Ok((
        Section {
            name,
            source: adapter.name(),
            items,
        },
        log,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::fetch::FixtureFetcher;
    use crate::sources::providers::ninja::NinjaSource;

    fn ninja() -> NinjaSource {
        NinjaSource::new("https://ninja.test", "Test League")
    }

    #[tokio::test]
    async fn missing_reference_stops_before_second_fetch() {
        let src = ninja();
        let sel = src.select_active(&["Fragments".to_string()]).unwrap();
        let eps = sel.endpoints();
        let fetcher = FixtureFetcher::new()
            .with_body(eps[0], r#"{"lines": [{"id": "divine", "primaryValue": 1.0}]}"#)
            .with_body(eps[1], r#"{"lines": []}"#);

        let report = process_source(&src, &sel, &Thresholds::default(), &fetcher).await;

        assert!(matches!(
            report.failure,
            Some(PipelineError::MissingBaseValue { .. })
        ));
        assert!(report.sections.is_empty());
        assert!(report.base_value.is_none());
        assert_eq!(fetcher.calls(), vec![eps[0].to_string()]);
    }

    #[tokio::test]
    async fn later_failure_is_skipped_not_fatal() {
        let src = ninja();
        let sel = src
            .select_active(&["Fragments".to_string(), "Breach".to_string()])
            .unwrap();
        let eps = sel.endpoints();
        let fetcher = FixtureFetcher::new()
            .with_body(eps[0], r#"{"lines": [{"id": "exalted", "primaryValue": 2.0}]}"#)
            .with_body(eps[2], r#"{"lines": [{"id": "b", "primaryValue": 40.0}]}"#);

        let report = process_source(&src, &sel, &Thresholds::default(), &fetcher).await;

        assert!(report.failure.is_none());
        let names: Vec<_> = report.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["CURRENCY", "BREACH"]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0, "Fragments");
        assert_eq!(report.sections[1].items[0].item.value, 20.0);
    }

    #[tokio::test]
    async fn malformed_later_payload_is_skipped_and_next_still_renders() {
        let src = ninja();
        let sel = src
            .select_active(&["Fragments".to_string(), "Breach".to_string()])
            .unwrap();
        let eps = sel.endpoints();
        let fetcher = FixtureFetcher::new()
            .with_body(eps[0], r#"{"lines": [{"id": "exalted", "primaryValue": 2.0}]}"#)
            .with_body(eps[1], r#"{"lines": [{"id": "f", "primaryValue": "lots"}]}"#)
            .with_body(eps[2], r#"{"lines": [{"id": "b", "primaryValue": 40.0}]}"#);

        let report = process_source(&src, &sel, &Thresholds::default(), &fetcher).await;

        assert!(report.failure.is_none());
        assert_eq!(fetcher.calls().len(), 3);
        let names: Vec<_> = report.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["CURRENCY", "BREACH"]);

        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].0, "Fragments");
        assert_eq!(report.skipped[0].1.kind(), "parse");
        assert!(report
            .log
            .lines()
            .iter()
            .any(|l| l.starts_with("✗ Error processing FRAGMENTS: malformed payload")));
    }
}
