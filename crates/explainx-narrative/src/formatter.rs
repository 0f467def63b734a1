//! Plain-text report formatter.
//!
//! `TextReportFormatter` implements the `ReportFormatter` trait from
//! explainx-core. Both of its outputs are pure functions of the records they
//! are given: no clock, no I/O, no generator.

use std::fmt::Write as _;

use tracing::debug;

use explainx_contracts::{config::NarrativeConfig, record::CallRecord};
use explainx_core::traits::ReportFormatter;

pub const REPORT_TITLE: &str = "ExplainX - Function Execution Report";
pub const REPORT_END: &str = "End of ExplainX Report";
/// Shown for a record that reached the formatter without an explanation.
pub const NO_EXPLANATION: &str = "No explanation available";

const BANNER_WIDTH: usize = 60;

/// Renders reports as fixed-layout text.
#[derive(Debug, Clone)]
pub struct TextReportFormatter {
    max_value_chars: usize,
}

impl TextReportFormatter {
    /// `max_value_chars` bounds the rendering of any single value.
    pub fn new(max_value_chars: usize) -> Self {
        Self { max_value_chars }
    }

    pub fn from_config(config: &NarrativeConfig) -> Self {
        Self::new(config.max_value_chars)
    }

    fn input_summary(&self, record: &CallRecord) -> String {
        record
            .inputs()
            .iter()
            .map(|(k, v)| format!("{}={}", k, v.render(self.max_value_chars)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for TextReportFormatter {
    fn default() -> Self {
        Self::from_config(&NarrativeConfig::default())
    }
}

impl ReportFormatter for TextReportFormatter {
    fn fallback_explanation(&self, record: &CallRecord) -> String {
        let mut text = match record.error() {
            Some(error) if record.aggregate().is_none() => format!(
                "The function '{}' was called with inputs: {}. It failed with: {}. \
                 Execution took {:.2}ms.",
                record.function(),
                self.input_summary(record),
                error,
                record.duration_ms()
            ),
            _ => format!(
                "The function '{}' was called with inputs: {}. It processed these values \
                 and returned: {}. Execution took {:.2}ms.",
                record.function(),
                self.input_summary(record),
                record.output().render(self.max_value_chars),
                record.duration_ms()
            ),
        };

        if let Some(aggregate) = record.aggregate() {
            let _ = write!(
                text,
                " This entry summarizes {} calls ({:.2}ms in total); {} are shown as samples.",
                aggregate.count, aggregate.total_duration_ms, aggregate.sampled
            );
            if let Some(error) = record.error() {
                let _ = write!(text, " {}.", error);
            }
        }
        text
    }

    fn render(&self, records: &[CallRecord]) -> String {
        let banner = "=".repeat(BANNER_WIDTH);
        let rule = "-".repeat(BANNER_WIDTH);
        let mut lines: Vec<String> = vec![banner.clone(), REPORT_TITLE.to_string(), banner.clone(), String::new()];

        for (i, record) in records.iter().enumerate() {
            lines.push(format!("[{}] Function: {}", i + 1, record.function()));
            lines.push(format!("    File: {}", record.location()));
            lines.push(format!("    Execution Time: {:.2}ms", record.duration_ms()));
            if let Some(aggregate) = record.aggregate() {
                lines.push(format!("    (Aggregated: {} calls)", aggregate.count));
            }
            if let Some(error) = record.error() {
                lines.push(format!("    (Failed: {})", error));
            }
            lines.push(String::new());

            lines.push("    📥 Inputs:".to_string());
            for (key, value) in record.inputs() {
                lines.push(format!("       • {}: {}", key, value.render(self.max_value_chars)));
            }
            lines.push(String::new());
            lines.push(format!("    📤 Output: {}", record.output().render(self.max_value_chars)));
            lines.push(String::new());

            lines.push("    💡 Explanation:".to_string());
            for line in record.explanation().unwrap_or(NO_EXPLANATION).split('\n') {
                lines.push(format!("       {}", line));
            }
            lines.push(String::new());
            lines.push(rule.clone());
            lines.push(String::new());
        }

        lines.push(banner.clone());
        lines.push(REPORT_END.to_string());
        lines.push(banner);

        debug!(records = records.len(), lines = lines.len(), "report rendered");
        lines.join("\n")
    }
}
