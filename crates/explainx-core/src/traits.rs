//! Core trait definitions for the ExplainX report pipeline.
//!
//! Three seams separate the runner from the policies it applies:
//!
//! - `RecordAggregator`:   bounds how many records reach explanation
//! - `NarrativeGenerator`: external prose source (may be backed by an LLM)
//! - `ReportFormatter`:    deterministic fallback text and report layout
//!
//! The runner treats the generator as unreliable: every call is bounded by a
//! deadline and any failure falls back to the formatter.

use async_trait::async_trait;

use explainx_contracts::{error::ExplainResult, record::CallRecord};

/// Collapses a request's records before they are explained.
///
/// Implementations must be infallible and deterministic; the runner never
/// lets aggregation stand between a pipeline and its result.
pub trait RecordAggregator: Send + Sync {
    /// Return the records to forward, in call-start order.
    fn aggregate(&self, records: Vec<CallRecord>) -> Vec<CallRecord>;
}

/// A source of prose explanations.
///
/// Implementations are considered **untrusted**: they may be slow, fail, or
/// be unavailable altogether. The runner wraps every call in a deadline.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// Explain one traced call in a few sentences.
    async fn explain(&self, record: &CallRecord) -> ExplainResult<String>;

    /// Answer a free-text question about a rendered report.
    async fn answer(&self, report_text: &str, question: &str) -> ExplainResult<String>;
}

/// Renders records into text without any external dependency.
pub trait ReportFormatter: Send + Sync {
    /// Deterministic explanation synthesized from the record's own fields.
    ///
    /// Must never fail and must return non-empty text.
    fn fallback_explanation(&self, record: &CallRecord) -> String;

    /// Lay out the full report for an already-explained record sequence.
    fn render(&self, records: &[CallRecord]) -> String;
}
