//! Per-call trace records.
//!
//! A `CallRecord` is what the recorder produces for one traced invocation.
//! Its fields are private: once built, a record can only change by having
//! an explanation attached, and only once.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    error::{ExplainError, ExplainResult},
    value::TraceValue,
};

/// Everything captured about a call apart from how it ended.
///
/// Passed to the `CallRecord` constructors by the recorder and by the
/// aggregator when it builds summary records.
#[derive(Debug, Clone)]
pub struct CallCapture {
    /// Identifier of the traced callable.
    pub function: String,
    /// Source file / module reference, for display only.
    pub location: String,
    /// Best-effort text of the callable's definition.
    pub source_text: String,
    /// Argument snapshots keyed by parameter name, in declaration order.
    pub inputs: IndexMap<String, TraceValue>,
    /// Nesting depth; 0 for an outermost traced call.
    pub depth: u32,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Elapsed time measured on a monotonic clock.
    pub duration_ms: f64,
}

/// Collapse metadata carried by a record that stands for many calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSummary {
    /// True number of original calls represented.
    pub count: u64,
    /// Sum of the member calls' durations.
    pub total_duration_ms: f64,
    /// How many member inputs/outputs were kept as samples.
    pub sampled: usize,
    /// How many of the original calls failed.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub failed: u64,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

/// One traced invocation, serialized in the response envelope's trace format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    function: String,
    #[serde(rename = "file")]
    location: String,
    inputs: IndexMap<String, TraceValue>,
    output: TraceValue,
    #[serde(rename = "code")]
    source_text: String,
    #[serde(rename = "start_time")]
    started_at: DateTime<Utc>,
    #[serde(rename = "end_time")]
    ended_at: DateTime<Utc>,
    duration_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    explanation: Option<String>,
    #[serde(default)]
    depth: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    aggregate: Option<AggregateSummary>,
}

impl CallRecord {
    /// A call that returned normally with `output`.
    pub fn succeeded(capture: CallCapture, output: TraceValue) -> Self {
        Self::build(capture, output, None, None)
    }

    /// A call whose callable returned an error; `error` is its display text.
    pub fn failed(capture: CallCapture, error: impl Into<String>) -> Self {
        Self::build(capture, TraceValue::Null, Some(error.into()), None)
    }

    /// A record standing in for many collapsed calls.
    pub fn summary(
        capture: CallCapture,
        output: TraceValue,
        aggregate: AggregateSummary,
        error: Option<String>,
    ) -> Self {
        Self::build(capture, output, error, Some(aggregate))
    }

    fn build(
        capture: CallCapture,
        output: TraceValue,
        error: Option<String>,
        aggregate: Option<AggregateSummary>,
    ) -> Self {
        Self {
            function: capture.function,
            location: capture.location,
            inputs: capture.inputs,
            output,
            source_text: capture.source_text,
            started_at: capture.started_at,
            ended_at: capture.ended_at,
            // `f64::max` also maps NaN to 0.0.
            duration_ms: capture.duration_ms.max(0.0),
            explanation: None,
            depth: capture.depth,
            error,
            aggregate,
        }
    }

    /// Attach the narrative text for this record.
    ///
    /// Fails with `ExplanationAlreadyAttached` if one is already present.
    pub fn attach_explanation(&mut self, text: impl Into<String>) -> ExplainResult<()> {
        if self.explanation.is_some() {
            return Err(ExplainError::ExplanationAlreadyAttached {
                function: self.function.clone(),
            });
        }
        self.explanation = Some(text.into());
        Ok(())
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn inputs(&self) -> &IndexMap<String, TraceValue> {
        &self.inputs
    }

    pub fn output(&self) -> &TraceValue {
        &self.output
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> DateTime<Utc> {
        self.ended_at
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Display text of the callable's error, for failed calls.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn aggregate(&self) -> Option<&AggregateSummary> {
        self.aggregate.as_ref()
    }

    /// Number of original calls this record represents.
    pub fn call_count(&self) -> u64 {
        self.aggregate.as_ref().map_or(1, |a| a.count)
    }

    /// Number of original calls this record represents that failed.
    pub fn failed_count(&self) -> u64 {
        match &self.aggregate {
            Some(aggregate) => aggregate.failed,
            None => u64::from(self.error.is_some()),
        }
    }

    /// The capture fields of this record, for building derived records.
    pub fn to_capture(&self) -> CallCapture {
        CallCapture {
            function: self.function.clone(),
            location: self.location.clone(),
            source_text: self.source_text.clone(),
            inputs: self.inputs.clone(),
            depth: self.depth,
            started_at: self.started_at,
            ended_at: self.ended_at,
            duration_ms: self.duration_ms,
        }
    }
}
