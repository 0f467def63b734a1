//! The response envelope returned by every traced request.

use serde::{Deserialize, Serialize};

use crate::record::CallRecord;

/// Unique identifier for one traced request.
///
/// Appears in every log line the runner emits for that request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub uuid::Uuid);

impl RequestId {
    /// Create a new, unique request ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

/// The execution report: pipeline result, trace records, narrative text.
///
/// Built once per request by the runner and handed to the boundary layer.
/// `result` is the pipeline's own value and never depends on whether
/// tracing, aggregation or narrative generation succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport<R = serde_json::Value> {
    pub result: R,
    pub traces: Vec<CallRecord>,
    pub explain_text: String,
}

impl<R> ExecutionReport<R> {
    pub fn new(result: R, traces: Vec<CallRecord>, explain_text: String) -> Self {
        Self { result, traces, explain_text }
    }
}

/// Answer to a free-text question about a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
}
