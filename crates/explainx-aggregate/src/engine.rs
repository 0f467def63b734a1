//! The configured record aggregator.
//!
//! `Aggregator` loads an `AggregationConfig` and implements the
//! `RecordAggregator` trait from explainx-core.
//!
//! Aggregation algorithm, stopping as soon as the record count is within
//! `max_records_per_narrative`:
//!
//! 1. Records already within the cap are returned untouched.
//! 2. Consecutive runs of the same function collapse into one summary each.
//! 3. All records of the same function collapse into one summary each, in
//!    order of each function's first appearance.
//! 4. Everything past the first `max - 1` records collapses into a single
//!    overflow summary named `"(N more calls)"`.

use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, info};

use explainx_contracts::{
    config::{AggregationConfig, CollapseStrategy, ExplainConfig},
    error::ExplainResult,
    record::CallRecord,
};
use explainx_core::traits::RecordAggregator;

use crate::summary::{overflow_label, summarize};

/// A `RecordAggregator` driven by `AggregationConfig`.
///
/// ```rust,ignore
/// use explainx_aggregate::Aggregator;
///
/// let aggregator = Aggregator::from_file(Path::new("config/explainx.toml"))?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    config: AggregationConfig,
}

impl Aggregator {
    pub fn new(config: AggregationConfig) -> Self {
        Self { config }
    }

    /// Parse `s` as an ExplainX TOML document and use its `[aggregation]`
    /// section.
    ///
    /// Returns `ExplainError::ConfigError` if the TOML is malformed or fails
    /// validation.
    pub fn from_toml_str(s: &str) -> ExplainResult<Self> {
        Ok(Self::new(ExplainConfig::from_toml_str(s)?.aggregation))
    }

    /// Read the file at `path` and use its `[aggregation]` section.
    pub fn from_file(path: &Path) -> ExplainResult<Self> {
        Ok(Self::new(ExplainConfig::from_file(path)?.aggregation))
    }

    pub fn config(&self) -> &AggregationConfig {
        &self.config
    }

    /// Pass 1: collapse each run of two or more adjacent same-function records.
    fn collapse_runs(&self, records: Vec<CallRecord>) -> Vec<CallRecord> {
        let mut out = Vec::new();
        let mut run: Vec<CallRecord> = Vec::new();

        for record in records {
            let continues = run.last().map_or(true, |prev| prev.function() == record.function());
            if !continues {
                self.flush(&mut run, &mut out);
            }
            run.push(record);
        }
        self.flush(&mut run, &mut out);
        out
    }

    fn flush(&self, run: &mut Vec<CallRecord>, out: &mut Vec<CallRecord>) {
        let members = std::mem::take(run);
        out.extend(self.group(members));
    }

    /// Pass 2: one record per function, in first-appearance order.
    fn collapse_by_function(&self, records: Vec<CallRecord>) -> Vec<CallRecord> {
        let mut groups: IndexMap<String, Vec<CallRecord>> = IndexMap::new();
        for record in records {
            groups.entry(record.function().to_string()).or_default().push(record);
        }
        groups.into_values().flat_map(|members| self.group(members)).collect()
    }

    /// Pass 3: keep the first `cap - 1` records and fold the rest.
    fn collapse_tail(&self, mut records: Vec<CallRecord>, cap: usize) -> Vec<CallRecord> {
        let keep = cap.saturating_sub(1);
        if records.len() <= cap {
            return records;
        }
        let tail = records.split_off(keep);
        let calls: u64 = tail.iter().map(CallRecord::call_count).sum();
        let label = overflow_label(calls);
        records.extend(self.summarize(&label, tail));
        records
    }

    /// A single member stays as it is; two or more become one summary.
    fn group(&self, members: Vec<CallRecord>) -> Vec<CallRecord> {
        if members.len() < 2 {
            return members;
        }
        let function = members[0].function().to_string();
        self.summarize(&function, members).into_iter().collect()
    }

    fn summarize(&self, function: &str, members: Vec<CallRecord>) -> Option<CallRecord> {
        match self.config.collapse_strategy {
            CollapseStrategy::CountSamples => {
                summarize(function, members, self.config.samples_per_group)
            }
        }
    }
}

impl RecordAggregator for Aggregator {
    /// Bring `records` within `max_records_per_narrative`.
    ///
    /// Each pass is tried only if the previous one left too many records.
    /// The sum of `call_count()` over the output always equals the number of
    /// input calls.
    fn aggregate(&self, records: Vec<CallRecord>) -> Vec<CallRecord> {
        let cap = self.config.max_records_per_narrative.max(1);
        let captured = records.len();

        if captured <= cap {
            debug!(records = captured, cap, "within cap; no aggregation");
            return records;
        }

        let records = self.collapse_runs(records);
        debug!(records = records.len(), cap, "after collapsing consecutive runs");

        let records = if records.len() > cap {
            let records = self.collapse_by_function(records);
            debug!(records = records.len(), cap, "after collapsing by function");
            records
        } else {
            records
        };

        let records = if records.len() > cap {
            let records = self.collapse_tail(records, cap);
            debug!(records = records.len(), cap, "after folding overflow tail");
            records
        } else {
            records
        };

        info!(captured, forwarded = records.len(), cap, "records aggregated");
        records
    }
}
