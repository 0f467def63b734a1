//! Building one summary record from a group of collapsed records.
//!
//! A summary stands for every original call behind its members. Members may
//! themselves be summaries from an earlier pass; their counts, durations and
//! samples carry over, so a record never under-reports what it represents.

use indexmap::IndexMap;

use explainx_contracts::{
    record::{AggregateSummary, CallCapture, CallRecord},
    value::TraceValue,
};

/// Location shown when collapsed members come from different places.
pub const MIXED_LOCATION: &str = "(multiple)";

/// Function label of the record that absorbs the tail beyond the cap.
pub fn overflow_label(calls: u64) -> String {
    format!("({} more calls)", calls)
}

/// Collapse `members` into one record named `function`.
///
/// Returns `None` for an empty group.
pub fn summarize(function: &str, members: Vec<CallRecord>, samples: usize) -> Option<CallRecord> {
    let first = members.first()?;

    let location = if members.iter().all(|m| m.location() == first.location()) {
        first.location().to_string()
    } else {
        MIXED_LOCATION.to_string()
    };
    let source_text = if members.iter().all(|m| m.function() == first.function()) {
        first.source_text().to_string()
    } else {
        String::new()
    };

    let mut started_at = first.started_at();
    let mut ended_at = first.ended_at();
    let mut depth = first.depth();
    let mut count = 0u64;
    let mut failed = 0u64;
    let mut total_duration_ms = 0.0f64;
    let mut input_samples = Vec::new();
    let mut output_samples = Vec::new();

    for member in &members {
        started_at = started_at.min(member.started_at());
        ended_at = ended_at.max(member.ended_at());
        depth = depth.min(member.depth());
        count += member.call_count();
        failed += member.failed_count();
        total_duration_ms += member.duration_ms();

        if input_samples.len() < samples {
            input_samples.extend(input_samples_of(member));
        }
        if output_samples.len() < samples {
            output_samples.extend(output_samples_of(member));
        }
    }
    input_samples.truncate(samples);
    output_samples.truncate(samples);
    let sampled = input_samples.len();

    let mut inputs = IndexMap::new();
    inputs.insert("collapsed_calls".to_string(), TraceValue::from(count));
    inputs.insert("samples".to_string(), TraceValue::List(input_samples));

    let output = TraceValue::map([("samples", TraceValue::List(output_samples))]);

    let error = (failed > 0).then(|| format!("{} of {} calls failed", failed, count));

    let capture = CallCapture {
        function: function.to_string(),
        location,
        source_text,
        inputs,
        depth,
        started_at,
        ended_at,
        duration_ms: total_duration_ms,
    };

    Some(CallRecord::summary(
        capture,
        output,
        AggregateSummary { count, total_duration_ms, sampled, failed },
        error,
    ))
}

fn input_samples_of(record: &CallRecord) -> Vec<TraceValue> {
    if record.aggregate().is_some() {
        return nested_samples(record.inputs().get("samples"));
    }
    vec![TraceValue::Map(record.inputs().clone())]
}

fn output_samples_of(record: &CallRecord) -> Vec<TraceValue> {
    if record.aggregate().is_some() {
        return nested_samples(record.output().get("samples"));
    }
    vec![record.output().clone()]
}

fn nested_samples(samples: Option<&TraceValue>) -> Vec<TraceValue> {
    samples
        .and_then(TraceValue::as_list)
        .map(<[TraceValue]>::to_vec)
        .unwrap_or_default()
}
