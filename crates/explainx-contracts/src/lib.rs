//! # explainx-contracts
//!
//! Shared types, wire formats, and configuration for the ExplainX tracer.
//!
//! All crates in the workspace import from here. No tracing logic lives in
//! this crate: only data definitions, error types, and config loading.

pub mod config;
pub mod error;
pub mod record;
pub mod report;
pub mod value;

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use indexmap::IndexMap;
    use serde_json::json;

    use super::*;
    use config::{CollapseStrategy, ExplainConfig};
    use error::ExplainError;
    use record::{AggregateSummary, CallCapture, CallRecord};
    use report::{ExecutionReport, RequestId};
    use value::TraceValue;

    fn make_capture(function: &str) -> CallCapture {
        let mut inputs = IndexMap::new();
        inputs.insert("price".to_string(), TraceValue::Float(100.0));
        inputs.insert("user_type".to_string(), TraceValue::from("premium"));
        let now = Utc::now();
        CallCapture {
            function: function.to_string(),
            location: "pricing.rs".to_string(),
            source_text: "fn calculate_base_discount(..)".to_string(),
            inputs,
            depth: 0,
            started_at: now,
            ended_at: now,
            duration_ms: 1.5,
        }
    }

    // ── TraceValue ───────────────────────────────────────────────────────────

    #[test]
    fn trace_value_capture_preserves_field_order() {
        #[derive(serde::Serialize)]
        struct Quote {
            zeta: u32,
            alpha: &'static str,
            mid: bool,
        }

        let captured = TraceValue::capture(&Quote { zeta: 1, alpha: "a", mid: true });
        let keys: Vec<&str> = captured.as_map().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn trace_value_json_is_plain_and_stable() {
        let value = TraceValue::map([
            ("count", TraceValue::Int(3)),
            ("ratio", TraceValue::Float(0.25)),
            ("tags", TraceValue::List(vec!["a".into(), TraceValue::Null])),
        ]);

        let text = serde_json::to_string(&value).unwrap();
        assert_eq!(text, r#"{"count":3,"ratio":0.25,"tags":["a",null]}"#);

        let decoded: TraceValue = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn trace_value_capture_degrades_on_serialize_failure() {
        struct Broken;

        impl serde::Serialize for Broken {
            fn serialize<S: serde::Serializer>(&self, _s: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("socket handles cannot be captured"))
            }
        }

        let captured = TraceValue::capture(&Broken);
        let text = captured.as_str().expect("placeholder must be a string");
        assert!(text.starts_with("<unserializable"));
        assert!(text.contains("Broken"));
        assert!(text.contains("socket handles cannot be captured"));
    }

    #[test]
    fn trace_value_render_truncates_long_lists() {
        let value = TraceValue::List((0..500).map(TraceValue::Int).collect());
        let rendered = value.render(20);
        assert!(rendered.ends_with("… (500 items)"), "got: {rendered}");
        assert!(rendered.chars().count() < 40);
    }

    #[test]
    fn trace_value_display_strings_are_raw() {
        assert_eq!(TraceValue::from("premium").to_string(), "premium");
        assert_eq!(TraceValue::Bool(true).to_string(), "true");
        assert_eq!(TraceValue::Float(12.5).to_string(), "12.5");
    }

    #[test]
    fn trace_value_from_large_unsigned_becomes_float() {
        assert_eq!(TraceValue::from(7u64), TraceValue::Int(7));
        assert!(matches!(TraceValue::from(u64::MAX), TraceValue::Float(_)));
    }

    // ── CallRecord ───────────────────────────────────────────────────────────

    #[test]
    fn call_record_wire_format_uses_envelope_names() {
        let record = CallRecord::succeeded(make_capture("calculate_base_discount"), json!(80.0).into());
        let wire = serde_json::to_value(&record).unwrap();

        assert_eq!(wire["function"], "calculate_base_discount");
        assert_eq!(wire["file"], "pricing.rs");
        assert_eq!(wire["code"], "fn calculate_base_discount(..)");
        assert_eq!(wire["inputs"]["user_type"], "premium");
        assert_eq!(wire["output"], 80.0);
        assert_eq!(wire["duration_ms"], 1.5);
        assert!(wire["start_time"].is_string());
        assert!(wire["end_time"].is_string());
        // Absent until filled.
        assert!(wire.get("explanation").is_none());
        assert!(wire.get("error").is_none());
        assert!(wire.get("aggregate").is_none());
    }

    #[test]
    fn call_record_explanation_attaches_once() {
        let mut record = CallRecord::succeeded(make_capture("validate_price"), TraceValue::Null);
        assert!(record.explanation().is_none());

        record.attach_explanation("validated the price").unwrap();
        assert_eq!(record.explanation(), Some("validated the price"));

        match record.attach_explanation("second attempt") {
            Err(ExplainError::ExplanationAlreadyAttached { function }) => {
                assert_eq!(function, "validate_price");
            }
            other => panic!("expected ExplanationAlreadyAttached, got {:?}", other),
        }
        assert_eq!(record.explanation(), Some("validated the price"));
    }

    #[test]
    fn call_record_failed_carries_error_and_null_output() {
        let record = CallRecord::failed(make_capture("reserve_stock"), "insufficient stock");
        assert!(record.is_failed());
        assert_eq!(record.error(), Some("insufficient stock"));
        assert!(record.output().is_null());
        assert_eq!(record.call_count(), 1);
    }

    #[test]
    fn call_record_negative_duration_is_clamped() {
        let mut capture = make_capture("check_stock");
        capture.duration_ms = -4.0;
        let record = CallRecord::succeeded(capture, TraceValue::Null);
        assert_eq!(record.duration_ms(), 0.0);
    }

    #[test]
    fn call_record_summary_reports_true_count() {
        let record = CallRecord::summary(
            make_capture("score_user"),
            TraceValue::Null,
            AggregateSummary { count: 5000, total_duration_ms: 250.0, sampled: 3, failed: 2 },
            Some("2 of 5000 calls failed".to_string()),
        );
        assert_eq!(record.call_count(), 5000);
        assert_eq!(record.aggregate().unwrap().total_duration_ms, 250.0);
        assert_eq!(record.failed_count(), 2);

        let wire = serde_json::to_value(&record).unwrap();
        assert_eq!(wire["aggregate"]["count"], 5000);
        assert_eq!(wire["aggregate"]["failed"], 2);
        assert_eq!(wire["error"], "2 of 5000 calls failed");
    }

    // ── ExecutionReport ──────────────────────────────────────────────────────

    #[test]
    fn execution_report_envelope_shape() {
        let report = ExecutionReport::new(
            json!({ "success": true }),
            vec![CallRecord::succeeded(make_capture("validate_user_type"), TraceValue::Null)],
            "report".to_string(),
        );
        let wire = serde_json::to_value(&report).unwrap();
        assert_eq!(wire["result"]["success"], true);
        assert_eq!(wire["traces"].as_array().unwrap().len(), 1);
        assert_eq!(wire["explain_text"], "report");
    }

    #[test]
    fn request_id_new_produces_unique_values() {
        let ids: std::collections::HashSet<String> =
            (0..100).map(|_| RequestId::new().0.to_string()).collect();
        assert_eq!(ids.len(), 100);
    }

    // ── ExplainConfig ────────────────────────────────────────────────────────

    #[test]
    fn config_defaults_apply_to_empty_document() {
        let config = ExplainConfig::from_toml_str("").unwrap();
        assert_eq!(config.aggregation.max_records_per_narrative, 25);
        assert_eq!(config.aggregation.collapse_strategy, CollapseStrategy::CountSamples);
        assert_eq!(config.aggregation.samples_per_group, 3);
        assert!(config.narrative.enabled);
        assert_eq!(config.narrative.timeout_ms, 30_000);
    }

    #[test]
    fn config_parses_collapse_strategy_name() {
        let toml = r#"
            [aggregation]
            max_records_per_narrative = 10
            collapse_strategy = "count+samples"

            [narrative]
            timeout_ms = 500
        "#;
        let config = ExplainConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.aggregation.max_records_per_narrative, 10);
        assert_eq!(config.narrative.timeout_ms, 500);
        assert_eq!(config.narrative.max_value_chars, 200);
    }

    #[test]
    fn config_rejects_zero_cap() {
        let toml = r#"
            [aggregation]
            max_records_per_narrative = 0
        "#;
        match ExplainConfig::from_toml_str(toml) {
            Err(ExplainError::ConfigError { reason }) => {
                assert!(reason.contains("max_records_per_narrative"));
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn config_parse_error_is_reported() {
        match ExplainConfig::from_toml_str("this is not valid toml ][[[") {
            Err(ExplainError::ConfigError { reason }) => {
                assert!(reason.contains("failed to parse config TOML"));
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    // ── ExplainError display messages ────────────────────────────────────────

    #[test]
    fn error_generator_timeout_display() {
        let err = ExplainError::GeneratorTimeout { timeout_ms: 250 };
        assert!(err.to_string().contains("250ms"));
    }
}
