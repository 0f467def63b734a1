//! # explainx-narrative
//!
//! Turns explained records into the report text of an `ExecutionReport`.
//!
//! [`TextReportFormatter`] implements
//! [`ReportFormatter`](explainx_core::traits::ReportFormatter): it supplies the
//! deterministic explanation used whenever no generator text is available,
//! and lays the records out as the numbered, banner-framed report.

pub mod formatter;

pub use formatter::{TextReportFormatter, NO_EXPLANATION, REPORT_END, REPORT_TITLE};

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use indexmap::IndexMap;

    use explainx_contracts::{
        record::{AggregateSummary, CallCapture, CallRecord},
        value::TraceValue,
    };
    use explainx_core::traits::ReportFormatter;

    use crate::TextReportFormatter;

    fn capture(function: &str, duration_ms: f64) -> CallCapture {
        let mut inputs = IndexMap::new();
        inputs.insert("price".to_string(), TraceValue::Float(100.0));
        inputs.insert("user_type".to_string(), TraceValue::from("premium"));
        let now = Utc::now();
        CallCapture {
            function: function.to_string(),
            location: "functions/pricing.rs:12".to_string(),
            source_text: String::new(),
            inputs,
            depth: 0,
            started_at: now,
            ended_at: now,
            duration_ms,
        }
    }

    fn discount_record() -> CallRecord {
        CallRecord::succeeded(
            capture("calculate_base_discount", 0.456),
            TraceValue::map([("final_price", TraceValue::Float(80.0))]),
        )
    }

    #[test]
    fn test_fallback_explanation_text() {
        let text = TextReportFormatter::default().fallback_explanation(&discount_record());
        assert_eq!(
            text,
            "The function 'calculate_base_discount' was called with inputs: price=100.0, \
             user_type=premium. It processed these values and returned: {\"final_price\":80.0}. \
             Execution took 0.46ms."
        );
    }

    #[test]
    fn test_fallback_for_failed_call_names_the_error() {
        let record = CallRecord::failed(capture("reserve_stock", 1.0), "Insufficient stock");
        let text = TextReportFormatter::default().fallback_explanation(&record);
        assert!(text.contains("It failed with: Insufficient stock."));
    }

    #[test]
    fn test_fallback_for_summary_mentions_count() {
        let record = CallRecord::summary(
            capture("score_user", 250.0),
            TraceValue::Null,
            AggregateSummary { count: 5000, total_duration_ms: 250.0, sampled: 3, failed: 4 },
            Some("4 of 5000 calls failed".to_string()),
        );
        let text = TextReportFormatter::default().fallback_explanation(&record);
        assert!(text.contains("summarizes 5000 calls (250.00ms in total)"));
        assert!(text.ends_with("4 of 5000 calls failed."));
    }

    #[test]
    fn test_fallback_truncates_large_values() {
        let mut record_capture = capture("validate_users", 2.0);
        record_capture
            .inputs
            .insert("users".to_string(), TraceValue::List((0..1000).map(TraceValue::Int).collect()));
        let record = CallRecord::succeeded(record_capture, TraceValue::Null);

        let text = TextReportFormatter::new(40).fallback_explanation(&record);
        assert!(text.contains("… (1000 items)"));
        assert!(text.len() < 400);
    }

    #[test]
    fn test_render_layout() {
        let mut record = discount_record();
        record.attach_explanation("Premium users get 20% off.\nThe price dropped to 80.").unwrap();

        let report = TextReportFormatter::default().render(&[record]);
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "=".repeat(60));
        assert_eq!(lines[1], "ExplainX - Function Execution Report");
        assert_eq!(lines[2], "=".repeat(60));
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "[1] Function: calculate_base_discount");
        assert_eq!(lines[5], "    File: functions/pricing.rs:12");
        assert_eq!(lines[6], "    Execution Time: 0.46ms");
        assert_eq!(lines[8], "    📥 Inputs:");
        assert_eq!(lines[9], "       • price: 100.0");
        assert_eq!(lines[10], "       • user_type: premium");
        assert_eq!(lines[12], "    📤 Output: {\"final_price\":80.0}");
        assert_eq!(lines[14], "    💡 Explanation:");
        assert_eq!(lines[15], "       Premium users get 20% off.");
        assert_eq!(lines[16], "       The price dropped to 80.");
        assert_eq!(lines[18], "-".repeat(60));
        assert_eq!(lines[lines.len() - 2], "End of ExplainX Report");
    }

    #[test]
    fn test_render_marks_aggregated_and_failed_entries() {
        let summary = CallRecord::summary(
            capture("score_user", 10.0),
            TraceValue::Null,
            AggregateSummary { count: 12, total_duration_ms: 10.0, sampled: 3, failed: 1 },
            Some("1 of 12 calls failed".to_string()),
        );
        let report = TextReportFormatter::default().render(&[summary]);
        assert!(report.contains("    (Aggregated: 12 calls)\n"));
        assert!(report.contains("    (Failed: 1 of 12 calls failed)\n"));
        assert!(report.contains("       No explanation available"));
    }

    #[test]
    fn test_render_of_no_records_is_just_the_frame() {
        let report = TextReportFormatter::default().render(&[]);
        assert_eq!(report.lines().count(), 7);
        assert!(report.contains("End of ExplainX Report"));
    }
}
