//! The request runner: one traced request from fresh context to envelope.
//!
//! The runner enforces the ExplainX request model:
//!
//!   fresh TraceContext → pipeline → drain → aggregate → explain → render
//!
//! The pipeline's own result is computed before any narrative work begins
//! and is returned whatever happens afterwards. A pipeline error is handed
//! back unchanged and no envelope is built for it.

use std::{fmt, sync::Arc, time::Duration};

use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, info, warn};

use explainx_contracts::{
    config::NarrativeConfig,
    error::ExplainError,
    record::CallRecord,
    report::{ChatReply, ExecutionReport},
};

use crate::{
    context::TraceContext,
    traits::{NarrativeGenerator, RecordAggregator, ReportFormatter},
};

/// Reply used when a question cannot be answered.
pub const CHAT_FALLBACK: &str = "Sorry, I couldn't process your request at this time.";

/// Describes one request to the runner.
#[derive(Debug, Clone)]
pub struct RunSpec {
    /// Pipeline name, for logs.
    pub name: String,
    /// Prefixed to the report as `SOURCE: <note>` when set.
    pub source_note: Option<String>,
}

impl RunSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), source_note: None }
    }

    pub fn with_source_note(mut self, note: impl Into<String>) -> Self {
        self.source_note = Some(note.into());
        self
    }
}

/// Where a request's explanations came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeMode {
    /// Every record was explained by the generator.
    Enriched,
    /// Some records were explained by the generator, the rest by fallback.
    Mixed,
    /// No generator text was used.
    Fallback,
}

impl fmt::Display for NarrativeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NarrativeMode::Enriched => write!(f, "enriched"),
            NarrativeMode::Mixed => write!(f, "mixed"),
            NarrativeMode::Fallback => write!(f, "fallback"),
        }
    }
}

/// Drives traced requests.
///
/// Holds only read-only policy: one runner can serve any number of requests,
/// each of which gets its own `TraceContext`.
pub struct RequestRunner {
    aggregator: Box<dyn RecordAggregator>,
    formatter: Box<dyn ReportFormatter>,
    generator: Option<Arc<dyn NarrativeGenerator>>,
    narrative: NarrativeConfig,
}

impl RequestRunner {
    /// Create a runner with no narrative generator; every record gets the
    /// formatter's fallback explanation.
    pub fn new(
        aggregator: Box<dyn RecordAggregator>,
        formatter: Box<dyn ReportFormatter>,
        narrative: NarrativeConfig,
    ) -> Self {
        Self { aggregator, formatter, generator: None, narrative }
    }

    pub fn with_generator(mut self, generator: Arc<dyn NarrativeGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Run `pipeline` as one traced request.
    ///
    /// # Pipeline
    ///
    /// 1. Build a fresh `TraceContext`
    /// 2. Run `pipeline`; an `Err` is returned unchanged
    /// 3. Drain the context's records in call-start order
    /// 4. Aggregate them down to the configured cap
    /// 5. Attach an explanation to every record, generator first, fallback
    ///    for whatever the generator did not cover before the deadline
    /// 6. Render the report text
    pub async fn run<R, E, F>(&self, spec: RunSpec, pipeline: F) -> Result<ExecutionReport<R>, E>
    where
        E: fmt::Display,
        F: FnOnce(&TraceContext) -> Result<R, E>,
    {
        let ctx = TraceContext::new();
        let request_id = ctx.request_id().0.to_string();

        debug!(request_id = %request_id, pipeline = %spec.name, "request starting");

        // ── Step 2: the pipeline itself ──────────────────────────────────────
        let result = match pipeline(&ctx) {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    request_id = %request_id,
                    pipeline = %spec.name,
                    error = %e,
                    "pipeline failed; discarding its trace"
                );
                return Err(e);
            }
        };

        // ── Steps 3-4: drain and aggregate ───────────────────────────────────
        let records = ctx.drain();
        let captured = records.len();
        let mut records = self.aggregator.aggregate(records);

        // ── Step 5: explanations ─────────────────────────────────────────────
        let mode = self.explain_records(&request_id, &mut records).await;

        // ── Step 6: render ───────────────────────────────────────────────────
        let report = self.formatter.render(&records);
        let explain_text = match &spec.source_note {
            Some(note) => format!("SOURCE: {}\n\n{}", note, report),
            None => report,
        };

        info!(
            request_id = %request_id,
            pipeline = %spec.name,
            captured,
            forwarded = records.len(),
            narrative = %mode,
            "request complete"
        );

        Ok(ExecutionReport::new(result, records, explain_text))
    }

    async fn explain_records(&self, request_id: &str, records: &mut [CallRecord]) -> NarrativeMode {
        let generator = match &self.generator {
            Some(generator) if self.narrative.enabled => generator,
            _ => {
                for record in records.iter_mut() {
                    self.attach_fallback(record);
                }
                return NarrativeMode::Fallback;
            }
        };

        // One deadline for the whole request, not one per record.
        let deadline = Instant::now() + Duration::from_millis(self.narrative.timeout_ms);
        let mut generated = 0usize;
        let mut expired = false;

        for record in records.iter_mut() {
            if expired {
                self.attach_fallback(record);
                continue;
            }

            let text = match timeout_at(deadline, generator.explain(record)).await {
                Ok(Ok(text)) if !text.trim().is_empty() => Some(text),
                Ok(Ok(_)) => {
                    warn!(
                        request_id = %request_id,
                        function = %record.function(),
                        "generator returned empty text; using fallback"
                    );
                    None
                }
                Ok(Err(e)) => {
                    warn!(
                        request_id = %request_id,
                        function = %record.function(),
                        error = %e,
                        "generator failed; using fallback"
                    );
                    None
                }
                Err(_) => {
                    warn!(
                        request_id = %request_id,
                        error = %self.timeout_error(),
                        "narrative deadline elapsed; remaining records use fallback"
                    );
                    expired = true;
                    None
                }
            };

            match text {
                Some(text) => {
                    generated += 1;
                    self.attach(record, text);
                }
                None => self.attach_fallback(record),
            }
        }

        if generated == records.len() {
            NarrativeMode::Enriched
        } else if generated == 0 {
            NarrativeMode::Fallback
        } else {
            NarrativeMode::Mixed
        }
    }

    fn attach_fallback(&self, record: &mut CallRecord) {
        let text = self.formatter.fallback_explanation(record);
        self.attach(record, text);
    }

    fn attach(&self, record: &mut CallRecord, text: String) {
        if let Err(e) = record.attach_explanation(text) {
            debug!(error = %e, "keeping existing explanation");
        }
    }

    /// Logged when the generator misses the narrative deadline.
    fn timeout_error(&self) -> ExplainError {
        ExplainError::GeneratorTimeout { timeout_ms: self.narrative.timeout_ms }
    }

    /// Answer a question about a rendered report.
    ///
    /// Never fails: with no generator, a generator error, or an elapsed
    /// deadline the reply is the fixed apology text.
    pub async fn answer(&self, report_text: &str, question: &str) -> ChatReply {
        let generator = match &self.generator {
            Some(generator) if self.narrative.enabled => generator,
            _ => return ChatReply { response: CHAT_FALLBACK.to_string() },
        };

        let limit = Duration::from_millis(self.narrative.timeout_ms);
        let response = match timeout(limit, generator.answer(report_text, question)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => text,
            Ok(Ok(_)) => CHAT_FALLBACK.to_string(),
            Ok(Err(e)) => {
                warn!(error = %e, "chat generator failed");
                CHAT_FALLBACK.to_string()
            }
            Err(_) => {
                warn!(error = %self.timeout_error(), "chat generator gave no answer");
                CHAT_FALLBACK.to_string()
            }
        };

        ChatReply { response }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    use async_trait::async_trait;

    use explainx_contracts::{
        config::NarrativeConfig,
        error::{ExplainError, ExplainResult},
        record::CallRecord,
    };

    use super::{RequestRunner, RunSpec, CHAT_FALLBACK};
    use crate::{
        context::TraceContext,
        traits::{NarrativeGenerator, RecordAggregator, ReportFormatter},
    };

    // ── Mock components ──────────────────────────────────────────────────────

    struct PassThrough;

    impl RecordAggregator for PassThrough {
        fn aggregate(&self, records: Vec<CallRecord>) -> Vec<CallRecord> {
            records
        }
    }

    /// Counts how many records it was given.
    struct CountingAggregator {
        seen: Arc<Mutex<Vec<usize>>>,
    }

    impl RecordAggregator for CountingAggregator {
        fn aggregate(&self, records: Vec<CallRecord>) -> Vec<CallRecord> {
            self.seen.lock().unwrap().push(records.len());
            records
        }
    }

    struct PlainFormatter;

    impl ReportFormatter for PlainFormatter {
        fn fallback_explanation(&self, record: &CallRecord) -> String {
            format!("fallback for {}", record.function())
        }

        fn render(&self, records: &[CallRecord]) -> String {
            records
                .iter()
                .map(|r| format!("{}: {}", r.function(), r.explanation().unwrap_or("")))
                .collect::<Vec<_>>()
                .join("\n")
        }
    }

    struct EchoGenerator;

    #[async_trait]
    impl NarrativeGenerator for EchoGenerator {
        async fn explain(&self, record: &CallRecord) -> ExplainResult<String> {
            Ok(format!("generated for {}", record.function()))
        }

        async fn answer(&self, _report_text: &str, question: &str) -> ExplainResult<String> {
            Ok(format!("you asked: {question}"))
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl NarrativeGenerator for FailingGenerator {
        async fn explain(&self, _record: &CallRecord) -> ExplainResult<String> {
            Err(ExplainError::Generator { reason: "provider unavailable".to_string() })
        }

        async fn answer(&self, _report_text: &str, _question: &str) -> ExplainResult<String> {
            Err(ExplainError::Generator { reason: "provider unavailable".to_string() })
        }
    }

    struct SlowGenerator;

    #[async_trait]
    impl NarrativeGenerator for SlowGenerator {
        async fn explain(&self, _record: &CallRecord) -> ExplainResult<String> {
            tokio::time::sleep(std::time::Duration::from_secs(10)).await;
            Ok("too late".to_string())
        }

        async fn answer(&self, _report_text: &str, _question: &str) -> ExplainResult<String> {
            tokio::time::sleep(std::time::Duration::from_secs(10)).await;
            Ok("too late".to_string())
        }
    }

    /// Answers the first `budget` records, then fails.
    struct LimitedGenerator {
        budget: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl NarrativeGenerator for LimitedGenerator {
        async fn explain(&self, record: &CallRecord) -> ExplainResult<String> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.budget {
                Ok(format!("generated for {}", record.function()))
            } else {
                Err(ExplainError::Generator { reason: "quota exhausted".to_string() })
            }
        }

        async fn answer(&self, _report_text: &str, _question: &str) -> ExplainResult<String> {
            Ok(String::new())
        }
    }

    fn runner() -> RequestRunner {
        RequestRunner::new(Box::new(PassThrough), Box::new(PlainFormatter), NarrativeConfig::default())
    }

    fn runner_with_timeout(timeout_ms: u64) -> RequestRunner {
        let narrative = NarrativeConfig { timeout_ms, ..NarrativeConfig::default() };
        RequestRunner::new(Box::new(PassThrough), Box::new(PlainFormatter), narrative)
    }

    // ── Traced fixtures ──────────────────────────────────────────────────────

    traced! {
        fn step(ctx: &TraceContext, label: &str) -> String {
            label.to_uppercase()
        }
    }

    traced! {
        fn nest(ctx: &TraceContext, levels: u32) -> u32 {
            if levels == 0 { 0 } else { 1 + nest(ctx, levels - 1) }
        }
    }

    traced! {
        fn validate_users(ctx: &TraceContext, users: &[u32]) -> Vec<u32> {
            users.iter().copied().filter(|u| u % 2 == 0).collect()
        }
    }

    traced! {
        fn score_users(ctx: &TraceContext, users: &[u32]) -> Vec<(u32, u32)> {
            users.iter().map(|u| (*u, u * 10)).collect()
        }
    }

    traced! {
        fn reserve(ctx: &TraceContext, quantity: u32) -> Result<u32, String> {
            if quantity > 10 {
                Err(format!("only 10 units available, requested {quantity}"))
            } else {
                Ok(quantity)
            }
        }
    }

    // ── Tests ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_n_nested_calls_produce_n_records_in_start_order() {
        let report = runner()
            .run(RunSpec::new("nest"), |ctx| Ok::<_, String>(nest(ctx, 6)))
            .await
            .unwrap();

        assert_eq!(report.result, 6);
        assert_eq!(report.traces.len(), 7);
        for (i, record) in report.traces.iter().enumerate() {
            assert_eq!(record.depth() as usize, i);
        }
    }

    #[tokio::test]
    async fn test_sequential_requests_are_isolated() {
        let runner = runner();
        let first = runner
            .run(RunSpec::new("first"), |ctx| {
                step(ctx, "a");
                step(ctx, "b");
                Ok::<_, String>(())
            })
            .await
            .unwrap();
        let second = runner
            .run(RunSpec::new("second"), |ctx| Ok::<_, String>(step(ctx, "c")))
            .await
            .unwrap();

        assert_eq!(first.traces.len(), 2);
        assert_eq!(second.traces.len(), 1);
        assert_eq!(second.traces[0].inputs()["label"].as_str(), Some("c"));
    }

    #[tokio::test]
    async fn test_pipeline_error_propagates_unchanged() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let runner = RequestRunner::new(
            Box::new(CountingAggregator { seen: seen.clone() }),
            Box::new(PlainFormatter),
            NarrativeConfig::default(),
        );

        let outcome = runner
            .run(RunSpec::new("checkout"), |ctx| {
                step(ctx, "validate");
                let reserved = reserve(ctx, 50)?;
                Ok::<_, String>(reserved)
            })
            .await;

        assert_eq!(outcome.unwrap_err(), "only 10 units available, requested 50");
        assert!(seen.lock().unwrap().is_empty(), "no envelope work after a failed pipeline");
    }

    #[tokio::test]
    async fn test_failed_call_inside_successful_pipeline_is_tagged() {
        let report = runner()
            .run(RunSpec::new("checkout"), |ctx| {
                let fallback = reserve(ctx, 50).unwrap_or(10);
                Ok::<_, String>(fallback)
            })
            .await
            .unwrap();

        assert_eq!(report.result, 10);
        assert_eq!(report.traces.len(), 1);
        assert!(report.traces[0].is_failed());
    }

    #[tokio::test]
    async fn test_two_stage_batch_pipeline_yields_two_records() {
        let users: Vec<u32> = (0..100).collect();
        let report = runner()
            .run(RunSpec::new("batch"), |ctx| {
                let valid = validate_users(ctx, &users);
                Ok::<_, String>(score_users(ctx, &valid))
            })
            .await
            .unwrap();

        assert_eq!(report.result.len(), 50);
        let names: Vec<&str> = report.traces.iter().map(|r| r.function()).collect();
        assert_eq!(names, vec!["validate_users", "score_users"]);
    }

    #[tokio::test]
    async fn test_without_generator_every_record_gets_fallback() {
        let report = runner()
            .run(RunSpec::new("plain"), |ctx| Ok::<_, String>(step(ctx, "x")))
            .await
            .unwrap();

        assert_eq!(report.traces[0].explanation(), Some("fallback for step"));
        assert_eq!(report.explain_text, "step: fallback for step");
    }

    #[tokio::test]
    async fn test_generator_text_is_attached() {
        let report = runner()
            .with_generator(Arc::new(EchoGenerator))
            .run(RunSpec::new("enriched"), |ctx| Ok::<_, String>(step(ctx, "x")))
            .await
            .unwrap();

        assert_eq!(report.traces[0].explanation(), Some("generated for step"));
    }

    #[tokio::test]
    async fn test_disabled_narrative_skips_generator() {
        let narrative = NarrativeConfig { enabled: false, ..NarrativeConfig::default() };
        let report = RequestRunner::new(Box::new(PassThrough), Box::new(PlainFormatter), narrative)
            .with_generator(Arc::new(EchoGenerator))
            .run(RunSpec::new("disabled"), |ctx| Ok::<_, String>(step(ctx, "x")))
            .await
            .unwrap();

        assert_eq!(report.traces[0].explanation(), Some("fallback for step"));
    }

    #[tokio::test]
    async fn test_failing_generator_falls_back() {
        let report = runner()
            .with_generator(Arc::new(FailingGenerator))
            .run(RunSpec::new("failing"), |ctx| Ok::<_, String>(step(ctx, "x")))
            .await
            .unwrap();

        assert!(!report.explain_text.is_empty());
        assert_eq!(report.traces[0].explanation(), Some("fallback for step"));
    }

    #[tokio::test]
    async fn test_partial_generator_output_is_mixed_per_record() {
        let generator = LimitedGenerator { budget: 1, calls: AtomicUsize::new(0) };
        let report = runner()
            .with_generator(Arc::new(generator))
            .run(RunSpec::new("mixed"), |ctx| {
                step(ctx, "a");
                step(ctx, "b");
                Ok::<_, String>(())
            })
            .await
            .unwrap();

        assert_eq!(report.traces[0].explanation(), Some("generated for step"));
        assert_eq!(report.traces[1].explanation(), Some("fallback for step"));
    }

    #[tokio::test]
    async fn test_slow_generator_is_bounded_by_one_deadline() {
        let started = std::time::Instant::now();
        let report = runner_with_timeout(50)
            .with_generator(Arc::new(SlowGenerator))
            .run(RunSpec::new("slow"), |ctx| {
                for label in ["a", "b", "c", "d"] {
                    step(ctx, label);
                }
                Ok::<_, String>("done")
            })
            .await
            .unwrap();

        assert!(started.elapsed() < std::time::Duration::from_secs(5));
        assert_eq!(report.result, "done");
        assert!(report
            .traces
            .iter()
            .all(|r| r.explanation() == Some("fallback for step")));
    }

    #[test]
    fn test_timeout_error_carries_configured_deadline() {
        let err = runner_with_timeout(75).timeout_error();
        assert!(matches!(err, ExplainError::GeneratorTimeout { timeout_ms: 75 }));
        assert_eq!(err.to_string(), "narrative generator timed out after 75ms");
    }

    #[tokio::test]
    async fn test_source_note_is_prefixed() {
        let report = runner()
            .run(
                RunSpec::new("upload").with_source_note("Processed 3 candidates from uploaded file"),
                |ctx| Ok::<_, String>(step(ctx, "x")),
            )
            .await
            .unwrap();

        assert!(report
            .explain_text
            .starts_with("SOURCE: Processed 3 candidates from uploaded file\n\n"));
    }

    #[tokio::test]
    async fn test_answer_uses_generator_or_apology() {
        let reply = runner()
            .with_generator(Arc::new(EchoGenerator))
            .answer("report", "why was tax 7%?")
            .await;
        assert_eq!(reply.response, "you asked: why was tax 7%?");

        assert_eq!(runner().answer("report", "q").await.response, CHAT_FALLBACK);

        let reply = runner()
            .with_generator(Arc::new(FailingGenerator))
            .answer("report", "q")
            .await;
        assert_eq!(reply.response, CHAT_FALLBACK);

        let reply = runner_with_timeout(50)
            .with_generator(Arc::new(SlowGenerator))
            .answer("report", "q")
            .await;
        assert_eq!(reply.response, CHAT_FALLBACK);
    }
}
