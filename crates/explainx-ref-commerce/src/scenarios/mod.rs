//! Reference scenarios run as traced requests.
//!
//! Each `run_*` function hands one pipeline to a [`RequestRunner`] and returns
//! the resulting envelope. `build_runner` wires the stock aggregator and text
//! formatter from an [`ExplainConfig`].

pub mod checkout;
pub mod resume;

use explainx_aggregate::Aggregator;
use explainx_contracts::{
    config::ExplainConfig,
    error::{ExplainError, ExplainResult},
    report::ExecutionReport,
};
use explainx_core::{RequestRunner, RunSpec};
use explainx_narrative::TextReportFormatter;

use crate::functions::resume::JobDescription;

use self::{
    checkout::{process_checkout, simple_checkout, CheckoutOutcome, CheckoutRequest, SimpleCheckout},
    resume::{select_candidates, CandidateSource, SelectionResult},
};

/// A runner with the default aggregator and formatter and no generator.
pub fn build_runner(config: &ExplainConfig) -> RequestRunner {
    RequestRunner::new(
        Box::new(Aggregator::new(config.aggregation.clone())),
        Box::new(TextReportFormatter::from_config(&config.narrative)),
        config.narrative.clone(),
    )
}

/// Negative and non-finite prices are refused before any traced call runs.
pub async fn run_simple_checkout(
    runner: &RequestRunner,
    price: f64,
    user_type: &str,
) -> ExplainResult<ExecutionReport<SimpleCheckout>> {
    if !price.is_finite() || price < 0.0 {
        return Err(ExplainError::InvalidInput {
            reason: format!("price must be a non-negative number, got {}", price),
        });
    }
    runner
        .run(RunSpec::new("checkout-simple"), |ctx| {
            Ok::<_, ExplainError>(simple_checkout(ctx, price, user_type))
        })
        .await
}

pub async fn run_full_checkout(
    runner: &RequestRunner,
    request: &CheckoutRequest,
) -> ExplainResult<ExecutionReport<CheckoutOutcome>> {
    runner
        .run(RunSpec::new("checkout-full"), |ctx| {
            Ok::<_, ExplainError>(process_checkout(ctx, request))
        })
        .await
}

pub async fn run_resume_selection(
    runner: &RequestRunner,
    jd: &JobDescription,
    source: CandidateSource,
) -> ExplainResult<ExecutionReport<SelectionResult>> {
    let spec = RunSpec::new("resume-select").with_source_note(source.note());
    runner
        .run(spec, |ctx| Ok::<_, ExplainError>(select_candidates(ctx, jd, source)))
        .await
}
