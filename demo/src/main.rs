//! ExplainX Commerce Reference: Demo CLI
//!
//! Runs the commerce pipelines as traced requests and prints the envelope
//! (`result`, `traces`, `explain_text`) as JSON, or only the report text.
//!
//! Usage:
//!   cargo run -p explainx-demo -- checkout-simple --price 100 --user-type premium
//!   cargo run -p explainx-demo -- checkout-full --product-id LAPTOP-001 --quantity 2 \
//!       --user-type premium --state CA --promo-code SAVE10
//!   cargo run -p explainx-demo -- --text resume-select --domain backend \
//!       --min-experience 2 --salary-budget 120000 --count 500 --seed 7
//!   cargo run -p explainx-demo -- products

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use explainx_contracts::{
    config::ExplainConfig,
    error::{ExplainError, ExplainResult},
    report::ExecutionReport,
};
use explainx_core::RequestRunner;
use explainx_ref_commerce::{
    candidates::load_candidate_file,
    functions::resume::JobDescription,
    mock_data,
    scenarios::{
        build_runner,
        checkout::CheckoutRequest,
        resume::{CandidateSource, DEFAULT_SIMULATION_COUNT},
        run_full_checkout, run_resume_selection, run_simple_checkout,
    },
};

const DEFAULT_CONFIG: &str = include_str!("../../config/explainx.toml");

// ── CLI definition ────────────────────────────────────────────────────────────

/// ExplainX: traced commerce pipelines with plain-language reports.
#[derive(Parser)]
#[command(
    name = "explainx-demo",
    about = "ExplainX commerce reference demo",
    long_about = "Runs checkout and resume-selection pipelines with every business\n\
                  function traced, then prints the result, the call trace and the\n\
                  execution report."
)]
struct Cli {
    /// Tracer configuration (TOML). Defaults to the bundled config.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print only the report text instead of the full JSON envelope.
    #[arg(long, global = true)]
    text: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Tier discount and default tax on one price.
    CheckoutSimple {
        #[arg(long)]
        price: f64,
        #[arg(long)]
        user_type: String,
    },
    /// The full eleven-step checkout for one product line.
    CheckoutFull {
        #[arg(long)]
        product_id: String,
        #[arg(long)]
        quantity: i64,
        #[arg(long)]
        user_type: String,
        #[arg(long)]
        state: String,
        #[arg(long)]
        promo_code: Option<String>,
        #[arg(long)]
        express: bool,
    },
    /// Screen candidates from a file, or simulated ones, against a role.
    ResumeSelect {
        #[arg(long)]
        domain: String,
        #[arg(long)]
        min_experience: f64,
        #[arg(long)]
        salary_budget: f64,
        /// Candidate file: JSON array, object holding an array, or JSON lines.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Applicants to simulate when no file is given.
        #[arg(long, default_value_t = DEFAULT_SIMULATION_COUNT)]
        count: usize,
        /// Seed for the simulated applicants. Random when omitted.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List the product catalog.
    Products,
    /// List the promo codes.
    PromoCodes,
    /// List the customer types and their discounts.
    UserTypes,
    /// List the states with a sales tax rate.
    States,
    /// Service health.
    Health,
    /// Ask a question about a saved report.
    Chat {
        /// A saved envelope (JSON) or report text.
        #[arg(long)]
        report: PathBuf,
        #[arg(long)]
        query: String,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> ExplainResult<()> {
    let config = match &cli.config {
        Some(path) => ExplainConfig::from_file(path)?,
        None => ExplainConfig::from_toml_str(DEFAULT_CONFIG)?,
    };
    let runner = build_runner(&config);

    match cli.command {
        Command::CheckoutSimple { price, user_type } => {
            let report = run_simple_checkout(&runner, price, &user_type).await?;
            print_report(&report, cli.text)
        }
        Command::CheckoutFull { product_id, quantity, user_type, state, promo_code, express } => {
            let request = CheckoutRequest { product_id, quantity, user_type, state, promo_code, express };
            let report = run_full_checkout(&runner, &request).await?;
            print_report(&report, cli.text)
        }
        Command::ResumeSelect { domain, min_experience, salary_budget, file, count, seed } => {
            let jd = JobDescription { domain, min_experience, salary_budget };
            let source = match file {
                Some(path) => CandidateSource::Upload(load_candidate_file(&path, &mut rand::thread_rng())?),
                None => {
                    let seed = seed.unwrap_or_else(rand::random);
                    info!(seed, count, "simulating applicants");
                    CandidateSource::Simulation { count, seed }
                }
            };
            let report = run_resume_selection(&runner, &jd, source).await?;
            print_report(&report, cli.text)
        }
        Command::Products => print_json(&mock_data::product_listing()),
        Command::PromoCodes => print_json(&mock_data::promo_code_listing()),
        Command::UserTypes => print_json(&mock_data::user_type_listing()),
        Command::States => print_json(&mock_data::state_listing()),
        Command::Health => print_json(&mock_data::health()),
        Command::Chat { report, query } => chat(&runner, &report, &query).await,
    }
}

// ── Output ────────────────────────────────────────────────────────────────────

fn print_report<R: Serialize>(report: &ExecutionReport<R>, text_only: bool) -> ExplainResult<()> {
    if text_only {
        println!("{}", report.explain_text);
        return Ok(());
    }
    print_json(report)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> ExplainResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| ExplainError::InvalidInput {
        reason: format!("failed to serialize output: {}", e),
    })?;
    println!("{}", json);
    Ok(())
}

async fn chat(runner: &RequestRunner, path: &Path, query: &str) -> ExplainResult<()> {
    let contents = std::fs::read_to_string(path).map_err(|e| ExplainError::InvalidInput {
        reason: format!("failed to read report '{}': {}", path.display(), e),
    })?;

    // A saved envelope carries its report under `explain_text`.
    let report_text = serde_json::from_str::<serde_json::Value>(&contents)
        .ok()
        .and_then(|v| v.get("explain_text").and_then(|t| t.as_str()).map(str::to_string))
        .unwrap_or(contents);

    let reply = runner.answer(&report_text, query).await;
    print_json(&reply)
}
