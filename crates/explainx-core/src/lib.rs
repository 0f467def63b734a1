//! # explainx-core
//!
//! The request-scoped call recorder and report runner for ExplainX.
//!
//! This crate provides:
//! - The three pipeline traits (`RecordAggregator`, `NarrativeGenerator`,
//!   `ReportFormatter`)
//! - `TraceBuffer`, the ordered per-request record store
//! - `TraceContext`, the recorder that traced calls go through
//! - The `traced!` macro for declaring traced functions
//! - `RequestRunner`, which turns a pipeline into an `ExecutionReport`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use explainx_core::{traced, RequestRunner, RunSpec, TraceContext};
//!
//! traced! {
//!     fn apply_discount(ctx: &TraceContext, price: f64, rate: f64) -> f64 {
//!         price * (1.0 - rate)
//!     }
//! }
//!
//! let report = runner
//!     .run(RunSpec::new("pricing"), |ctx| Ok::<_, String>(apply_discount(ctx, 100.0, 0.2)))
//!     .await?;
//! ```

#[macro_use]
mod macros;

pub mod buffer;
pub mod context;
pub mod runner;
pub mod traits;

pub use buffer::TraceBuffer;
pub use context::{traced_fn, CallSite, Inputs, TraceContext, TracedFn};
pub use runner::{NarrativeMode, RequestRunner, RunSpec, CHAT_FALLBACK};
