//! # explainx-aggregate
//!
//! Bounds how many records one request hands to the narrative step.
//!
//! ## Overview
//!
//! This crate provides [`Aggregator`], which implements the
//! [`RecordAggregator`](explainx_core::traits::RecordAggregator) trait. A
//! pipeline written in batch style (one traced call per stage) is already
//! small and passes through untouched. A pipeline that traces every item of a
//! loop is collapsed into per-function summaries that keep the true call
//! count, the summed duration, and a few sample inputs and outputs.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use explainx_aggregate::Aggregator;
//!
//! let aggregator = Aggregator::from_toml_str(r#"
//!     [aggregation]
//!     max_records_per_narrative = 25
//! "#)?;
//! // Pass `Box::new(aggregator)` to `explainx_core::RequestRunner::new(...)`.
//! ```

pub mod engine;
pub mod summary;

pub use engine::Aggregator;
pub use summary::{overflow_label, summarize};

// ── Tests ─────────────────────────────────────────────────────────────────────
