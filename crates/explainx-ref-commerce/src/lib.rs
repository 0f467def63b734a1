//! # explainx-ref-commerce
//!
//! Commerce reference pipelines for the ExplainX function tracer.
//!
//! Two request types exercise the tracer with realistic call shapes:
//!
//! 1. **Checkout**: a short simple flow and an eleven-step full flow, where
//!    each pricing, inventory and tax function is one traced call.
//! 2. **Resume selection**: batch-style screening, one traced call per stage
//!    over the whole applicant list, fed by an uploaded file or the seeded
//!    applicant generator.
//!
//! All data is hardcoded and fictional. No external systems are contacted.

pub mod candidates;
pub mod functions;
pub mod mock_data;
pub mod scenarios;
