//! Traced business functions.
//!
//! Every public function here is declared with `traced!`, so each call made
//! with a request's `TraceContext` leaves one record in that request's trace.

pub mod inventory;
pub mod pricing;
pub mod resume;
pub mod tax;
pub mod validation;

/// Round a currency amount to cents.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
