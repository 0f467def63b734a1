//! Error types for the ExplainX tracing pipeline.
//!
//! Library operations return `ExplainResult<T>`. Business pipelines keep
//! their own error types; the tracer hands those back untouched and only
//! uses `ExplainError` for its own failures.

use thiserror::Error;

/// The unified error type for the ExplainX crates.
#[derive(Debug, Error)]
pub enum ExplainError {
    /// A configuration value is missing, malformed, or out of range.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// Caller-supplied input could not be parsed or normalized.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// A second explanation was attached to a record that already has one.
    #[error("explanation already attached to record for '{function}'")]
    ExplanationAlreadyAttached { function: String },

    /// The narrative generator returned an error.
    #[error("narrative generator failed: {reason}")]
    Generator { reason: String },

    /// The narrative generator did not answer within its deadline.
    #[error("narrative generator timed out after {timeout_ms}ms")]
    GeneratorTimeout { timeout_ms: u64 },
}

/// Convenience alias used throughout the ExplainX crates.
pub type ExplainResult<T> = Result<T, ExplainError>;
