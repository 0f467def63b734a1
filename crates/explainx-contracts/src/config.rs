//! Tracer configuration and its TOML schema.
//!
//! Both sections are optional in the file; missing keys take their defaults.
//!
//! ```toml
//! [aggregation]
//! max_records_per_narrative = 25
//! collapse_strategy = "count+samples"
//! samples_per_group = 3
//!
//! [narrative]
//! enabled = true
//! timeout_ms = 30000
//! max_value_chars = 200
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ExplainError, ExplainResult};

/// How the aggregator summarizes a group of records it collapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollapseStrategy {
    /// Keep the true call count plus the first few inputs/outputs as samples.
    #[default]
    #[serde(rename = "count+samples")]
    CountSamples,
}

/// The cap on records forwarded to the narrative step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Upper bound on records handed to explanation per request. Must be ≥ 1.
    pub max_records_per_narrative: usize,
    pub collapse_strategy: CollapseStrategy,
    /// Member inputs/outputs kept on each collapsed record.
    pub samples_per_group: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            max_records_per_narrative: 25,
            collapse_strategy: CollapseStrategy::CountSamples,
            samples_per_group: 3,
        }
    }
}

/// Settings for the explanation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeConfig {
    /// When false the generator is never called and every record gets the
    /// deterministic fallback explanation.
    pub enabled: bool,
    /// Deadline for all generator calls of one request, in milliseconds.
    pub timeout_ms: u64,
    /// Longest rendering of a single value in narrative text.
    pub max_value_chars: usize,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: 30_000,
            max_value_chars: 200,
        }
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainConfig {
    pub aggregation: AggregationConfig,
    pub narrative: NarrativeConfig,
}

impl ExplainConfig {
    /// Parse and validate a TOML configuration document.
    pub fn from_toml_str(s: &str) -> ExplainResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| ExplainError::ConfigError {
            reason: format!("failed to parse config TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as TOML configuration.
    pub fn from_file(path: &Path) -> ExplainResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ExplainError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Reject values the pipeline cannot honor.
    pub fn validate(&self) -> ExplainResult<()> {
        if self.aggregation.max_records_per_narrative == 0 {
            return Err(ExplainError::ConfigError {
                reason: "aggregation.max_records_per_narrative must be at least 1".to_string(),
            });
        }
        if self.narrative.timeout_ms == 0 {
            return Err(ExplainError::ConfigError {
                reason: "narrative.timeout_ms must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
