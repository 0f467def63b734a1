//! Uploaded candidate files.
//!
//! Accepts either one JSON document (an array of candidates, an object that
//! wraps such an array, or a single candidate object) or JSON lines. Field
//! names from common export formats are mapped onto [`Application`]; lines or
//! entries that are not objects are skipped.

use std::path::Path;

use rand::Rng;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use explainx_contracts::error::{ExplainError, ExplainResult};

use crate::functions::resume::Application;

/// Read and parse a candidate file from disk.
pub fn load_candidate_file<R: Rng>(path: &Path, rng: &mut R) -> ExplainResult<Vec<Application>> {
    let content = std::fs::read_to_string(path).map_err(|e| ExplainError::InvalidInput {
        reason: format!("failed to read candidate file '{}': {}", path.display(), e),
    })?;
    Ok(parse_candidate_file(&content, rng))
}

/// Parse uploaded candidate data into applications.
///
/// `rng` supplies IDs for entries that carry none.
pub fn parse_candidate_file<R: Rng>(content: &str, rng: &mut R) -> Vec<Application> {
    let entries = match serde_json::from_str::<Value>(content) {
        Ok(document) => document_entries(document),
        Err(e) => {
            debug!(error = %e, "not a single JSON document; reading as JSON lines");
            json_lines(content)
        }
    };

    let candidates: Vec<Application> = entries
        .iter()
        .filter_map(Value::as_object)
        .map(|item| normalize(item, rng))
        .collect();

    if candidates.len() < entries.len() {
        warn!(
            skipped = entries.len() - candidates.len(),
            "candidate entries that are not objects were skipped"
        );
    }
    candidates
}

fn document_entries(document: Value) -> Vec<Value> {
    match document {
        Value::Array(items) => items,
        Value::Object(map) => {
            // A wrapper such as {"candidates": [...]}: take the first list.
            if let Some(items) = map.values().find_map(|v| v.as_array()) {
                return items.clone();
            }
            vec![Value::Object(map)]
        }
        _ => Vec::new(),
    }
}

fn json_lines(content: &str) -> Vec<Value> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect()
}

fn normalize<R: Rng>(item: &Map<String, Value>, rng: &mut R) -> Application {
    let id = match item.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => format!("UPLOAD-{}", rng.gen_range(1000..=9999)),
        Some(other) => other.to_string(),
    };

    Application {
        id,
        name: first_text(item, &["name"]).unwrap_or_else(|| "Unknown Candidate".to_string()),
        email: first_text(item, &["email", "gmail"])
            .unwrap_or_else(|| "no-email@example.com".to_string()),
        // Uploads count as verified unless they say otherwise.
        verified: item.get("verified").map_or(true, truthy),
        experience_years: first_number(item, &["experience_years", "domain experience"]),
        domain: first_text(item, &["domain", "role"])
            .map(|d| d.to_lowercase().replace(' ', "_"))
            .unwrap_or_else(|| "unknown".to_string()),
        current_salary: first_number(item, &["current_salary", "current salary"]),
        expected_salary: first_number(item, &["expected_salary", "expected salary"]),
        cgpa: first_number(item, &["cgpa"]),
    }
}

/// The first non-empty string among `keys`.
fn first_text(item: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| item.get(*k))
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
}

/// The first non-zero number among `keys`; numeric strings count. Zero if none.
fn first_number(item: &Map<String, Value>, keys: &[&str]) -> f64 {
    keys.iter()
        .filter_map(|k| item.get(*k))
        .filter_map(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .find(|n| *n != 0.0)
        .unwrap_or(0.0)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
