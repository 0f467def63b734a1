//! Captured argument and return-value snapshots.
//!
//! `TraceValue` is the tagged representation of everything the recorder
//! captures. It is a detached copy: once built it no longer refers to the
//! value it was taken from, so later mutation of that value cannot change
//! what the trace says happened.
//!
//! Serialization is plain JSON (`untagged`): `Null` → `null`, `Int` → an
//! integer literal, `Float` → a number with a fractional part, `Map` → an
//! object with keys in insertion order. Unsigned integers above `i64::MAX`
//! are captured as `Float`.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A JSON-like snapshot of a captured value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraceValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<TraceValue>),
    Map(IndexMap<String, TraceValue>),
}

impl TraceValue {
    /// Snapshot any serializable value.
    ///
    /// Returns the serializer's error unchanged so the caller can decide how
    /// to report it; most callers want [`TraceValue::capture`] instead.
    pub fn try_capture<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::from)
    }

    /// Snapshot any serializable value, degrading to a placeholder string
    /// when its `Serialize` impl fails.
    pub fn capture<T: Serialize + ?Sized>(value: &T) -> Self {
        match Self::try_capture(value) {
            Ok(v) => v,
            Err(e) => Self::placeholder(std::any::type_name::<T>(), &e.to_string()),
        }
    }

    /// The marker recorded in place of a value that could not be captured.
    pub fn placeholder(type_name: &str, reason: &str) -> Self {
        Self::String(format!("<unserializable {type_name}: {reason}>"))
    }

    /// Build a map value from `(key, value)` pairs, preserving their order.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, TraceValue)>,
    {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of `Int` and `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[TraceValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, TraceValue>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up `key` when this value is a map.
    pub fn get(&self, key: &str) -> Option<&TraceValue> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Compact JSON text of this value.
    pub fn to_json_string(&self) -> String {
        // Non-finite floats serialize as `null`; nothing else in the enum can
        // make the serializer fail.
        serde_json::to_string(self).unwrap_or_else(|_| "null".to_string())
    }

    /// Human-readable rendering for reports.
    ///
    /// Strings render raw, everything else as compact JSON. Output longer
    /// than `max_chars` characters is cut and suffixed with the size of the
    /// original value.
    pub fn render(&self, max_chars: usize) -> String {
        let full = match self {
            Self::String(s) => s.clone(),
            other => other.to_json_string(),
        };
        let total = full.chars().count();
        if total <= max_chars {
            return full;
        }

        let head: String = full.chars().take(max_chars).collect();
        match self {
            Self::List(items) => format!("{head}… ({} items)", items.len()),
            Self::Map(entries) => format!("{head}… ({} keys)", entries.len()),
            _ => format!("{head}… ({total} chars)"),
        }
    }
}

impl fmt::Display for TraceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(usize::MAX))
    }
}

impl From<serde_json::Value> for TraceValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map(Self::Float).unwrap_or(Self::Null),
            },
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(entries) => {
                Self::Map(entries.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&str> for TraceValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for TraceValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for TraceValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for TraceValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<u64> for TraceValue {
    fn from(u: u64) -> Self {
        i64::try_from(u).map(Self::Int).unwrap_or(Self::Float(u as f64))
    }
}

impl From<usize> for TraceValue {
    fn from(u: usize) -> Self {
        Self::from(u as u64)
    }
}

impl From<f64> for TraceValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<Vec<TraceValue>> for TraceValue {
    fn from(items: Vec<TraceValue>) -> Self {
        Self::List(items)
    }
}
