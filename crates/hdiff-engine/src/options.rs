//! Request, response and option types shared by all engines.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EngineError;

/// Engine-specific options of a diff call.
///
/// Values are loosely typed, as they usually arrive as JSON. Engines read
/// them through the coercing getters and ignore keys they do not know.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiffOptions(BTreeMap<String, Value>);

impl DiffOptions {
    /// Create an empty option set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an option, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set an option, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Raw value of an option.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over options in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Read a numeric option.
    ///
    /// Numbers and numeric strings are accepted. A missing or `null` value
    /// yields `None`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidOption` for any other value.
    pub fn get_number(&self, key: &str) -> Result<Option<f64>, EngineError> {
        let parsed = match self.0.get(key) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            Some(_) => None,
        };
        match parsed {
            Some(n) if n.is_finite() => Ok(Some(n)),
            _ => Err(invalid(key, "expected a number")),
        }
    }

    /// Read a boolean option.
    ///
    /// Accepts booleans, the numbers `0` and `1`, and the strings `true`,
    /// `false`, `1` and `0`. A missing or `null` value yields `None`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidOption` for any other value.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, EngineError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::Number(n)) => match n.as_u64() {
                Some(0) => Ok(Some(false)),
                Some(1) => Ok(Some(true)),
                _ => Err(invalid(key, "expected a boolean")),
            },
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Some(true)),
                "false" | "0" => Ok(Some(false)),
                _ => Err(invalid(key, "expected a boolean")),
            },
            Some(_) => Err(invalid(key, "expected a boolean")),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for DiffOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

fn invalid(key: &str, message: &str) -> EngineError {
    EngineError::InvalidOption {
        option: key.to_owned(),
        message: message.to_owned(),
    }
}

/// Value type of an engine option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Number,
    Boolean,
    String,
}

impl OptionKind {
    /// Name as used in discovery output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::String => "string",
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discovery description of one engine option.
///
/// Serializes as `{"type": "number", "default": 80}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub default: Value,
}

impl OptionSpec {
    #[must_use]
    pub fn number(default: impl Into<Value>) -> Self {
        Self {
            kind: OptionKind::Number,
            default: default.into(),
        }
    }

    #[must_use]
    pub fn boolean(default: bool) -> Self {
        Self {
            kind: OptionKind::Boolean,
            default: Value::Bool(default),
        }
    }

    #[must_use]
    pub fn string(default: impl Into<String>) -> Self {
        Self {
            kind: OptionKind::String,
            default: Value::String(default.into()),
        }
    }
}

/// Presentation metadata of an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineMetadata {
    /// Where the engine comes from.
    pub url: String,
    /// Display name.
    pub pretty_name: String,
    /// One-sentence description.
    pub description: String,
}

/// A diff request as received from a calling layer.
///
/// JSON field names follow the web payload: `htmlOld`, `htmlNew`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffRequest {
    /// Engine name. Empty means "use the configured default".
    #[serde(default)]
    pub engine: String,
    #[serde(default)]
    pub html_old: String,
    #[serde(default)]
    pub html_new: String,
    #[serde(default, skip_serializing_if = "DiffOptions::is_empty")]
    pub options: DiffOptions,
}

/// Result of a diff request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResponse {
    pub html_diff: String,
}
