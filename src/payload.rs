//! Webhook body decoding.
//!
//! Provider webhooks arrive either as JSON or as URL-encoded form posts. Both
//! are decoded into a flat [`Payload`] whose accessors never fail on a
//! missing key; strictness is left to the provider adapters.

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while decoding a webhook body.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Invalid JSON payload: expected a JSON object")]
    NotAnObject,
}

/// Decoded webhook body as a flat key/value mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload(Map<String, Value>);

/// Decode `body` according to `content_type`.
///
/// Anything whose content type mentions `application/json` must be a JSON
/// object. Everything else is parsed as form data, which never fails.
pub fn decode(body: &[u8], content_type: &str) -> Result<Payload, DecodeError> {
    if is_json_content_type(content_type) {
        match serde_json::from_slice::<Value>(body)? {
            Value::Object(map) => Ok(Payload(map)),
            _ => Err(DecodeError::NotAnObject),
        }
    } else {
        Ok(decode_form(body))
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    content_type
        .to_ascii_lowercase()
        .contains("application/json")
}

fn decode_form(body: &[u8]) -> Payload {
    // Repeated keys keep the last value.
    let map = url::form_urlencoded::parse(body)
        .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
        .collect();
    Payload(map)
}

impl Payload {
    /// Raw value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Looks up `key` exactly, then falls back to an ASCII case-insensitive match.
    pub fn get_ignore_case(&self, key: &str) -> Option<&Value> {
        self.0.get(key).or_else(|| {
            self.0
                .iter()
                .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
                .map(|(_, value)| value)
        })
    }

    /// String form of `key`; missing or null values become an empty string.
    pub fn string(&self, key: &str) -> String {
        self.get(key).map(value_to_string).unwrap_or_default()
    }

    /// Truthiness of `key`: `true`, non-zero numbers and `"true"`/`"1"`/`"yes"`.
    pub fn flag(&self, key: &str) -> bool {
        match self.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
            Some(Value::String(s)) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "true" | "1" | "yes" | "y" | "on"
            ),
            _ => false,
        }
    }

    /// Integer value of `key`; anything non-numeric becomes 0.
    pub fn integer(&self, key: &str) -> i64 {
        match self.get(key) {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|v| v as i64))
                .unwrap_or(0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            Some(Value::Bool(b)) => i64::from(*b),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The payload as a JSON object, for audit logging.
    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Renders a JSON value the way the lenient accessors expose it.
pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
