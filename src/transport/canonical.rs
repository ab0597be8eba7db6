//! Canonical serialization of request payloads for signing
//!
//! Objects render as `k1=v1&k2=v2` with keys sorted lexicographically,
//! arrays as `v1&v2&...` positionally, null as the empty string, scalars by
//! their natural text. The same rule applies recursively at every level
//! with no extra delimiters, so an array entry that already reads `k=v`
//! is indistinguishable from an object pair. That is a quirk of the
//! server's wire format, preserved here rather than fixed.

use serde_json::Value;

use crate::error::CryptoError;

/// Renders any JSON value by the canonical rule.
pub fn canonical_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                u.to_string()
            } else if let Some(i) = n.as_i64() {
                i.to_string()
            } else {
                // shortest-form float rendering: 2.0 becomes "2"
                n.as_f64().map(|f| format!("{}", f)).unwrap_or_default()
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(canonical_value)
            .collect::<Vec<_>>()
            .join("&"),
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            keys.iter()
                .map(|k| format!("{}={}", k, canonical_value(&map[k.as_str()])))
                .collect::<Vec<_>>()
                .join("&")
        }
    }
}

/// Canonicalizes a JSON request body. The top level must be an object.
pub fn canonical_body(body: &str) -> Result<String, CryptoError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| CryptoError::Canonicalization(e.to_string()))?;
    match value {
        Value::Object(_) => Ok(canonical_value(&value)),
        _ => Err(CryptoError::Canonicalization(
            "request body must be a JSON object".into(),
        )),
    }
}

/// Canonicalizes a raw query string: the `k=v` tokens are sorted as-is.
pub fn canonical_query(raw: &str) -> String {
    let mut tokens: Vec<&str> = raw.split('&').filter(|t| !t.is_empty()).collect();
    tokens.sort_unstable();
    tokens.join("&")
}
