//! Wire types exchanged with the control plane.
//!
//! Field names follow the control plane's JSON conventions (`statusCode`,
//! `_mode`, `callbackURL`), so every type carries explicit serde renames.

use std::collections::BTreeMap;
use std::fmt;

use hyper::HeaderMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Status code used when neither the response nor the defaults set one.
pub const DEFAULT_STATUS_CODE: u16 = 200;

/// A query parameter or header value: single, or repeated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    One(String),
    Many(Vec<String>),
}

impl FieldValue {
    /// Iterate over every value, in order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let slice = match self {
            FieldValue::One(value) => std::slice::from_ref(value),
            FieldValue::Many(values) => values.as_slice(),
        };
        slice.iter().map(String::as_str)
    }

    /// Add another occurrence, promoting a single value to a list.
    pub fn push(&mut self, value: String) {
        match self {
            FieldValue::One(existing) => {
                let first = std::mem::take(existing);
                *self = FieldValue::Many(vec![first, value]);
            }
            FieldValue::Many(values) => values.push(value),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::One(value.to_string())
    }
}

// Control planes are loose about header types (`"content-length": 5`), so
// scalars are stringified instead of rejected.
impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .map(scalar_to_string)
                .collect::<Option<Vec<_>>>()
                .map(FieldValue::Many)
                .ok_or_else(|| serde::de::Error::custom("list values must be scalars")),
            other => scalar_to_string(other)
                .map(FieldValue::One)
                .ok_or_else(|| serde::de::Error::custom("expected a string or list of strings")),
        }
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Header or query mapping, keyed by lowercase name for headers.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Collect an HTTP header map into a [`FieldMap`].
///
/// Repeated headers are joined with `", "`, except `set-cookie` which keeps
/// each occurrence as a list entry. Values that are not visible ASCII are
/// decoded lossily.
pub fn header_fields(headers: &HeaderMap) -> FieldMap {
    let mut fields = FieldMap::new();
    for name in headers.keys() {
        let values: Vec<String> = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();
        let value = if *name == hyper::header::SET_COOKIE {
            FieldValue::Many(values)
        } else if values.len() == 1 {
            FieldValue::One(values.into_iter().next().unwrap_or_default())
        } else {
            FieldValue::One(values.join(", "))
        };
        fields.insert(name.as_str().to_string(), value);
    }
    fields
}

/// Immutable snapshot of one inbound request.
///
/// Also deserialized from the control plane when it hands back a (possibly
/// rewritten) request to replay upstream, hence the defaults on every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalRequest {
    /// Peer IP address of the inbound connection.
    pub ip: String,
    pub method: String,
    /// Path component only; the query string is parsed into `query`.
    pub path: String,
    pub query: FieldMap,
    pub headers: FieldMap,
    pub body: String,
}

impl Default for CanonicalRequest {
    fn default() -> Self {
        Self {
            ip: String::new(),
            method: "GET".to_string(),
            path: "/".to_string(),
            query: FieldMap::new(),
            headers: FieldMap::new(),
            body: String::new(),
        }
    }
}

/// How a response body is encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// Body is written as UTF-8 text.
    #[default]
    Text,
    /// Body is base64 and decoded before writing.
    Binary,
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseMode::Text => write!(f, "text"),
            ResponseMode::Binary => write!(f, "binary"),
        }
    }
}

/// Partial response description from the control plane or the forwarder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSpec {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::status_code"
    )]
    pub status_code: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<FieldMap>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::body"
    )]
    pub body: Option<String>,

    #[serde(default, rename = "_mode", skip_serializing_if = "Option::is_none")]
    pub mode: Option<ResponseMode>,

    /// Set when the control plane refuses to answer this connection.
    #[serde(
        default,
        skip_serializing_if = "std::ops::Not::not",
        deserialize_with = "lenient::truthy"
    )]
    pub blocked: bool,
}

/// A response with every field populated, ready to be written.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedResponse {
    pub status_code: u16,
    pub headers: FieldMap,
    pub body: String,
    #[serde(rename = "_mode")]
    pub mode: ResponseMode,
}

impl From<CompletedResponse> for ResponseSpec {
    fn from(response: CompletedResponse) -> Self {
        Self {
            status_code: Some(response.status_code),
            headers: Some(response.headers),
            body: Some(response.body),
            mode: Some(response.mode),
            blocked: false,
        }
    }
}

/// JavaScript-style truthiness, which is how the control plane flags values.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

mod lenient {
    use serde::{de::Error, Deserialize, Deserializer};
    use serde_json::Value;

    pub fn status_code<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u16>, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Ok(None),
            Value::Number(n) => n
                .as_u64()
                .and_then(|code| u16::try_from(code).ok())
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid status code {n}"))),
            Value::String(s) => s
                .trim()
                .parse::<u16>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid status code {s:?}"))),
            other => Err(D::Error::custom(format!("invalid status code {other}"))),
        }
    }

    pub fn body<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
    }

    pub fn truthy<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(super::is_truthy(&Value::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_spec_accepts_loose_json() {
        let spec: ResponseSpec = serde_json::from_value(json!({
            "statusCode": "404",
            "headers": { "content-length": 2, "set-cookie": ["a=1", "b=2"] },
            "body": { "ok": true },
            "_mode": "text"
        }))
        .unwrap();

        assert_eq!(spec.status_code, Some(404));
        let headers = spec.headers.unwrap();
        assert_eq!(headers["content-length"], FieldValue::from("2"));
        assert_eq!(
            headers["set-cookie"],
            FieldValue::Many(vec!["a=1".into(), "b=2".into()])
        );
        assert_eq!(spec.body.as_deref(), Some(r#"{"ok":true}"#));
        assert!(!spec.blocked);
    }

    #[test]
    fn blocked_marker_uses_truthiness() {
        let blocked: ResponseSpec = serde_json::from_value(json!({ "blocked": 1 })).unwrap();
        let open: ResponseSpec = serde_json::from_value(json!({ "blocked": "" })).unwrap();
        assert!(blocked.blocked);
        assert!(!open.blocked);
    }

    #[test]
    fn canonical_request_fills_missing_fields() {
        let request: CanonicalRequest =
            serde_json::from_value(json!({ "path": "/replay", "body": "x" })).unwrap();
        assert_eq!(request.method, "GET");
        assert_eq!(request.path, "/replay");
        assert!(request.headers.is_empty());
    }

    #[test]
    fn repeated_headers_are_joined_except_cookies() {
        let mut headers = HeaderMap::new();
        headers.append("accept", "text/html".parse().unwrap());
        headers.append("accept", "application/json".parse().unwrap());
        headers.append("set-cookie", "a=1".parse().unwrap());

        let fields = header_fields(&headers);
        assert_eq!(fields["accept"], FieldValue::from("text/html, application/json"));
        assert_eq!(fields["set-cookie"], FieldValue::Many(vec!["a=1".into()]));
    }

    #[test]
    fn field_value_push_promotes_to_list() {
        let mut value = FieldValue::from("a");
        value.push("b".into());
        assert_eq!(value.values().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
