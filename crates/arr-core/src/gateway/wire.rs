//! JSON shapes of the Identity Toolkit and Firestore REST responses, and
//! their conversion into domain records.

use std::collections::BTreeMap;

use arr_common::{Document, Error, FieldValue, Result, UserRecord};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// `accounts:batchGet` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BatchGetResponse {
    #[serde(default)]
    pub users: Vec<UserInfo>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserInfo {
    pub local_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    /// Epoch milliseconds as a decimal string.
    pub created_at: Option<String>,
    /// Epoch milliseconds as a decimal string.
    pub last_login_at: Option<String>,
    /// RFC 3339.
    pub last_refresh_at: Option<String>,
}

impl UserInfo {
    pub fn into_record(self) -> Result<UserRecord> {
        let what = || format!("user {}", self.local_id);
        let created_at_ms = parse_millis(self.created_at.as_deref(), "createdAt", &what)?;
        let last_login_at_ms = parse_millis(self.last_login_at.as_deref(), "lastLoginAt", &what)?;
        let last_refresh_at_ms = match self.last_refresh_at.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(
                parse_rfc3339(raw)
                    .map_err(|e| Error::decode(what(), format!("lastRefreshAt: {e}")))?
                    .timestamp_millis(),
            ),
        };

        Ok(UserRecord {
            uid: self.local_id,
            email: self.email,
            display_name: self.display_name,
            disabled: self.disabled,
            created_at_ms: created_at_ms.unwrap_or(0),
            last_login_at_ms,
            last_refresh_at_ms,
        })
    }
}

fn parse_millis(
    raw: Option<&str>,
    field: &str,
    what: &dyn Fn() -> String,
) -> Result<Option<i64>> {
    match raw {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| Error::decode(what(), format!("{field} is not an integer: {raw:?}"))),
    }
}

fn parse_rfc3339(raw: &str) -> std::result::Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|ts| ts.with_timezone(&Utc))
}

/// `documents.list` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListDocumentsResponse {
    #[serde(default)]
    pub documents: Vec<WireDocument>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireDocument {
    /// Full resource name; the document id is the last path segment.
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

impl WireDocument {
    pub fn into_document(self) -> Result<Document> {
        let id = self
            .name
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();

        let mut fields = BTreeMap::new();
        for (key, value) in &self.fields {
            let decoded = decode_value(value)
                .map_err(|e| Error::decode(format!("document {id}"), format!("field '{key}': {e}")))?;
            fields.insert(key.clone(), decoded);
        }
        Ok(Document::new(id, fields))
    }
}

/// Decode one typed Firestore `Value`.
pub(crate) fn decode_value(value: &Value) -> std::result::Result<FieldValue, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| format!("expected a typed value object, got {value}"))?;
    let (kind, inner) = obj
        .iter()
        .next()
        .ok_or_else(|| "empty value object".to_string())?;

    match kind.as_str() {
        "nullValue" => Ok(FieldValue::Null),
        "booleanValue" => inner
            .as_bool()
            .map(FieldValue::Bool)
            .ok_or_else(|| format!("booleanValue is {inner}")),
        "integerValue" => match inner {
            Value::String(s) => s
                .parse()
                .map(FieldValue::Integer)
                .map_err(|_| format!("integerValue {s:?} out of range")),
            Value::Number(n) => n
                .as_i64()
                .map(FieldValue::Integer)
                .ok_or_else(|| format!("integerValue {n} out of range")),
            other => Err(format!("integerValue is {other}")),
        },
        "doubleValue" => match inner {
            Value::Number(n) => n
                .as_f64()
                .map(FieldValue::Double)
                .ok_or_else(|| format!("doubleValue {n} not representable")),
            Value::String(s) => match s.as_str() {
                "NaN" => Ok(FieldValue::Double(f64::NAN)),
                "Infinity" => Ok(FieldValue::Double(f64::INFINITY)),
                "-Infinity" => Ok(FieldValue::Double(f64::NEG_INFINITY)),
                other => Err(format!("doubleValue {other:?}")),
            },
            other => Err(format!("doubleValue is {other}")),
        },
        "timestampValue" => {
            let raw = inner
                .as_str()
                .ok_or_else(|| format!("timestampValue is {inner}"))?;
            parse_rfc3339(raw)
                .map(FieldValue::Timestamp)
                .map_err(|e| format!("timestampValue {raw:?}: {e}"))
        }
        "stringValue" => string_of(inner, kind).map(FieldValue::String),
        "bytesValue" => string_of(inner, kind).map(FieldValue::Bytes),
        "referenceValue" => string_of(inner, kind).map(FieldValue::Reference),
        "geoPointValue" => Ok(FieldValue::GeoPoint {
            latitude: inner.get("latitude").and_then(Value::as_f64).unwrap_or(0.0),
            longitude: inner.get("longitude").and_then(Value::as_f64).unwrap_or(0.0),
        }),
        "arrayValue" => {
            let values = match inner.get("values") {
                Some(Value::Array(values)) => values
                    .iter()
                    .map(decode_value)
                    .collect::<std::result::Result<Vec<_>, _>>()?,
                _ => Vec::new(),
            };
            Ok(FieldValue::Array(values))
        }
        "mapValue" => {
            let mut fields = BTreeMap::new();
            if let Some(Value::Object(entries)) = inner.get("fields") {
                for (key, value) in entries {
                    fields.insert(key.clone(), decode_value(value)?);
                }
            }
            Ok(FieldValue::Map(fields))
        }
        other => Err(format!("unsupported value type {other}")),
    }
}

fn string_of(inner: &Value, kind: &str) -> std::result::Result<String, String> {
    inner
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| format!("{kind} is {inner}"))
}

/// Convert a failed HTTP call into a domain error.
///
/// Non-2xx responses are wrapped with `wrap` (auth vs. store); connection
/// level failures become [`Error::Transport`].
pub(crate) fn http_error(err: ureq::Error, wrap: fn(String) -> Error) -> Error {
    match err {
        ureq::Error::Status(code, response) => {
            let body = response.into_string().unwrap_or_default();
            wrap(format!("HTTP {code}: {}", google_message(&body)))
        }
        ureq::Error::Transport(transport) => Error::Transport(transport.to_string()),
    }
}

/// Pull `error.message` out of a Google API error body, or fall back to a
/// truncated copy of the body.
pub(crate) fn google_message(body: &str) -> String {
    let parsed: Option<String> = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        let error = v.get("error")?;
        error
            .get("message")
            .or_else(|| v.get("error_description"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| error.as_str().map(str::to_string))
    });
    parsed.unwrap_or_else(|| body.chars().take(200).collect())
}
