//! Domain records fetched from Firebase.
//!
//! Users are a fixed shape. Firestore documents are schemaless, so they come
//! back as a raw [`Document`] and are turned into typed records by a decode
//! function registered per collection ([`CollectionSpec`]).

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Snapshot of one Firebase Authentication user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub disabled: bool,
    /// Account creation time, epoch milliseconds.
    pub created_at_ms: i64,
    /// Last sign-in, epoch milliseconds.
    pub last_login_at_ms: Option<i64>,
    /// Last token refresh, epoch milliseconds.
    pub last_refresh_at_ms: Option<i64>,
}

impl UserRecord {
    /// Minimal record with only the uid and creation time set.
    pub fn new(uid: impl Into<String>, created_at_ms: i64) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
            disabled: false,
            created_at_ms,
            last_login_at_ms: None,
            last_refresh_at_ms: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_last_login(mut self, ms: i64) -> Self {
        self.last_login_at_ms = Some(ms);
        self
    }

    pub fn with_last_refresh(mut self, ms: i64) -> Self {
        self.last_refresh_at_ms = Some(ms);
        self
    }
}

/// Sort users by creation timestamp, oldest first.
///
/// Stable, so users created in the same millisecond keep their fetch order.
pub fn sort_by_creation(users: &mut [UserRecord]) {
    users.sort_by_key(|u| u.created_at_ms);
}

/// A typed Firestore value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    Bytes(String),
    Reference(String),
    GeoPoint { latitude: f64, longitude: f64 },
    Array(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Short type name used in decode error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "boolean",
            FieldValue::Integer(_) => "integer",
            FieldValue::Double(_) => "double",
            FieldValue::String(_) => "string",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Bytes(_) => "bytes",
            FieldValue::Reference(_) => "reference",
            FieldValue::GeoPoint { .. } => "geopoint",
            FieldValue::Array(_) => "array",
            FieldValue::Map(_) => "map",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "null"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Double(d) => write!(f, "{d}"),
            FieldValue::String(s) => write!(f, "{s}"),
            FieldValue::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            FieldValue::Bytes(b) => write!(f, "<{} bytes b64>", b.len()),
            FieldValue::Reference(r) => write!(f, "{r}"),
            FieldValue::GeoPoint {
                latitude,
                longitude,
            } => write!(f, "({latitude}, {longitude})"),
            FieldValue::Array(items) => write!(f, "[{} items]", items.len()),
            FieldValue::Map(fields) => write!(f, "{{{} fields}}", fields.len()),
        }
    }
}

/// One raw Firestore document.
///
/// `fields` always contains the document id under the `id` key.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: BTreeMap<String, FieldValue>,
}

impl Document {
    /// Build a document, injecting `id` into the field map.
    pub fn new(id: impl Into<String>, mut fields: BTreeMap<String, FieldValue>) -> Self {
        let id = id.into();
        fields.insert("id".to_string(), FieldValue::String(id.clone()));
        Self { id, fields }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    fn optional_string(&self, field: &str) -> Result<Option<String>> {
        match self.fields.get(field) {
            None | Some(FieldValue::Null) => Ok(None),
            Some(FieldValue::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(Error::decode(
                format!("document {}", self.id),
                format!("field '{}' has type {}, expected string", field, other.kind()),
            )),
        }
    }

    /// Timestamps may be stored natively or as epoch-millisecond integers.
    fn optional_millis(&self, field: &str) -> Result<Option<i64>> {
        match self.fields.get(field) {
            None | Some(FieldValue::Null) => Ok(None),
            Some(FieldValue::Timestamp(ts)) => Ok(Some(ts.timestamp_millis())),
            Some(FieldValue::Integer(ms)) => Ok(Some(*ms)),
            Some(other) => Err(Error::decode(
                format!("document {}", self.id),
                format!(
                    "field '{}' has type {}, expected timestamp",
                    field,
                    other.kind()
                ),
            )),
        }
    }
}

/// A document of the `routines` collection.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineRecord {
    pub id: String,
    pub name: Option<String>,
    /// Owning user's uid.
    pub uid: Option<String>,
    pub created_at_ms: Option<i64>,
    pub updated_at_ms: Option<i64>,
    /// Every field of the source document, including `id`.
    pub fields: BTreeMap<String, FieldValue>,
}

impl RoutineRecord {
    /// Decode a routine from its raw document.
    ///
    /// Known fields must have the expected type when present; anything else
    /// is kept untouched in `fields`.
    pub fn decode(doc: Document) -> Result<Self> {
        let name = doc.optional_string("name")?;
        let uid = doc.optional_string("uid")?;
        let created_at_ms = doc.optional_millis("createdAt")?;
        let updated_at_ms = doc.optional_millis("updatedAt")?;
        Ok(Self {
            id: doc.id,
            name,
            uid,
            created_at_ms,
            updated_at_ms,
            fields: doc.fields,
        })
    }
}

/// A collection name paired with the decode function for its records.
#[derive(Debug, Clone, Copy)]
pub struct CollectionSpec<T> {
    pub name: &'static str,
    pub decode: fn(Document) -> Result<T>,
}

/// The `routines` collection.
pub const ROUTINES: CollectionSpec<RoutineRecord> = CollectionSpec {
    name: "routines",
    decode: RoutineRecord::decode,
};
