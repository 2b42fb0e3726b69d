//! Service account key validation.
//!
//! A key file is accepted when it is readable, parses as a JSON object,
//! carries every required field as a non-empty string, and declares
//! `"type": "service_account"`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Default OAuth2 token endpoint when the key omits `token_uri`.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Fields every service account key must carry.
pub const REQUIRED_FIELDS: &[&str] = &[
    "type",
    "project_id",
    "private_key_id",
    "private_key",
    "client_email",
];

/// The parts of a service account key the gateway needs.
#[derive(Clone, Serialize, Deserialize)]
pub struct ServiceAccount {
    pub project_id: String,
    pub private_key_id: String,
    pub private_key: String,
    pub client_email: String,
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccount {
    /// Read and validate a key file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        let content =
            std::fs::read_to_string(path).map_err(|source| Error::CredentialsUnreadable {
                path: display.clone(),
                source,
            })?;
        let value: Value =
            serde_json::from_str(&content).map_err(|source| Error::CredentialsInvalidJson {
                path: display,
                source,
            })?;
        Self::from_value(&value)
    }

    /// Validate an already-parsed key.
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| Error::NotServiceAccount {
            kind: json_kind(value).to_string(),
        })?;

        for field in REQUIRED_FIELDS {
            required(obj, field)?;
        }

        let kind = required(obj, "type")?;
        if kind != "service_account" {
            return Err(Error::NotServiceAccount {
                kind: kind.to_string(),
            });
        }

        let token_uri = obj
            .get("token_uri")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_TOKEN_URI);

        Ok(ServiceAccount {
            project_id: required(obj, "project_id")?.to_string(),
            private_key_id: required(obj, "private_key_id")?.to_string(),
            private_key: required(obj, "private_key")?.to_string(),
            client_email: required(obj, "client_email")?.to_string(),
            token_uri: token_uri.to_string(),
        })
    }
}

fn required<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a str> {
    obj.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::MissingField {
            field: field.to_string(),
        })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
