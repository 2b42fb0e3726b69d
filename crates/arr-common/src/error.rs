//! Error types for Arrogance Admin.
//!
//! Every failure the dashboard can surface maps onto one [`Error`] variant
//! with:
//! - a stable numeric code grouped by category
//! - a short headline and a remediation hint for humans
//! - a structured JSON form for `arr-core check --json`
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Service Account Not Found
//!   Reason: no service account file found (searched: ...)
//!   Fix: Set FIREBASE_SERVICE_ACCOUNT or place service-account.json in ~/.config/arrogance/
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for Arrogance Admin operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Service account discovery and validation.
    Credentials,
    /// Remote auth / document store calls.
    Gateway,
    /// Record decoding.
    Decode,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Credentials => write!(f, "credentials"),
            ErrorCategory::Gateway => write!(f, "gateway"),
            ErrorCategory::Decode => write!(f, "decode"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for Arrogance Admin.
#[derive(Error, Debug)]
pub enum Error {
    // Credential errors (10-19)
    #[error("no service account file found (searched: {searched})")]
    CredentialsNotFound { searched: String },

    #[error("could not read service account file {path}: {source}")]
    CredentialsUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("service account file {path} is not valid JSON: {source}")]
    CredentialsInvalidJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("service account is missing required field: {field}")]
    MissingField { field: String },

    #[error("file is not a service account (type: {kind})")]
    NotServiceAccount { kind: String },

    // Gateway errors (20-29)
    #[error("{service} service not initialized")]
    NotInitialized { service: &'static str },

    #[error("access token exchange failed: {0}")]
    Token(String),

    #[error("auth request failed: {0}")]
    Auth(String),

    #[error("document store request failed: {0}")]
    Store(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("gateway is closed")]
    GatewayClosed,

    // Decode errors (30-39)
    #[error("failed to decode {what}: {message}")]
    Decode { what: String, message: String },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Convenience constructor for decode failures.
    pub fn decode(what: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Decode {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Credential errors
    /// - 20-29: Gateway errors
    /// - 30-39: Decode errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::CredentialsNotFound { .. } => 10,
            Error::CredentialsUnreadable { .. } => 11,
            Error::CredentialsInvalidJson { .. } => 12,
            Error::MissingField { .. } => 13,
            Error::NotServiceAccount { .. } => 14,

            Error::NotInitialized { .. } => 20,
            Error::Token(_) => 21,
            Error::Auth(_) => 22,
            Error::Store(_) => 23,
            Error::Transport(_) => 24,
            Error::GatewayClosed => 25,

            Error::Decode { .. } => 30,

            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the category for this error.
    pub fn category(&self) -> ErrorCategory {
        match self.code() {
            10..=19 => ErrorCategory::Credentials,
            20..=29 => ErrorCategory::Gateway,
            30..=39 => ErrorCategory::Decode,
            _ => ErrorCategory::Io,
        }
    }

    /// Whether retrying (possibly after user action) can succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::CredentialsNotFound { .. }
            | Error::CredentialsUnreadable { .. }
            | Error::CredentialsInvalidJson { .. }
            | Error::MissingField { .. }
            | Error::NotServiceAccount { .. } => true,

            Error::Token(_) | Error::Auth(_) | Error::Store(_) | Error::Transport(_) => true,
            Error::NotInitialized { .. } | Error::GatewayClosed => false,

            Error::Decode { .. } => false,

            Error::Io(_) => true,
            Error::Json(_) => false,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::CredentialsNotFound { .. } => {
                "Set FIREBASE_SERVICE_ACCOUNT or place service-account.json in ~/.config/arrogance/."
            }
            Error::CredentialsUnreadable { .. } => {
                "Check that the service account file exists and is readable by the current user."
            }
            Error::CredentialsInvalidJson { .. } => {
                "Download a fresh key from the Firebase Console (Project settings > Service accounts)."
            }
            Error::MissingField { .. } => {
                "The key file is incomplete. Download a fresh key from the Firebase Console."
            }
            Error::NotServiceAccount { .. } => {
                "Use a service account key, not an OAuth client or user credential file."
            }

            Error::NotInitialized { .. } => {
                "Wait for Firebase initialization to finish, then retry the view."
            }
            Error::Token(_) => {
                "Verify the service account key is not revoked and the system clock is correct."
            }
            Error::Auth(_) => {
                "Check that the service account has the Firebase Authentication Admin role."
            }
            Error::Store(_) => {
                "Check that Firestore is enabled and the service account can read the collection."
            }
            Error::Transport(_) => "Check network connectivity, then press 'r' to retry.",
            Error::GatewayClosed => "The connection was shut down. Restart the application.",

            Error::Decode { .. } => {
                "A remote record has an unexpected shape. Inspect it in the Firebase Console."
            }

            Error::Io(_) => "Check disk space and permissions. Retry the operation.",
            Error::Json(_) => "Invalid JSON payload. Retry, and report if it persists.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::CredentialsNotFound { .. } => "Service Account Not Found",
            Error::CredentialsUnreadable { .. } => "Service Account Unreadable",
            Error::CredentialsInvalidJson { .. } => "Service Account Malformed",
            Error::MissingField { .. } => "Service Account Incomplete",
            Error::NotServiceAccount { .. } => "Wrong Credential Type",

            Error::NotInitialized { .. } => "Service Not Initialized",
            Error::Token(_) => "Token Exchange Failed",
            Error::Auth(_) => "Auth Request Failed",
            Error::Store(_) => "Firestore Request Failed",
            Error::Transport(_) => "Network Error",
            Error::GatewayClosed => "Gateway Closed",

            Error::Decode { .. } => "Decode Error",

            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Error",
        }
    }
}

/// Machine-readable error payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    pub code: u32,
    pub category: ErrorCategory,
    pub message: String,
    pub recoverable: bool,
    pub remediation: String,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            remediation: err.remediation().to_string(),
        }
    }
}

impl StructuredError {
    /// Serialize to a compact JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"message":"serialization failed"}}"#, self.code)
        })
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            Error::MissingField {
                field: "project_id".into()
            }
            .code(),
            13
        );
        assert_eq!(Error::NotInitialized { service: "auth" }.code(), 20);
        assert_eq!(Error::decode("user", "bad createdAt").code(), 30);
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            Error::CredentialsNotFound {
                searched: "x".into()
            }
            .category(),
            ErrorCategory::Credentials
        );
        assert_eq!(
            Error::Transport("timeout".into()).category(),
            ErrorCategory::Gateway
        );
        assert_eq!(
            Error::decode("routine", "name").category(),
            ErrorCategory::Decode
        );
        assert_eq!(
            Error::Io(std::io::Error::other("disk")).category(),
            ErrorCategory::Io
        );
    }

    #[test]
    fn test_error_messages_match_credential_checks() {
        let err = Error::NotServiceAccount {
            kind: "authorized_user".into(),
        };
        assert_eq!(
            err.to_string(),
            "file is not a service account (type: authorized_user)"
        );

        let err = Error::MissingField {
            field: "private_key".into(),
        };
        assert_eq!(
            err.to_string(),
            "service account is missing required field: private_key"
        );
    }

    #[test]
    fn test_error_recoverable() {
        assert!(Error::Transport("reset".into()).is_recoverable());
        assert!(!Error::NotInitialized { service: "firestore" }.is_recoverable());
        assert!(!Error::decode("user", "x").is_recoverable());
    }

    #[test]
    fn test_structured_error_json() {
        let err = Error::Auth("403 PERMISSION_DENIED".into());
        let json = StructuredError::from(&err).to_json();

        assert!(json.contains(r#""code":22"#));
        assert!(json.contains(r#""category":"gateway""#));
        assert!(json.contains(r#""recoverable":true"#));
    }

    #[test]
    fn test_format_error_human() {
        let err = Error::CredentialsNotFound {
            searched: "./service-account.json".into(),
        };
        let formatted = format_error_human(&err, false);

        assert!(formatted.contains("Service Account Not Found"));
        assert!(formatted.contains("no service account file found"));
        assert!(formatted.contains("FIREBASE_SERVICE_ACCOUNT"));
    }

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Credentials.to_string(), "credentials");
        assert_eq!(ErrorCategory::Decode.to_string(), "decode");
    }
}
