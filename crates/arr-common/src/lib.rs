//! Arrogance Admin common types and errors.
//!
//! This crate provides the pieces shared by the dashboard and any other
//! tooling that talks to the same Firebase project:
//! - User and routine records, plus the raw Firestore document model
//! - Common error types with stable codes
//! - Service account discovery and validation

pub mod config;
pub mod error;
pub mod records;

pub use config::{
    CredentialPaths, CredentialResolution, CredentialResolver, CredentialSource,
    LoadedCredentials, ServiceAccount,
};
pub use error::{format_error_human, Error, ErrorCategory, Result, StructuredError};
pub use records::{
    sort_by_creation, CollectionSpec, Document, FieldValue, RoutineRecord, UserRecord, ROUTINES,
};
