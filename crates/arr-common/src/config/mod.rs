//! Service account discovery and validation.
//!
//! This module provides:
//! - Deterministic credential path resolution (CLI > env > XDG > cwd)
//! - Validation of the resolved file as a service account key
//! - A typed [`ServiceAccount`] for the gateway to sign tokens with

pub mod resolve;
pub mod service_account;

pub use resolve::{CredentialPaths, CredentialResolver};
pub use service_account::ServiceAccount;

use std::path::PathBuf;

/// A validated credential together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedCredentials {
    pub account: ServiceAccount,
    pub source: CredentialSource,
}

/// Where the service account file was found.
#[derive(Debug, Clone)]
pub struct CredentialSource {
    pub path: PathBuf,
    pub resolution: CredentialResolution,
}

/// How a credential path was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialResolution {
    /// From explicit CLI flag
    CliFlag,
    /// From FIREBASE_SERVICE_ACCOUNT
    EnvVar,
    /// From the XDG config directory
    XdgConfig,
    /// From the current working directory
    WorkingDir,
}

impl std::fmt::Display for CredentialResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialResolution::CliFlag => write!(f, "cli"),
            CredentialResolution::EnvVar => write!(f, "env"),
            CredentialResolution::XdgConfig => write!(f, "xdg"),
            CredentialResolution::WorkingDir => write!(f, "cwd"),
        }
    }
}
