//! Credential path resolution.
//!
//! Resolution order:
//! 1. Explicit CLI flag (`--service-account`)
//! 2. `FIREBASE_SERVICE_ACCOUNT` environment variable
//! 3. `$XDG_CONFIG_HOME/arrogance/service-account.json`, or the platform
//!    config dir (`~/.config/arrogance/service-account.json`)
//! 4. `./service-account.json`
//!
//! Steps 1 and 2 are taken as given even when the file is missing, so a typo
//! in an explicit path is reported as unreadable instead of silently falling
//! through to a default.

use std::env;
use std::path::{Path, PathBuf};

use super::{CredentialResolution, CredentialSource, LoadedCredentials, ServiceAccount};
use crate::error::{Error, Result};

/// Environment variable naming an explicit service account file.
pub const SERVICE_ACCOUNT_ENV: &str = "FIREBASE_SERVICE_ACCOUNT";

/// Application directory name under the config root.
pub const APP_DIR: &str = "arrogance";

/// Default credential file name.
pub const CREDENTIAL_FILE: &str = "service-account.json";

/// Credential paths supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct CredentialPaths {
    /// Explicit path to the service account file
    pub service_account: Option<PathBuf>,
    /// Directory used for the working-directory fallback (defaults to `.`)
    pub working_dir: Option<PathBuf>,
}

/// Credential resolver with deterministic resolution order.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    cli_paths: CredentialPaths,
}

impl CredentialResolver {
    /// Create a new resolver with CLI paths.
    pub fn new(paths: CredentialPaths) -> Self {
        CredentialResolver { cli_paths: paths }
    }

    /// Create a resolver with no CLI overrides.
    pub fn with_defaults() -> Self {
        CredentialResolver {
            cli_paths: CredentialPaths::default(),
        }
    }

    /// Resolve the config directory for the application.
    pub fn resolve_config_dir(&self) -> Option<PathBuf> {
        if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
            if !xdg.is_empty() {
                return Some(PathBuf::from(xdg).join(APP_DIR));
            }
        }
        dirs::config_dir().map(|d| d.join(APP_DIR))
    }

    /// Every location consulted, in order, for error messages.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut out = Vec::new();
        if let Some(ref path) = self.cli_paths.service_account {
            out.push(path.clone());
        }
        if let Ok(path) = env::var(SERVICE_ACCOUNT_ENV) {
            if !path.is_empty() {
                out.push(PathBuf::from(path));
            }
        }
        if let Some(dir) = self.resolve_config_dir() {
            out.push(dir.join(CREDENTIAL_FILE));
        }
        out.push(self.working_dir().join(CREDENTIAL_FILE));
        out
    }

    fn working_dir(&self) -> PathBuf {
        self.cli_paths
            .working_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolve the service account path.
    pub fn resolve_path(&self) -> Option<CredentialSource> {
        // 1. CLI flag
        if let Some(ref path) = self.cli_paths.service_account {
            return Some(CredentialSource {
                path: path.clone(),
                resolution: CredentialResolution::CliFlag,
            });
        }

        // 2. FIREBASE_SERVICE_ACCOUNT
        if let Ok(path) = env::var(SERVICE_ACCOUNT_ENV) {
            if !path.is_empty() {
                return Some(CredentialSource {
                    path: PathBuf::from(path),
                    resolution: CredentialResolution::EnvVar,
                });
            }
        }

        // 3. XDG config dir
        if let Some(config_dir) = self.resolve_config_dir() {
            let path = config_dir.join(CREDENTIAL_FILE);
            if path.is_file() {
                return Some(CredentialSource {
                    path,
                    resolution: CredentialResolution::XdgConfig,
                });
            }
        }

        // 4. Current directory
        let local = self.working_dir().join(CREDENTIAL_FILE);
        if local.is_file() {
            return Some(CredentialSource {
                path: local,
                resolution: CredentialResolution::WorkingDir,
            });
        }

        None
    }

    /// Resolve, read and validate the service account.
    pub fn load(&self) -> Result<LoadedCredentials> {
        let source = self.resolve_path().ok_or_else(|| Error::CredentialsNotFound {
            searched: join_paths(&self.candidates()),
        })?;
        let account = ServiceAccount::from_file(&source.path)?;
        Ok(LoadedCredentials { account, source })
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| display(p))
        .collect::<Vec<_>>()
        .join(", ")
}

fn display(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
