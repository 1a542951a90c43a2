//! Backing-store connection configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default bound on any single store call, in seconds. `campus-db` derives
/// its fallback timeout from this value.
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Remote database URL (e.g., `libsql://campus.example.io`).
    #[serde(default)]
    pub url: String,

    /// Auth token for the remote database.
    #[serde(default)]
    pub auth_token: String,

    /// Path to a local database file. Takes precedence over the remote URL
    /// when set; `:memory:` is accepted for throwaway databases.
    #[serde(default)]
    pub local_path: String,

    /// Timeout applied to every backing-store call, in seconds. A stalled
    /// connection surfaces as a persistence error instead of hanging the
    /// registries.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            auth_token: String::new(),
            local_path: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl StoreConfig {
    /// Check if the config has the minimum required fields for remote access.
    #[must_use]
    pub fn is_remote_configured(&self) -> bool {
        !self.url.is_empty() && !self.auth_token.is_empty()
    }

    /// Check if a local database path is set.
    #[must_use]
    pub fn has_local_path(&self) -> bool {
        !self.local_path.is_empty()
    }

    /// The per-call timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Require that either a local path or a remote URL + token is present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotConfigured` when neither is set.
    pub fn require_configured(&self) -> Result<(), crate::ConfigError> {
        if self.has_local_path() || self.is_remote_configured() {
            Ok(())
        } else {
            Err(crate::ConfigError::NotConfigured {
                section: "store".into(),
            })
        }
    }
}
