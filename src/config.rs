//! Configuration for reconciliation and the remote client.
//!
//! Every field has a default, so a partial JSON document is enough:
//!
//! ```json
//! {
//!   "reconcile": { "pending_policy": "supersede" },
//!   "client": { "base_url": "https://api.example.com" }
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::optimistic::PendingPolicy;

/// Options for the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// What to do with a new action while the previous one is in flight.
    pub pending_policy: PendingPolicy,
    /// Invalidate the owning resource after a confirmed write.
    pub invalidate_on_success: bool,
    /// Show a toast when a mutation is reverted.
    pub notify_on_error: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            pending_policy: PendingPolicy::Ignore,
            invalidate_on_success: true,
            notify_on_error: true,
        }
    }
}

impl ReconcileConfig {
    /// Options that supersede pending actions instead of ignoring new ones.
    pub fn superseding() -> Self {
        Self {
            pending_policy: PendingPolicy::Supersede,
            ..Self::default()
        }
    }
}

/// Options for the HTTP remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub reconcile: ReconcileConfig,
    pub client: ClientConfig,
}

impl AppConfig {
    /// Parse a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: AppConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.client.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("client.base_url is empty".into()));
        }
        if self.client.timeout_ms == 0 {
            return Err(ConfigError::Invalid("client.timeout_ms must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "config parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
