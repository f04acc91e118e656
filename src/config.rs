//! Hub configuration.

use crate::error::{HubError, Result};
use serde::{Deserialize, Serialize};

/// Event hub configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Number of pool workers running emission tasks.
    /// Default: 4
    pub background_workers: usize,

    /// Name prefix for pool threads; the worker index is appended.
    pub worker_thread_prefix: String,

    /// Name of the serial thread that runs `Main` deliveries.
    pub main_thread_name: String,

    /// Log a line for every individual delivery.
    pub log_deliveries: bool,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            background_workers: 4,
            worker_thread_prefix: "event-hub-worker".to_string(),
            main_thread_name: "event-hub-main".to_string(),
            log_deliveries: true,
        }
    }
}

impl HubConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: HubConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.background_workers == 0 {
            return Err(HubError::InvalidConfig(
                "background_workers must be at least 1".to_string(),
            ));
        }
        if self.worker_thread_prefix.is_empty() {
            return Err(HubError::InvalidConfig(
                "worker_thread_prefix must not be empty".to_string(),
            ));
        }
        if self.main_thread_name.is_empty() {
            return Err(HubError::InvalidConfig(
                "main_thread_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
