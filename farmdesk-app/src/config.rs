//! Application configuration.

use crate::error::{AppError, AppResult};
use crate::auth::DEFAULT_PIN;
use farmdesk_assistant::GeminiConfig;
use farmdesk_sync::{HttpTransportConfig, SchedulePolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything needed to open a [`FarmApp`](crate::FarmApp).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file holding every durable key.
    pub data_path: PathBuf,
    /// Shared access code.
    #[serde(skip_serializing)]
    pub access_pin: String,
    pub schedule: SchedulePolicy,
    pub transport: HttpTransportConfig,
    pub assistant: GeminiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("farmdesk.db"),
            access_pin: DEFAULT_PIN.to_string(),
            schedule: SchedulePolicy::default(),
            transport: HttpTransportConfig::default(),
            assistant: GeminiConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads a JSON configuration file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))
    }
}
