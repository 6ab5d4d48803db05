use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::domain::ids::BoardId;
use crate::services::error_handling::BoardError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoardConfig {
    /// Base URL of the board REST API
    pub api_base_url: String,

    /// Bearer token sent with every request
    pub auth_token: Option<String>,

    /// Board used when a command does not name one
    pub default_board: Option<BoardId>,

    /// Delay before resyncing tasks after a failed move (in milliseconds)
    pub resync_delay_ms: u64,

    /// Per-request timeout (in seconds)
    pub request_timeout_secs: u64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000/api".to_string(),
            auth_token: None,
            default_board: None,
            resync_delay_ms: 500,
            request_timeout_secs: 30,
        }
    }
}

impl BoardConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            // Create default config file
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            Ok(default_config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        info!(path = ?path, "Configuration saved");
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| BoardError::Configuration {
            message: "could not determine config directory".to_string(),
        })?;

        Ok(config_dir.join("swimboard").join("config.toml"))
    }

    pub fn resync_delay(&self) -> Duration {
        Duration::from_millis(self.resync_delay_ms)
    }

    /// Resolves the board to operate on, preferring an explicit id.
    pub fn board_or_default(&self, explicit: Option<BoardId>) -> Result<BoardId> {
        explicit
            .or_else(|| self.default_board.clone())
            .ok_or_else(|| {
                BoardError::Configuration {
                    message: "no board given and no default_board configured".to_string(),
                }
                .into()
            })
    }

    fn validate(&self) -> Result<()> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://")) {
            return Err(BoardError::Configuration {
                message: format!("api_base_url must be an http(s) URL, got '{}'", self.api_base_url),
            }
            .into());
        }
        if self.request_timeout_secs == 0 {
            return Err(BoardError::Configuration {
                message: "request_timeout_secs must be positive".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
