//! Wallet session configuration.
//!
//! Configuration lives in `wallet.json` under the app's config directory.
//! Missing files and missing fields fall back to the production defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::network::Network;

/// WalletConnect project id registered for HedraX.
pub const DEFAULT_PROJECT_ID: &str = "24f627ca64d15e24ba06692cf3b2439d";

/// Wait after the prompt resolves for a session event to land.
pub const DEFAULT_GRACE_PERIOD_MS: u64 = 500;

const CONFIG_FILE: &str = "wallet.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Application metadata shown by the wallet during pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppMetadata {
    pub name: String,
    pub description: String,
    pub icons: Vec<String>,
    /// Origin the dApp is served from.
    pub url: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "HedraX".to_string(),
            description: "HedraX early access".to_string(),
            icons: vec!["https://c.animaapp.com/mh25bcdiL6JXsX/img/hedraxlogo-2-1.png".to_string()],
            url: "https://hedrax.io".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WalletConfig {
    pub metadata: AppMetadata,
    pub network: Network,
    /// Client-registration identifier passed to the connector.
    pub project_id: String,
    pub grace_period_ms: u64,
    /// Directory for the per-manager trace file. No trace file when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,
}

impl WalletConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            metadata: AppMetadata::default(),
            network: Network::default(),
            project_id: DEFAULT_PROJECT_ID.to_string(),
            grace_period_ms: DEFAULT_GRACE_PERIOD_MS,
            log_dir: None,
        }
    }
}

/// Load `wallet.json` from `dir`, or the defaults if it does not exist.
pub fn load_config(dir: &Path) -> Result<WalletConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(WalletConfig::default());
    }

    let contents = fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Save `wallet.json` to `dir` (write-then-rename).
pub fn save_config(dir: &Path, config: &WalletConfig) -> Result<(), ConfigError> {
    fs::create_dir_all(dir)?;

    let file_path = dir.join(CONFIG_FILE);
    let temp_path = dir.join(format!("{CONFIG_FILE}.tmp"));

    let json = serde_json::to_string_pretty(config)?;
    fs::write(&temp_path, json)?;
    fs::rename(&temp_path, &file_path)?;

    Ok(())
}
