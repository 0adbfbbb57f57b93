//! Client configuration.
//!
//! Stored as JSON; every field has a default, so a missing file or a
//! partial one is fine.
//!
//! ```json
//! {
//!     "ledger_endpoint": "ws://127.0.0.1:9944",
//!     "keystore_dir": "/home/me/.attested-claims/keystore",
//!     "address_prefix": 38
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ClaimsError, Result};
use crate::identity::DEFAULT_ADDRESS_PREFIX;

const CONFIG_DIR: &str = ".attested-claims";
const CONFIG_FILE: &str = "config.json";
const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:9944";

/// Settings shared by SDK clients and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Ledger endpoint, also the key of the connection cache.
    pub ledger_endpoint: String,
    /// Directory holding encrypted identity files.
    pub keystore_dir: PathBuf,
    /// Network prefix used when rendering addresses.
    pub address_prefix: u8,
}

fn base_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            ledger_endpoint: DEFAULT_ENDPOINT.to_string(),
            keystore_dir: base_dir().join("keystore"),
            address_prefix: DEFAULT_ADDRESS_PREFIX,
        }
    }
}

impl ClientConfig {
    /// `$HOME/.attested-claims/config.json`.
    pub fn default_path() -> PathBuf {
        base_dir().join(CONFIG_FILE)
    }

    /// Read `path`, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| ClaimsError::InvalidFileFormat(format!("{}: {e}", path.display())))?;
        if config.address_prefix >= 64 {
            return Err(ClaimsError::InvalidFileFormat(format!(
                "address_prefix {} out of range (0..64)",
                config.address_prefix
            )));
        }
        Ok(config)
    }

    /// Write the configuration as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ClaimsError::SerializationError(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
