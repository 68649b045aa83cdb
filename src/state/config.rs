//! Application configuration with persistence.
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/walletview/config.json`
//! - macOS: `~/Library/Application Support/walletview/config.json`
//! - Windows: `%APPDATA%/walletview/config.json`
//!
//! Command-line flags override whatever the file says; see
//! [`AppConfig::with_overrides`].

use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS};

// ============================================================================
// Constants
// ============================================================================

/// Application name used for configuration directory.
const APP_NAME: &str = "walletview";

/// Configuration file name.
const CONFIG_FILE: &str = "config.json";

// ============================================================================
// AppConfig
// ============================================================================

/// Settings for reaching the wallet API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Root of the wallet API, e.g. `https://bank.example.com/api`.
    pub api_base_url: Option<String>,
    /// Bearer token sent with each request.
    pub api_token: Option<String>,
    /// Transactions requested per page.
    pub page_size: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            api_token: None,
            page_size: DEFAULT_PAGE_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// Returns the path to the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration directory cannot be determined.
    pub fn config_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir().ok_or_else(|| {
            color_eyre::eyre::eyre!(
                "Could not determine config directory. Expected XDG_CONFIG_HOME or ~/.config on Linux, ~/Library/Application Support on macOS, %APPDATA% on Windows"
            )
        })?;
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        Ok(path)
    }

    /// Loads the configuration from disk, falling back to defaults when the
    /// file is missing or unreadable.
    #[must_use]
    pub fn load() -> Self {
        match Self::config_path().and_then(|path| Self::load_from(&path)) {
            Ok(config) => config,
            Err(err) => {
                tracing::debug!("Config load failed, using defaults: {err}");
                Self::default()
            }
        }
    }

    /// Loads the configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Saves the configuration to its default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be determined or written.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Saves the configuration to a specific file, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Apply command-line overrides on top of the loaded values.
    #[must_use]
    pub fn with_overrides(
        mut self,
        api_base_url: Option<String>,
        api_token: Option<String>,
        page_size: Option<u32>,
    ) -> Self {
        if api_base_url.is_some() {
            self.api_base_url = api_base_url;
        }
        if api_token.is_some() {
            self.api_token = api_token;
        }
        if let Some(page_size) = page_size {
            self.page_size = page_size;
        }
        self
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ============================================================================
// Tests
// ============================================================================
