//! # Client Configuration
//!
//! Where the backend lives, who is operating the till, and how amounts are
//! shown.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command-line flags (highest priority, applied by the terminal)     │
//! │     --api-url http://10.0.0.5:8000  --operator E042                    │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     TILL_API_URL, TILL_TIMEOUT_SECS,                                   │
//! │     TILL_OPERATOR_CODE, TILL_CURRENCY_SUFFIX                           │
//! │                                                                         │
//! │  3. TOML Config File                                                   │
//! │     ~/.config/pos/till.toml (Linux)                                    │
//! │     ~/Library/Application Support/com.till.pos/till.toml (macOS)       │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # till.toml
//! [api]
//! base_url = "http://127.0.0.1:8000"
//! timeout_secs = 10
//! connect_timeout_secs = 5
//!
//! [operator]
//! code = ""          # empty: the backend applies its default operator
//!
//! [display]
//! currency_suffix = "円"
//! product_placeholder = "Product name"
//! price_placeholder = "Price"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use till_core::validation::validate_operator_code;
use till_core::Money;

use crate::error::{ClientError, ClientResult};

// =============================================================================
// API Settings
// =============================================================================

/// Backend endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL; `/products/{code}` and `/transactions` are joined onto it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// TCP connect timeout (seconds).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_connect_timeout() -> u64 {
    5
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Parses and checks the base URL.
    ///
    /// Only http(s) URLs that can carry path segments are accepted.
    pub fn parsed_base_url(&self) -> ClientResult<Url> {
        let url = Url::parse(&self.base_url)?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        if url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(format!(
                "API URL cannot carry a path: {}",
                self.base_url
            )));
        }

        Ok(url)
    }
}

// =============================================================================
// Operator Settings
// =============================================================================

/// Who is ringing up sales.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorConfig {
    /// Sent as `emp_cd`. Empty lets the backend choose its default.
    #[serde(default)]
    pub code: String,
}

// =============================================================================
// Display Settings
// =============================================================================

/// How the terminal renders the two panels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Appended to every amount, e.g. "150円".
    #[serde(default = "default_currency_suffix")]
    pub currency_suffix: String,

    /// Shown in place of the product name when nothing is staged.
    #[serde(default = "default_product_placeholder")]
    pub product_placeholder: String,

    /// Shown in place of the price when nothing is staged.
    #[serde(default = "default_price_placeholder")]
    pub price_placeholder: String,
}

fn default_currency_suffix() -> String {
    "円".to_string()
}

fn default_product_placeholder() -> String {
    "Product name".to_string()
}

fn default_price_placeholder() -> String {
    "Price".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            currency_suffix: default_currency_suffix(),
            product_placeholder: default_product_placeholder(),
            price_placeholder: default_price_placeholder(),
        }
    }
}

impl DisplayConfig {
    /// Formats an amount with the configured suffix.
    ///
    /// ## Example
    /// ```rust
    /// use till_client::config::DisplayConfig;
    /// use till_core::Money;
    ///
    /// let display = DisplayConfig::default();
    /// assert_eq!(display.format_price(Money::from_amount(150)), "150円");
    /// ```
    pub fn format_price(&self, amount: Money) -> String {
        amount.display_with(&self.currency_suffix)
    }
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub operator: OperatorConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file: `config_path`, or the per-user default location
    /// 3. Environment variables
    ///
    /// An explicit `config_path` must exist. The default location is optional.
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ClientError::ConfigLoadFailed(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Self::from_file(&path)?
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> ClientResult<Self> {
        info!(?path, "Loading till config from file");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Till config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        self.api.parsed_base_url()?;

        if self.api.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.api.connect_timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "connect_timeout_secs must be greater than 0".into(),
            ));
        }

        validate_operator_code(&self.operator.code)?;

        Ok(())
    }

    /// Applies `TILL_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup. Unparseable numbers are skipped.
    fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = var("TILL_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(timeout) = var("TILL_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring non-numeric TILL_TIMEOUT_SECS"),
            }
        }

        if let Some(code) = var("TILL_OPERATOR_CODE") {
            debug!(operator = %code, "Overriding operator code from environment");
            self.operator.code = code;
        }

        if let Some(suffix) = var("TILL_CURRENCY_SUFFIX") {
            self.display.currency_suffix = suffix;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "till", "pos")
            .map(|dirs| dirs.config_dir().join("till.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn base_url(&self) -> &str {
        &self.api.base_url
    }

    pub fn operator_code(&self) -> &str {
        &self.operator.code
    }
}
