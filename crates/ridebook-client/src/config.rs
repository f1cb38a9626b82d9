//! # Client Configuration
//!
//! Where the backend and the geocoder live, and how to talk to them.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     RIDEBOOK_API_BASE_URL=https://api.example.com                      │
//! │     RIDEBOOK_GEOCODE_API_KEY=...                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/ridebook/ridebook.toml (Linux)                           │
//! │     ~/Library/Application Support/com.ridebook.ridebook/ (macOS)       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     localhost backend, OpenRouteService geocoder, +351                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # ridebook.toml
//! [backend]
//! base_url = "https://api.example.com"
//! auth_token = "eyJhbGciOi..."
//! timeout_secs = 15
//!
//! [geocode]
//! api_key = "5b3ce3597851110001cf6248..."
//! country = "PRT"
//! lang = "pt"
//! debounce_ms = 350
//!
//! [booking]
//! default_country_code = "+351"
//! ```

use ridebook_core::{DEFAULT_COUNTRY_CODE, MIN_GEOCODE_QUERY_CHARS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "ridebook.toml";

// =============================================================================
// Backend Settings
// =============================================================================

/// The pricing / voucher / booking backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base URL the `/calculate-budget`, `/validate-voucher` and
    /// `/submit-booking` paths are joined onto.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent on every backend request when present.
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout() -> u64 {
    10
}

impl Default for BackendSettings {
    fn default() -> Self {
        BackendSettings {
            base_url: default_base_url(),
            auth_token: None,
            timeout_secs: default_timeout(),
        }
    }
}

// =============================================================================
// Geocode Settings
// =============================================================================

/// Address autocomplete (OpenRouteService).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeocodeSettings {
    #[serde(default = "default_geocode_url")]
    pub base_url: String,

    /// Without a key, autocomplete is disabled and returns no suggestions.
    #[serde(default)]
    pub api_key: Option<String>,

    /// ISO-3166 alpha-3 boundary country.
    #[serde(default = "default_country")]
    pub country: String,

    #[serde(default = "default_lang")]
    pub lang: String,

    #[serde(default = "default_layers")]
    pub layers: Vec<String>,

    /// Shorter queries never reach the geocoder.
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,

    /// Quiet period before a keystroke triggers a lookup (milliseconds).
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
}

fn default_geocode_url() -> String {
    "https://api.openrouteservice.org".to_string()
}

fn default_country() -> String {
    "PRT".to_string()
}

fn default_lang() -> String {
    "pt".to_string()
}

fn default_layers() -> Vec<String> {
    ["address", "street", "venue", "locality", "county", "region"]
        .iter()
        .map(|l| l.to_string())
        .collect()
}

fn default_min_query_chars() -> usize {
    MIN_GEOCODE_QUERY_CHARS
}

fn default_debounce() -> u64 {
    350
}

impl Default for GeocodeSettings {
    fn default() -> Self {
        GeocodeSettings {
            base_url: default_geocode_url(),
            api_key: None,
            country: default_country(),
            lang: default_lang(),
            layers: default_layers(),
            min_query_chars: default_min_query_chars(),
            debounce_ms: default_debounce(),
        }
    }
}

impl GeocodeSettings {
    /// Debounce window as a `Duration`.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

// =============================================================================
// Booking Settings
// =============================================================================

/// Booking form defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSettings {
    #[serde(default = "default_country_code")]
    pub default_country_code: String,
}

fn default_country_code() -> String {
    DEFAULT_COUNTRY_CODE.to_string()
}

impl Default for BookingSettings {
    fn default() -> Self {
        BookingSettings {
            default_country_code: default_country_code(),
        }
    }
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub geocode: GeocodeSettings,

    #[serde(default)]
    pub booking: BookingSettings,
}

impl ClientConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (ridebook.toml)
    /// 3. Environment variables
    ///
    /// An explicit `config_path` that does not exist is an error; a missing
    /// file at the default location is not.
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let explicit = config_path.is_some();
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else if explicit {
                return Err(ClientError::Io(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML document; missing sections and keys take defaults.
    pub fn from_toml(contents: &str) -> ClientResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        parse_http_url("backend.base_url", &self.backend.base_url)?;
        parse_http_url("geocode.base_url", &self.geocode.base_url)?;

        if self.backend.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "backend.timeout_secs must be greater than 0".into(),
            ));
        }

        if self.geocode.min_query_chars == 0 {
            return Err(ClientError::InvalidConfig(
                "geocode.min_query_chars must be greater than 0".into(),
            ));
        }

        let code = &self.booking.default_country_code;
        let digits = code.strip_prefix('+').unwrap_or("");
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ClientError::InvalidConfig(format!(
                "booking.default_country_code must be '+' followed by digits, got: {}",
                code
            )));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup (the process environment in
    /// production, a map in tests).
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("RIDEBOOK_API_BASE_URL") {
            debug!(url = %url, "Overriding backend URL from environment");
            self.backend.base_url = url;
        }

        if let Some(token) = lookup("RIDEBOOK_API_TOKEN") {
            self.backend.auth_token = (!token.is_empty()).then_some(token);
        }

        if let Some(timeout) = lookup("RIDEBOOK_TIMEOUT_SECS") {
            match timeout.parse::<u64>() {
                Ok(secs) => self.backend.timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring non-numeric RIDEBOOK_TIMEOUT_SECS"),
            }
        }

        if let Some(key) = lookup("RIDEBOOK_GEOCODE_API_KEY") {
            self.geocode.api_key = (!key.is_empty()).then_some(key);
        }

        if let Some(url) = lookup("RIDEBOOK_GEOCODE_BASE_URL") {
            debug!(url = %url, "Overriding geocoder URL from environment");
            self.geocode.base_url = url;
        }

        if let Some(code) = lookup("RIDEBOOK_DEFAULT_COUNTRY_CODE") {
            self.booking.default_country_code = code;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "ridebook", "ridebook")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Backend request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }

    /// Returns true if address autocomplete can run.
    pub fn geocode_enabled(&self) -> bool {
        self.geocode.api_key.is_some()
    }
}

fn parse_http_url(field: &str, value: &str) -> ClientResult<Url> {
    let url = Url::parse(value)
        .map_err(|e| ClientError::InvalidConfig(format!("{field}: {e} ({value})")))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ClientError::InvalidConfig(format!(
            "{field} must start with http:// or https://, got: {value}"
        )));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.backend.timeout_secs, 10);
        assert_eq!(config.geocode.min_query_chars, 3);
        assert_eq!(config.geocode.debounce_ms, 350);
        assert_eq!(config.geocode.country, "PRT");
        assert_eq!(config.booking.default_country_code, "+351");
        assert!(!config.geocode_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ClientConfig::from_toml(
            r#"
            [backend]
            base_url = "https://api.example.com"
            auth_token = "secret"

            [geocode]
            api_key = "ors-key"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.base_url, "https://api.example.com");
        assert_eq!(config.backend.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.backend.timeout_secs, 10);
        assert_eq!(config.geocode.lang, "pt");
        assert_eq!(config.geocode.layers.len(), 6);
        assert!(config.geocode_enabled());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::default();

        config.backend.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.backend.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config.backend.base_url = "https://example.com/api".to_string();
        assert!(config.validate().is_ok());

        config.backend.timeout_secs = 0;
        assert!(config.validate().is_err());
        config.backend.timeout_secs = 5;

        config.geocode.min_query_chars = 0;
        assert!(config.validate().is_err());
        config.geocode.min_query_chars = 3;

        config.booking.default_country_code = "351".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("RIDEBOOK_API_BASE_URL", "https://staging.example.com"),
            ("RIDEBOOK_API_TOKEN", "token-123"),
            ("RIDEBOOK_TIMEOUT_SECS", "30"),
            ("RIDEBOOK_GEOCODE_API_KEY", "ors"),
            ("RIDEBOOK_DEFAULT_COUNTRY_CODE", "+34"),
        ]
        .into_iter()
        .collect();

        let mut config = ClientConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.backend.base_url, "https://staging.example.com");
        assert_eq!(config.backend.auth_token.as_deref(), Some("token-123"));
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.geocode.api_key.as_deref(), Some("ors"));
        assert_eq!(config.booking.default_country_code, "+34");
        assert_eq!(config.geocode.base_url, "https://api.openrouteservice.org");
    }

    #[test]
    fn test_bad_timeout_override_is_ignored() {
        let mut config = ClientConfig::default();
        config.apply_overrides(|key| (key == "RIDEBOOK_TIMEOUT_SECS").then(|| "soon".to_string()));
        assert_eq!(config.backend.timeout_secs, 10);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = ClientConfig::load(Some(PathBuf::from("/definitely/not/here/ridebook.toml")));
        assert!(matches!(result, Err(ClientError::Io(_))));
    }

    #[test]
    fn test_toml_serialization() {
        let config = ClientConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[backend]"));
        assert!(toml_str.contains("[geocode]"));
        assert!(toml_str.contains("[booking]"));
    }
}
