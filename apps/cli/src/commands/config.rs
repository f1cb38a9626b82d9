//! # Config Commands
//!
//! Shows the effective configuration, minus secrets.

use ridebook_client::ClientConfig;
use serde::Serialize;
use tracing::debug;

/// Effective settings as shown by the `config` REPL command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigView {
    pub backend_url: String,
    pub timeout_secs: u64,
    pub auth_token_set: bool,
    pub geocode_enabled: bool,
    pub geocode_country: String,
    pub default_country_code: String,
}

/// Gets the current configuration.
///
/// ## Returns
/// A read-only view; tokens and API keys are reported as set or unset only
pub fn get_config(config: &ClientConfig) -> ConfigView {
    debug!("get_config command");
    ConfigView {
        backend_url: config.backend.base_url.clone(),
        timeout_secs: config.backend.timeout_secs,
        auth_token_set: config.backend.auth_token.is_some(),
        geocode_enabled: config.geocode_enabled(),
        geocode_country: config.geocode.country.clone(),
        default_country_code: config.booking.default_country_code.clone(),
    }
}
