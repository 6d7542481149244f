use serde::Deserialize;

use crate::config::settings::SettingsConfig;
use crate::utils::constants::{
    DEFAULT_PLACES_BASE_URL, DEFAULT_TRANSIT_BASE_URL, DEFAULT_TRANSIT_TOKEN_URL,
};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

/// ================================
/// Upstream provider
/// ================================
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// OAuth2-protected transit-data API
    #[default]
    Transit,
    /// generic places API keyed by an API key
    Places,
}

impl ProviderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::Transit => "transit",
            ProviderType::Places => "places",
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProviderConfig {
    #[serde(rename = "type", default)]
    pub provider_type: ProviderType,
    /// falls back to the provider's public endpoint
    pub base_url: Option<String>,
    /// client-credentials token endpoint, transit only
    pub token_url: Option<String>,
}

impl ProviderConfig {
    pub fn base_url(&self) -> &str {
        match (&self.base_url, self.provider_type) {
            (Some(url), _) => url.as_str(),
            (None, ProviderType::Transit) => DEFAULT_TRANSIT_BASE_URL,
            (None, ProviderType::Places) => DEFAULT_PLACES_BASE_URL,
        }
    }

    pub fn token_url(&self) -> &str {
        self.token_url.as_deref().unwrap_or(DEFAULT_TRANSIT_TOKEN_URL)
    }
}
