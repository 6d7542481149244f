use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::Client;

pub mod executor;
pub mod oauth2;

/// Shared client for the token endpoint and geolocation providers.
/// Certificate validation stays on; every call is bounded by `timeout_ms`.
pub fn build_http_client(timeout_ms: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .connect_timeout(Duration::from_millis(timeout_ms))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))
}
