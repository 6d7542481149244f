//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Validates server / logging / metrics / timeout / retry / token refresh invariants
//! - Validates provider endpoints

use tracing::{error, info};

use crate::config::provider::{ProviderConfig, ProviderType, ServiceConfig};
use crate::config::settings::{RetryConfig, SettingsConfig, TokenRefreshConfig};
use crate::observability::metrics::get_metrics;
use crate::utils::constants::GATEWAY_ROUTES;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_provider(&cfg.provider, &mut errors);

    if errors.is_empty() {
        info!("config validation passed");
        Ok(())
    } else {
        let metrics = get_metrics().await;
        metrics.config_validation_errors.inc_by(errors.len() as u64);
        for e in &errors {
            error!("config validation: {}", e);
        }
        Err(errors)
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.server.host.trim().is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!(
            "settings.server.port '{}' is not a valid port",
            settings.server.port
        ));
    }

    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' must be one of {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }

    if settings.metrics.is_enabled {
        validate_metrics_path(&settings.metrics.path, errors);
    }

    if settings.cors.allow_origins.is_empty() {
        errors.push("settings.cors.allow_origins must list at least one origin or '*'".to_string());
    }
    for origin in &settings.cors.allow_origins {
        if origin != "*" && !is_http_url(origin) {
            errors.push(format!(
                "settings.cors.allow_origins entry '{}' must be '*' or an http(s) origin",
                origin
            ));
        }
    }

    if settings.upstream.timeout_ms == 0 {
        errors.push("settings.upstream.timeout_ms must be > 0".to_string());
    }

    validate_token_refresh(&settings.token, errors);
}

fn validate_metrics_path(path: &str, errors: &mut Vec<String>) {
    if !path.starts_with('/') {
        errors.push(format!("settings.metrics.path '{}' must start with '/'", path));
        return;
    }
    if path.contains(['{', '}', '*']) {
        errors.push(format!("settings.metrics.path '{}' must be a literal path", path));
        return;
    }
    // axum panics at startup when the merged metrics route overlaps a gateway route
    if GATEWAY_ROUTES.contains(&path) {
        errors.push(format!(
            "settings.metrics.path '{}' collides with a gateway route",
            path
        ));
    }
}

fn validate_token_refresh(token: &TokenRefreshConfig, errors: &mut Vec<String>) {
    if token.min_refresh_seconds == 0 {
        errors.push("settings.token.min_refresh_seconds must be > 0".to_string());
    }
    if token.failure_retry_seconds == 0 {
        errors.push("settings.token.failure_retry_seconds must be > 0".to_string());
    }
    validate_retry("settings.token.startup_retry", &token.startup_retry, errors);
}

fn validate_retry(prefix: &str, retry: &RetryConfig, errors: &mut Vec<String>) {
    if let Some(0) = retry.attempts {
        errors.push(format!("{}.attempts must be >= 1", prefix));
    }
    if let (Some(base), Some(max)) = (retry.base_delay_ms, retry.max_delay_ms) {
        if base > max {
            errors.push(format!(
                "{}.base_delay_ms ({}) must be <= max_delay_ms ({})",
                prefix, base, max
            ));
        }
    }
}

fn validate_provider(provider: &ProviderConfig, errors: &mut Vec<String>) {
    if let Some(base_url) = &provider.base_url {
        if !is_http_url(base_url) {
            errors.push(format!(
                "provider.base_url '{}' must be an http(s) URL",
                base_url
            ));
        }
    }

    match provider.provider_type {
        ProviderType::Transit => {
            if let Some(token_url) = &provider.token_url {
                if !is_http_url(token_url) {
                    errors.push(format!(
                        "provider.token_url '{}' must be an http(s) URL",
                        token_url
                    ));
                }
            }
        }
        ProviderType::Places => {
            if provider.token_url.is_some() {
                errors.push("provider.token_url is only used by the transit provider".to_string());
            }
        }
    }
}

fn is_http_url(value: &str) -> bool {
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty())
}
