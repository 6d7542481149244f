use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::cache::token::{Token, TokenState};
use crate::cache::token_slot::TokenSlot;
use crate::config::settings::TokenRefreshConfig;
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;
use crate::resilience::retry::RetrySettings;
use crate::sources::oauth2::{OAuth2Source, TokenFetchError};

static STARTUP_PHASE: &str = "startup";
static REFRESH_PHASE: &str = "refresh";

/// Computes when the refresh loop re-arms.
#[derive(Debug, Clone)]
pub struct RefreshSchedule {
    pub safety_margin: Duration,
    pub min_refresh: Duration,
    pub failure_retry: Duration,
}

impl From<&TokenRefreshConfig> for RefreshSchedule {
    fn from(cfg: &TokenRefreshConfig) -> Self {
        Self {
            safety_margin: Duration::from_secs(cfg.safety_margin_seconds),
            min_refresh: Duration::from_secs(cfg.min_refresh_seconds.max(1)),
            failure_retry: Duration::from_secs(cfg.failure_retry_seconds.max(1)),
        }
    }
}

impl RefreshSchedule {
    /// Delay derived from the token's own lifetime, never below `min_refresh`.
    pub fn next_delay(&self, token: &Token) -> Duration {
        if token.expires_in <= 0 {
            return self.min_refresh;
        }
        Duration::from_secs(token.expires_in as u64)
            .saturating_sub(self.safety_margin)
            .max(self.min_refresh)
    }

    pub fn after_failure(&self) -> Duration {
        self.failure_retry
    }
}

/// Owns the access-token lifecycle for the transit provider.
#[derive(Debug, Clone)]
pub struct TokenManager {
    source: OAuth2Source,
    slot: TokenSlot,
    schedule: RefreshSchedule,
}

impl TokenManager {
    pub fn new(source: OAuth2Source, schedule: RefreshSchedule) -> Self {
        Self { source, slot: TokenSlot::new(), schedule }
    }

    /// Shared handle for request handlers.
    pub fn slot(&self) -> TokenSlot {
        self.slot.clone()
    }

    pub async fn current_token(&self) -> Option<Arc<Token>> {
        self.slot.current().await
    }

    pub async fn state(&self) -> TokenState {
        self.slot.state().await
    }

    /// Single client-credentials grant, no side effects on the stored token.
    pub async fn fetch_token(&self) -> Result<Token, TokenFetchError> {
        self.source.fetch_token().await
    }

    /// One fetch cycle: mark in flight, fetch without holding the slot, then swap or keep the old token.
    pub async fn refresh(&self) -> Result<Arc<Token>, TokenFetchError> {
        self.refresh_phase(REFRESH_PHASE).await
    }

    async fn refresh_phase(&self, phase: &str) -> Result<Arc<Token>, TokenFetchError> {
        let metrics = get_metrics().await;
        let start = get_instant();
        metrics.token_fetch_requests.with_label_values(&[phase]).inc();
        metrics.token_state.set(self.slot.begin_fetch().await.as_gauge());

        let fetched = self.fetch_token().await;
        metrics
            .token_fetch_duration
            .with_label_values(&[phase])
            .observe(start.elapsed().as_secs_f64());

        match fetched {
            Ok(token) => {
                let token = self.slot.store(token).await;
                metrics.token_state.set(TokenState::Valid.as_gauge());
                metrics.token_expiry_unix.set(token.expires_at_unix_ts());
                info!("{} token fetch succeeded, expires in {}s", phase, token.expires_in);
                Ok(token)
            }
            Err(err) => {
                metrics
                    .token_fetch_failures
                    .with_label_values(&[phase, err.reason()])
                    .inc();
                let state = self.slot.mark_failed().await;
                metrics.token_state.set(state.as_gauge());
                Err(err)
            }
        }
    }

    /// Initial fetch with backoff; fails startup when every attempt fails.
    pub async fn startup_init(&self, retry: &RetrySettings) -> Result<Arc<Token>> {
        info!("fetching initial access token from {}", self.source.token_url);
        retry
            .run_with_retry(|| self.refresh_phase(STARTUP_PHASE))
            .await
            .map_err(|err| anyhow!("initial access token fetch failed: {}", err))
    }

    /// Spawns the refresh loop, first tick after `first_delay`.
    pub fn spawn_refresh_loop(&self, first_delay: Duration) -> JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move { manager.refresh_loop(first_delay).await })
    }

    pub async fn refresh_loop(self, first_delay: Duration) {
        let mut delay = first_delay;
        loop {
            info!("next token refresh in {}s", delay.as_secs());
            tokio::time::sleep(delay).await;

            delay = match self.refresh().await {
                Ok(token) => self.schedule.next_delay(&token),
                Err(err) => {
                    match self.current_token().await {
                        Some(previous) if previous.is_expired() => {
                            error!("token refresh failed, serving expired token: {}", err)
                        }
                        Some(_) => warn!("token refresh failed, keeping previous token: {}", err),
                        None => error!("token refresh failed, no token available: {}", err),
                    }
                    self.schedule.after_failure()
                }
            };
        }
    }

    pub fn schedule(&self) -> &RefreshSchedule {
        &self.schedule
    }
}
