use std::fmt::Display;
use std::future::Future;

use tokio::time::{sleep, Duration};
use tracing::{error, warn};

use crate::config::settings::RetryConfig;

#[derive(Debug, Clone)]
pub struct RetrySettings {
    pub attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl From<&RetryConfig> for RetrySettings {
    fn from(retry: &RetryConfig) -> Self {
        Self {
            attempts: retry.attempts.unwrap_or(5).max(1),
            base_delay_ms: retry.base_delay_ms.unwrap_or(500),
            max_delay_ms: retry.max_delay_ms.unwrap_or(8000),
        }
    }
}

impl RetrySettings {
    pub async fn run_with_retry<F, Fut, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut delay = self.base_delay_ms;
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.attempts => {
                    warn!("Attempt {attempt}/{} failed: {e}", self.attempts);
                    sleep(Duration::from_millis(delay)).await;
                    delay = delay.saturating_mul(2).min(self.max_delay_ms);
                    attempt += 1;
                }
                Err(e) => {
                    error!("all {attempt} attempts failed: {e}");
                    return Err(e);
                }
            }
        }
    }
}
