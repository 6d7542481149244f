use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinHandle;
use tracing::info;

use crate::config::credentials::ProviderSecrets;
use crate::config::provider::ServiceConfig;
use crate::gateway::nearby::Gateway;
use crate::gateway::upstream::Upstream;
use crate::resilience::retry::RetrySettings;
use crate::sources::build_http_client;
use crate::sources::executor::token_refresh::{RefreshSchedule, TokenManager};
use crate::sources::oauth2::OAuth2Source;

/// Ready-to-serve gateway plus the background refresh task, if any.
pub struct Bootstrapped {
    pub gateway: Arc<Gateway>,
    pub token_manager: Option<TokenManager>,
    pub refresher: Option<JoinHandle<()>>,
}

impl Bootstrapped {
    pub fn shutdown(self) {
        if let Some(refresher) = self.refresher {
            refresher.abort();
        }
    }
}

/// Builds the upstream for the configured provider. For the transit provider
/// this performs the initial token fetch and starts the refresh loop.
pub async fn build(service_config: &ServiceConfig, secrets: ProviderSecrets) -> Result<Bootstrapped> {
    let settings = &service_config.settings;
    let provider = &service_config.provider;
    let client = build_http_client(settings.upstream.timeout_ms)?;
    let base_url = provider.base_url().to_owned();

    let (upstream, token_manager, refresher) = match secrets {
        ProviderSecrets::Transit(credential) => {
            let source = OAuth2Source::new(provider.token_url().to_owned(), credential, client.clone());
            let manager = TokenManager::new(source, RefreshSchedule::from(&settings.token));

            let token = manager
                .startup_init(&RetrySettings::from(&settings.token.startup_retry))
                .await?;
            let refresher = manager.spawn_refresh_loop(manager.schedule().next_delay(&token));

            let upstream = Upstream::Transit { base_url, tokens: manager.slot() };
            (upstream, Some(manager), Some(refresher))
        }
        ProviderSecrets::Places(api_key) => (Upstream::Places { base_url, api_key }, None, None),
    };

    info!("nearby searches go to the {} provider at {}", provider.provider_type.as_str(), provider.base_url());
    Ok(Bootstrapped {
        gateway: Arc::new(Gateway::new(client, upstream)),
        token_manager,
        refresher,
    })
}
