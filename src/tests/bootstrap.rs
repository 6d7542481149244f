// Startup wiring: credentials -> initial token -> refresh loop -> gateway.

#[cfg(test)]
mod test {

    use httpmock::Method::GET;
    use httpmock::MockServer;

    use crate::cache::token::TokenState;
    use crate::config::credentials::{ApiKey, ProviderSecrets};
    use crate::config::provider::{ProviderType, ServiceConfig};
    use crate::config::settings::RetryConfig;
    use crate::gateway::nearby::NearbyQuery;
    use crate::gateway::upstream::Upstream;
    use crate::server::bootstrap;
    use crate::tests::common::{credential, mock_token_endpoint, mock_token_failure, TOKEN_PATH};

    fn transit_config(server: &MockServer) -> ServiceConfig {
        let mut cfg = ServiceConfig::default();
        cfg.provider.provider_type = ProviderType::Transit;
        cfg.provider.base_url = Some(server.base_url());
        cfg.provider.token_url = Some(server.url(TOKEN_PATH));
        cfg.settings.token.startup_retry = RetryConfig {
            attempts: Some(2),
            base_delay_ms: Some(1),
            max_delay_ms: Some(2),
        };
        cfg
    }

    fn query() -> NearbyQuery {
        NearbyQuery { latitude: Some(25.04), longitude: Some(121.51), radius: 500, kind: "bus_stop".into() }
    }

    #[tokio::test]
    async fn transit_startup_fetches_token_and_serves_it() {
        let server = MockServer::start_async().await;
        let token_mock = mock_token_endpoint(&server, "boot-token", 86_400).await;
        let upstream_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v2/Bus/Stop/NearBy")
                    .header("authorization", "Bearer boot-token");
                then.status(200).body("[{\"StopUID\":\"X\"}]");
            })
            .await;

        let bootstrapped = bootstrap::build(&transit_config(&server), ProviderSecrets::Transit(credential()))
            .await
            .expect("bootstrap");

        let manager = bootstrapped.token_manager.as_ref().expect("token manager");
        assert_eq!(manager.state().await, TokenState::Valid);
        assert!(bootstrapped.refresher.is_some());
        assert!(matches!(bootstrapped.gateway.upstream(), Upstream::Transit { .. }));

        let body = bootstrapped.gateway.nearby_bus_stops(query()).await.expect("relay");
        assert_eq!(&body[..], b"[{\"StopUID\":\"X\"}]");

        token_mock.assert_calls_async(1).await;
        upstream_mock.assert_calls_async(1).await;
        bootstrapped.shutdown();
    }

    #[tokio::test]
    async fn transit_startup_fails_when_token_endpoint_is_down() {
        let server = MockServer::start_async().await;
        let token_mock = mock_token_failure(&server, 500).await;

        let result = bootstrap::build(&transit_config(&server), ProviderSecrets::Transit(credential())).await;

        let err = result.err().expect("startup must fail");
        assert!(err.to_string().contains("initial access token fetch failed"), "{}", err);
        token_mock.assert_calls_async(2).await;
    }

    #[tokio::test]
    async fn places_startup_needs_no_token() {
        let mut cfg = ServiceConfig::default();
        cfg.provider.provider_type = ProviderType::Places;

        let bootstrapped = bootstrap::build(&cfg, ProviderSecrets::Places(ApiKey("k".into())))
            .await
            .expect("bootstrap");

        assert!(bootstrapped.token_manager.is_none());
        assert!(bootstrapped.refresher.is_none());
        assert!(matches!(bootstrapped.gateway.upstream(), Upstream::Places { .. }));
    }
}
