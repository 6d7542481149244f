#[cfg(test)]
mod test {

    use std::sync::Arc;

    use reqwest::{Method, StatusCode};

    use crate::cache::token_slot::TokenSlot;
    use crate::config::settings::SettingsConfig;
    use crate::gateway::mock::MOCK_SEARCH_BUS_STOP_RESPONSE;
    use crate::gateway::nearby::Gateway;
    use crate::gateway::upstream::Upstream;
    use crate::observability::metrics::get_metrics;
    use crate::server::server::{router, AppState};
    use crate::tests::common::{build_reqwest_client, json, spawn_axum, spawn_gateway};

    fn idle_upstream() -> Upstream {
        Upstream::Transit { base_url: "http://127.0.0.1:9".into(), tokens: TokenSlot::new() }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn root_and_items_endpoints() {
        let (handle, addr) = spawn_gateway(idle_upstream()).await;
        let client = build_reqwest_client();

        let root: serde_json::Value = client.get(format!("http://{}/", addr)).send().await.unwrap().json().await.unwrap();
        assert_eq!(root, json!({"Hello": "World"}));

        let item: serde_json::Value = client
            .get(format!("http://{}/items/42?q=somequery", addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(item, json!({"item_id": 42, "q": "somequery"}));

        let item: serde_json::Value = client.get(format!("http://{}/items/7", addr)).send().await.unwrap().json().await.unwrap();
        assert_eq!(item, json!({"item_id": 7, "q": null}));

        let res = client.get(format!("http://{}/items/not-a-number", addr)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        handle.abort();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn bus_stops_returns_mock_for_any_input() {
        let (handle, addr) = spawn_gateway(idle_upstream()).await;
        let client = build_reqwest_client();

        for query in [
            "",
            "?busStopName=Taipei%20Main%20Station",
            "?busStopName=x&latitude=25.04&longitude=121.51&radius=100&type=bus_station",
            "?latitude=not-a-number&radius=-1",
        ] {
            let res = client.get(format!("http://{}/bus-stops{}", addr, query)).send().await.unwrap();
            assert_eq!(res.status(), StatusCode::OK, "query {}", query);
            assert_eq!(res.headers()["content-type"], "application/json");
            assert_eq!(res.bytes().await.unwrap(), MOCK_SEARCH_BUS_STOP_RESPONSE.as_bytes(), "query {}", query);
        }
        handle.abort();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn cors_allows_any_origin_with_credentials() {
        let (handle, addr) = spawn_gateway(idle_upstream()).await;
        let client = build_reqwest_client();

        let preflight = client
            .request(Method::OPTIONS, format!("http://{}/nearby-bus-stops", addr))
            .header("origin", "http://frontend.example")
            .header("access-control-request-method", "GET")
            .header("access-control-request-headers", "x-custom-header")
            .send()
            .await
            .unwrap();
        assert!(preflight.status().is_success());
        let headers = preflight.headers();
        assert_eq!(headers["access-control-allow-origin"], "http://frontend.example");
        assert_eq!(headers["access-control-allow-credentials"], "true");
        assert_eq!(headers["access-control-allow-methods"], "GET");
        assert_eq!(headers["access-control-allow-headers"], "x-custom-header");

        let res = client
            .get(format!("http://{}/", addr))
            .header("origin", "https://another.example")
            .send()
            .await
            .unwrap();
        assert_eq!(res.headers()["access-control-allow-origin"], "https://another.example");
        handle.abort();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn cors_origin_list_is_enforced() {
        let mut settings = SettingsConfig::default();
        settings.cors.allow_origins = vec!["https://allowed.example".into()];
        let gateway = Arc::new(Gateway::new(build_reqwest_client(), idle_upstream()));
        let app = router(&settings, AppState::new(get_metrics().await, gateway));
        let (handle, addr) = spawn_axum(app).await;
        let client = build_reqwest_client();

        let allowed = client.get(format!("http://{}/", addr)).header("origin", "https://allowed.example").send().await.unwrap();
        assert_eq!(allowed.headers()["access-control-allow-origin"], "https://allowed.example");

        let denied = client.get(format!("http://{}/", addr)).header("origin", "https://evil.example").send().await.unwrap();
        assert!(denied.headers().get("access-control-allow-origin").is_none());
        handle.abort();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn metrics_endpoint_when_enabled() {
        let mut settings = SettingsConfig::default();
        settings.metrics.is_enabled = true;
        let gateway = Arc::new(Gateway::new(build_reqwest_client(), idle_upstream()));
        let app = router(&settings, AppState::new(get_metrics().await, gateway));
        let (handle, addr) = spawn_axum(app).await;
        let client = build_reqwest_client();

        // drive one request through the gateway so a counter exists
        let _ = client.get(format!("http://{}/nearby-bus-stops?latitude=1&longitude=2", addr)).send().await.unwrap();

        let res = client.get(format!("http://{}/metrics", addr)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let text = res.text().await.unwrap();
        assert!(text.contains("busstopgateway_upstream_requests_total"), "{}", text);

        let (disabled_handle, disabled_addr) = spawn_gateway(idle_upstream()).await;
        let res = client.get(format!("http://{}/metrics", disabled_addr)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        handle.abort();
        disabled_handle.abort();
    }
}
