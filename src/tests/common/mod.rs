pub use axum::Router;
pub use serde_json::json;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use httpmock::Method::POST;
use httpmock::{Mock, MockServer};
use reqwest::Client;

use crate::config::credentials::Credential;
use crate::config::settings::SettingsConfig;
use crate::gateway::nearby::Gateway;
use crate::gateway::upstream::Upstream;
use crate::observability::metrics::get_metrics;
use crate::server::server::{router, AppState};
use crate::sources::executor::token_refresh::{RefreshSchedule, TokenManager};
use crate::sources::oauth2::OAuth2Source;

pub const TOKEN_PATH: &str = "/auth/realms/TDXConnect/protocol/openid-connect/token";
pub const CLIENT_ID: &str = "gateway-client";
pub const CLIENT_SECRET: &str = "gateway-secret";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

/// Spawn the full gateway router in front of `upstream`.
pub async fn spawn_gateway(upstream: Upstream) -> (JoinHandle<()>, SocketAddr) {
    spawn_gateway_with(build_reqwest_client(), upstream).await
}

/// Same as `spawn_gateway`, with the outbound client supplied by the caller.
pub async fn spawn_gateway_with(client: Client, upstream: Upstream) -> (JoinHandle<()>, SocketAddr) {
    let metrics = get_metrics().await;
    let gateway = Arc::new(Gateway::new(client, upstream));
    let app = router(&SettingsConfig::default(), AppState::new(metrics, gateway));
    spawn_axum(app).await
}

/// Address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

pub fn credential() -> Credential {
    Credential { client_id: CLIENT_ID.into(), client_secret: CLIENT_SECRET.into() }
}

pub fn quick_schedule(min_refresh_ms: u64) -> RefreshSchedule {
    RefreshSchedule {
        safety_margin: Duration::from_secs(0),
        min_refresh: Duration::from_millis(min_refresh_ms),
        failure_retry: Duration::from_millis(min_refresh_ms),
    }
}

pub fn token_manager(server: &MockServer, schedule: RefreshSchedule) -> TokenManager {
    let source = OAuth2Source::new(server.url(TOKEN_PATH), credential(), build_reqwest_client());
    TokenManager::new(source, schedule)
}

/// Token endpoint answering a client-credentials grant for the test credential.
pub async fn mock_token_endpoint<'a>(server: &'a MockServer, access_token: &str, expires_in: i64) -> Mock<'a> {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path(TOKEN_PATH)
                .header("content-type", "application/x-www-form-urlencoded")
                .form_urlencoded_tuple("grant_type", "client_credentials")
                .form_urlencoded_tuple("client_id", CLIENT_ID)
                .form_urlencoded_tuple("client_secret", CLIENT_SECRET);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "access_token": access_token,
                    "expires_in": expires_in,
                    "token_type": "Bearer"
                }));
        })
        .await
}

pub async fn mock_token_failure<'a>(server: &'a MockServer, status: u16) -> Mock<'a> {
    server
        .mock_async(|when, then| {
            when.method(POST).path(TOKEN_PATH);
            then.status(status)
                .header("content-type", "application/json")
                .body("{\"error\":\"invalid_client\"}");
        })
        .await
}
