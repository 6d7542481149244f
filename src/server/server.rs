use std::future::Future;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::settings::{CorsConfig, SettingsConfig};
use crate::gateway::handlers;
use crate::gateway::nearby::Gateway;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::utils::constants::{ROUTE_BUS_STOPS, ROUTE_ITEMS, ROUTE_NEARBY_BUS_STOPS, ROUTE_ROOT};

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub gateway: Arc<Gateway>,
}

impl AppState {
    pub fn new(metrics: &Metrics, gateway: Arc<Gateway>) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            gateway,
        }
    }
}

/// Every route of the gateway plus the metrics endpoint when enabled.
pub fn router(settings_config: &SettingsConfig, state: AppState) -> Router {
    Router::new()
        .route(ROUTE_ROOT, get(handlers::read_root))
        .route(ROUTE_ITEMS, get(handlers::read_item))
        .route(ROUTE_NEARBY_BUS_STOPS, get(handlers::nearby_bus_stops))
        .route(ROUTE_BUS_STOPS, get(handlers::bus_stops))
        .merge(state.metrics_state.router(&settings_config.metrics))
        .layer(cors_layer(&settings_config.cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Credentials are always allowed, so wildcards are expressed by mirroring the request.
pub fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origin = if cors.allows_any_origin() {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = cors
            .allow_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(err) => {
                    warn!("skipping CORS origin '{}': {}", origin, err);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Serve until `shutdown` resolves.
pub async fn start<F>(settings_config: &SettingsConfig, gateway: Arc<Gateway>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics = get_metrics().await;
    let app = router(settings_config, AppState::new(metrics, gateway));

    let bind_addr = format!("{}:{}", settings_config.server.host, settings_config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow!("cannot bind {}: {}", bind_addr, e))?;
    info!("listening on {}", bind_addr);

    metrics.up.set(1);
    let served = axum::serve(listener, app).with_graceful_shutdown(shutdown).await;
    metrics.up.set(0);

    served.map_err(|e| anyhow!("http server failed: {}", e))
}
