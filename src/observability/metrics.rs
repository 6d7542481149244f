use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Token metrics
    pub token_fetch_requests: IntCounterVec,
    pub token_fetch_failures: IntCounterVec,
    pub token_fetch_duration: HistogramVec,
    pub token_expiry_unix: IntGauge,
    pub token_state: IntGauge,

    // Upstream metrics
    pub upstream_requests: IntCounterVec,
    pub upstream_duration: HistogramVec,

    // Config/runtime
    pub parse_failures: IntCounter,
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        // metric names and label sets are static, construction cannot fail
        let metrics = Arc::new(Self {
            token_fetch_requests: IntCounterVec::new(Opts::new("token_fetch_requests_total", "Token fetch attempts by phase"), &["phase"]).unwrap(),
            token_fetch_failures: IntCounterVec::new(Opts::new("token_fetch_failures_total", "Token fetch failures by phase and reason"), &["phase", "reason"]).unwrap(),
            token_fetch_duration: HistogramVec::new(HistogramOpts::new("token_fetch_duration_seconds", "Token fetch duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]), &["phase"]).unwrap(),
            token_expiry_unix: IntGauge::new("token_expiry_unix_seconds", "Current token expiry timestamp").unwrap(),
            token_state: IntGauge::new("token_state", "0 uninitialized, 1 fetching, 2 valid, 3 refreshing, 4 stale").unwrap(),

            upstream_requests: IntCounterVec::new(Opts::new("upstream_requests_total", "Geolocation requests by provider and outcome"), &["provider", "outcome"]).unwrap(),
            upstream_duration: HistogramVec::new(HistogramOpts::new("upstream_request_duration_seconds", "Geolocation request duration seconds").buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]), &["provider"]).unwrap(),

            parse_failures: IntCounter::new("config_parse_failures_total", "Config parse failures").unwrap(),
            config_validation_errors: IntCounter::new("config_validation_errors_total", "Validation errors during startup").unwrap(),
            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry: Registry::new_custom(Some("busstopgateway".into()), None).unwrap(),
        });

        let reg = &metrics.registry;
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(metrics.token_fetch_requests.clone()),
            Box::new(metrics.token_fetch_failures.clone()),
            Box::new(metrics.token_fetch_duration.clone()),
            Box::new(metrics.token_expiry_unix.clone()),
            Box::new(metrics.token_state.clone()),
            Box::new(metrics.upstream_requests.clone()),
            Box::new(metrics.upstream_duration.clone()),
            Box::new(metrics.parse_failures.clone()),
            Box::new(metrics.config_validation_errors.clone()),
            Box::new(metrics.up.clone()),
        ];
        for collector in collectors {
            if let Err(err) = reg.register(collector) {
                tracing::warn!("metric registration failed: {}", err);
            }
        }

        metrics
    }
}
