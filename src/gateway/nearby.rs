use axum::body::Bytes;
use reqwest::{Client, StatusCode};
use serde::de::IgnoredAny;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::gateway::error::GatewayError;
use crate::gateway::upstream::{NearbySearch, Upstream};
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;
use crate::utils::constants::{DEFAULT_PLACE_TYPE, DEFAULT_RADIUS_METERS};

static SUCCESS_MSG: &str = "success";

/// Query string of `GET /nearby-bus-stops`.
#[derive(Debug, Clone, Deserialize)]
pub struct NearbyQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default = "default_radius")]
    pub radius: u32,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
}

impl NearbyQuery {
    pub fn validate(self) -> Result<NearbySearch, GatewayError> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Ok(NearbySearch {
                latitude,
                longitude,
                radius: self.radius,
                kind: self.kind,
            }),
            _ => Err(GatewayError::MissingCoordinates),
        }
    }
}

fn default_radius() -> u32 {
    DEFAULT_RADIUS_METERS
}

fn default_kind() -> String {
    DEFAULT_PLACE_TYPE.to_string()
}

/// Forwards nearby queries to the configured provider and relays the answer.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: Client,
    upstream: Upstream,
}

impl Gateway {
    pub fn new(client: Client, upstream: Upstream) -> Self {
        Self { client, upstream }
    }

    pub fn upstream(&self) -> &Upstream {
        &self.upstream
    }

    /// Returns the upstream JSON body untouched, or the error to report.
    pub async fn nearby_bus_stops(&self, query: NearbyQuery) -> Result<Bytes, GatewayError> {
        let search = query.validate()?;
        let provider = self.upstream.provider_type().as_str();
        let metrics = get_metrics().await;
        let start = get_instant();

        let result = self.forward(&search).await;

        metrics
            .upstream_duration
            .with_label_values(&[provider])
            .observe(start.elapsed().as_secs_f64());
        let outcome = match &result {
            Ok(body) => {
                info!("{} nearby search ({}, {}, {}m) returned {} bytes", provider, search.latitude, search.longitude, search.radius, body.len());
                SUCCESS_MSG
            }
            Err(err) => {
                warn!("{} nearby search failed: {}", provider, err);
                err.outcome()
            }
        };
        metrics.upstream_requests.with_label_values(&[provider, outcome]).inc();

        result
    }

    async fn forward(&self, search: &NearbySearch) -> Result<Bytes, GatewayError> {
        let request = self.upstream.nearby_request(&self.client, search).await?;

        let response = request.send().await.map_err(|err| {
            if err.is_builder() {
                GatewayError::Unexpected(err.to_string())
            } else {
                GatewayError::network(&err)
            }
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(GatewayError::UpstreamStatus(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|err| GatewayError::network(&err))?;
        serde_json::from_slice::<IgnoredAny>(&body)
            .map_err(|err| GatewayError::Unexpected(format!("upstream returned invalid JSON: {}", err)))?;
        debug!("relaying upstream body verbatim");
        Ok(body)
    }
}
