use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};

use crate::cache::token_slot::TokenSlot;
use crate::config::credentials::ApiKey;
use crate::config::provider::ProviderType;
use crate::gateway::error::GatewayError;
use crate::utils::constants::{PLACES_NEARBY_PATH, TRANSIT_NEARBY_PATH};

/// Validated nearby query.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbySearch {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: u32,
    pub kind: String,
}

/// `nearby(lat,lon,radius)` as understood by the transit-data API.
pub fn spatial_filter(latitude: f64, longitude: f64, radius: u32) -> String {
    format!("nearby({},{},{})", coordinate(latitude), coordinate(longitude), radius)
}

/// Whole degrees keep their decimal point: `25.0`, not `25`.
pub fn coordinate(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// Provider answering nearby queries.
#[derive(Debug, Clone)]
pub enum Upstream {
    /// bearer-token protected transit-data API
    Transit { base_url: String, tokens: TokenSlot },
    /// places API authenticated by key
    Places { base_url: String, api_key: ApiKey },
}

impl Upstream {
    pub fn provider_type(&self) -> ProviderType {
        match self {
            Upstream::Transit { .. } => ProviderType::Transit,
            Upstream::Places { .. } => ProviderType::Places,
        }
    }

    pub async fn nearby_request(
        &self,
        client: &Client,
        search: &NearbySearch,
    ) -> Result<RequestBuilder, GatewayError> {
        match self {
            Upstream::Transit { base_url, tokens } => {
                let token = tokens.current().await.ok_or_else(|| {
                    GatewayError::Unexpected("access token is not available".to_string())
                })?;
                let filter = spatial_filter(search.latitude, search.longitude, search.radius);
                Ok(client
                    .get(join(base_url, TRANSIT_NEARBY_PATH))
                    .query(&[("$spatialFilter", filter.as_str()), ("$format", "JSON")])
                    .header(AUTHORIZATION, format!("Bearer {}", token.value)))
            }
            Upstream::Places { base_url, api_key } => {
                let location = format!("{},{}", coordinate(search.latitude), coordinate(search.longitude));
                let radius = search.radius.to_string();
                Ok(client.get(join(base_url, PLACES_NEARBY_PATH)).query(&[
                    ("location", location.as_str()),
                    ("radius", radius.as_str()),
                    ("type", search.kind.as_str()),
                    ("key", api_key.0.as_str()),
                ]))
            }
        }
    }
}

fn join(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}
