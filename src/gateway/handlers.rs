use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::gateway::error::GatewayError;
use crate::gateway::mock::mock_bus_stops;
use crate::gateway::nearby::NearbyQuery;
use crate::server::server::AppState;

pub async fn read_root() -> Json<Value> {
    Json(json!({ "Hello": "World" }))
}

#[derive(Debug, Deserialize)]
pub struct ItemQuery {
    pub q: Option<String>,
}

pub async fn read_item(Path(item_id): Path<i64>, Query(query): Query<ItemQuery>) -> Json<Value> {
    Json(json!({ "item_id": item_id, "q": query.q }))
}

/// Malformed parameters are reported in the JSON error payload, like every other failure.
pub async fn nearby_bus_stops(
    State(state): State<AppState>,
    query: Result<Query<NearbyQuery>, QueryRejection>,
) -> Response {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            warn!("nearby-bus-stops query rejected: {}", rejection.body_text());
            return GatewayError::InvalidQuery(rejection.body_text()).into_response();
        }
    };
    match state.gateway.nearby_bus_stops(query).await {
        Ok(body) => ([(CONTENT_TYPE, "application/json")], body).into_response(),
        Err(err) => err.into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct BusStopsQuery {
    #[serde(rename = "busStopName")]
    pub bus_stop_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius: Option<u32>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Always answers with the canned payload, whatever the query says.
pub async fn bus_stops(query: Result<Query<BusStopsQuery>, QueryRejection>) -> Response {
    match query {
        Ok(Query(query)) => debug!("busStopName: {:?}", query.bus_stop_name),
        Err(rejection) => debug!("bus-stops query ignored: {}", rejection),
    }
    mock_bus_stops()
}
