use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};

/// Canned answer of `GET /bus-stops`; search by name is not backed by a provider.
pub const MOCK_SEARCH_BUS_STOP_RESPONSE: &str = include_str!("../../assets/mock_bus_stops.json");

pub fn mock_bus_stops() -> Response {
    ([(CONTENT_TYPE, "application/json")], MOCK_SEARCH_BUS_STOP_RESPONSE).into_response()
}
