//! # Bus Stop Gateway Library
//!
//! Forwards nearby bus stop queries to a places API or to a transit-data
//! API protected by OAuth2 client-credentials tokens, and relays the
//! upstream JSON as-is.
//!
//! Modules:
//! - `config`: service configuration, provider selection and credentials
//! - `cache`: access token and its single-slot holder
//! - `sources`: client-credentials grant and the refresh loop
//! - `gateway`: nearby search forwarding, error payloads, canned responses
//! - `server`: axum router, CORS and startup wiring

pub mod cache;
pub mod config;
pub mod gateway;
pub mod helpers;
pub mod observability;
pub mod resilience;
pub mod server;
pub mod sources;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::config::provider::ServiceConfig;
