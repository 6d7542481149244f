//! Inbound geolocation queries and their upstream forwarding.

pub mod error;
pub mod handlers;
pub mod mock;
pub mod nearby;
pub mod upstream;
