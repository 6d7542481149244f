pub mod common;

mod bootstrap;
mod routes;
