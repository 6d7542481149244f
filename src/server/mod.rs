pub mod bootstrap;
pub mod server;
