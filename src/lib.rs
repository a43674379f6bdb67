pub mod anti_forgery;
pub mod authentication;
pub mod configuration;
pub mod directory;
pub mod domain;
pub mod intake;
mod routes;
pub mod session_state;
pub mod startup;
pub mod store;
pub mod telemetry;
