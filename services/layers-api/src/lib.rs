//! Layer API Service Library
//!
//! Assembles catalog layers (features, resolved visual configuration and
//! legend groups) and serves them over HTTP to the map client.

pub mod assembly;
pub mod config;
pub mod handlers;
pub mod legacy;
pub mod metrics;
pub mod routes;
pub mod state;
