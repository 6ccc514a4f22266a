//! # eduhr-server
//!
//! Standalone HTTP server for AAI@EduHr federated login: loads configuration,
//! wires the in-memory stores and the SimpleSAMLphp gateway client into the
//! `eduhr-auth` router.

pub mod bootstrap;
pub mod config;
pub mod gateway;
pub mod observability;
pub mod server;

pub use gateway::SspGatewayClient;
pub use server::{EduhrServer, ServerBuilder, build_app, build_state};
