//! Server runtime: configuration, log setup, and the gRPC service
//! implementations.

pub mod config;
pub mod service;
pub mod telemetry;
