//! Remote order API adapter

pub mod client;
pub mod errors;

pub use client::{GatewayConfig, HttpOrderGateway};
pub use errors::{ApiError, ApiErrorCategory};
