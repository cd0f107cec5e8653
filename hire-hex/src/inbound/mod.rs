//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the application layer.

pub mod handlers;
mod rate_limit;
mod requester;
mod server;

pub use rate_limit::RateLimiterState;
pub use requester::{ACCOUNT_HEADER, Requester};
pub use server::HttpServer;
