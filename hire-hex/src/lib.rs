//! # Hire Hex
//!
//! Application service layer and adapters for the hire marketplace.
//!
//! ## Architecture
//!
//! - `service/` - Application service (wallet flows, hire contracts, reviews, queries)
//! - `inbound/` - HTTP adapter (Axum server)
//! - `outbound/` - Notification adapters (log, signed webhook)
//!
//! The service is generic over `R: MarketRepository`, allowing
//! different store implementations to be injected.

pub mod inbound;
pub mod openapi;
pub mod outbound;
pub mod service;


pub use service::MarketService;
