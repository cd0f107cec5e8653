//! Outbound adapters for the notification port.

mod log;
mod signing;
mod webhook;

pub use log::LogNotifier;
pub use signing::{sign_payload, verify_signature};
pub use webhook::WebhookNotifier;
