//! HTTP job server for natural-language crypto payment requests.
//!
//! Exposes the [`qrpay`] pipeline as an asynchronous job API: clients submit
//! text, poll for status, and fetch a payment URI with its QR code.
//!
//! # Modules
//!
//! - [`handlers`] - Axum route handlers and router builder
//! - [`error`] - HTTP error mapping
//! - [`config`] - Server configuration with environment variable expansion
//! - [`util`] - Listener binding and graceful shutdown

pub mod config;
pub mod error;
pub mod handlers;
pub mod util;

pub use handlers::{AppState, app_router};
