#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Natural-language crypto payment requests to payment URIs and QR codes.
//!
//! Given text such as `send 0.05 ETH to 0x1111...1111 on ethereum labeled "Test"`,
//! this crate extracts the payment parameters, validates them against the
//! target chain, and builds a wallet-scannable payment URI:
//!
//! ```text
//! ethereum:0x1111...1111?value=50000000000000000&label=Test
//! ```
//!
//! # Modules
//!
//! - [`chain`] - Chain and token definitions, [`ChainRegistry`](chain::ChainRegistry)
//! - [`networks`] - Built-in chain tables (Ethereum, Polygon, Solana, Bitcoin, Cardano)
//! - [`intent`] - Free-text extraction into a [`PaymentIntent`](intent::PaymentIntent)
//! - [`address`] - Per-family address grammars
//! - [`amount`] - Exact decimal to smallest-unit conversion
//! - [`uri`] - Chain-specific payment URI construction
//! - [`render`] - The [`Renderer`](render::Renderer) seam and the PNG QR renderer
//! - [`pipeline`] - Parse, encode and render in one call
//! - [`job`] - Background execution with polling and bounded retention
//! - [`timestamp`] - Millisecond wall-clock timestamps
//!
//! # Feature Flags
//!
//! - `qrcode` (default) - PNG QR rendering via the `qrcode` and `image` crates
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod address;
pub mod amount;
pub mod chain;
pub mod error;
pub mod intent;
pub mod job;
pub mod networks;
pub mod pipeline;
pub mod render;
pub mod timestamp;
pub mod uri;

pub use error::{Error, Result};
