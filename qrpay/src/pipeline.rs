//! End-to-end processing of one payment request.
//!
//! [`PaymentRequestPipeline`] wires the stages together:
//! [`parse_intent`] → [`encode_uri`] (which re-validates the address) →
//! [`Renderer`]. The first two stages are pure and cheap; rendering is
//! CPU-bound, so [`JobOrchestrator`](crate::job::JobOrchestrator) calls
//! [`prepare`](PaymentRequestPipeline::prepare) inline and
//! [`render`](PaymentRequestPipeline::render) on the blocking pool.

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use serde::Serialize;

use crate::chain::{ChainRegistry, TokenDefinition};
use crate::error::Result;
use crate::intent::{PaymentIntent, parse_intent};
use crate::render::Renderer;
use crate::uri::encode_uri;

/// Intent parameters plus the resolved token definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentParams {
    /// The parsed intent, flattened into this object.
    #[serde(flatten)]
    pub intent: PaymentIntent,
    /// Registry entry for the intent's token.
    pub token_info: TokenDefinition,
}

/// A validated request whose URI has been built but not yet rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedPayment {
    /// The payment URI.
    pub uri: String,
    /// Parameters the URI was built from.
    pub params: PaymentParams,
}

/// Final result of a successful job.
///
/// Serializes as `{"qrCodeImage": ..., "uri": ..., "params": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentQr {
    /// Rendered image of `uri` (a PNG data URL with the default renderer).
    pub qr_code_image: String,
    /// The payment URI.
    pub uri: String,
    /// Parameters the URI was built from.
    pub params: PaymentParams,
}

/// Parser, encoder and renderer bound to one chain registry.
#[derive(Clone)]
pub struct PaymentRequestPipeline {
    registry: Arc<ChainRegistry>,
    renderer: Arc<dyn Renderer>,
}

impl Debug for PaymentRequestPipeline {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentRequestPipeline")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl PaymentRequestPipeline {
    /// Creates a pipeline from a registry and a renderer.
    #[must_use]
    pub fn new(registry: ChainRegistry, renderer: impl Renderer + 'static) -> Self {
        Self {
            registry: Arc::new(registry),
            renderer: Arc::new(renderer),
        }
    }

    /// Built-in chain registry with the PNG QR renderer.
    #[cfg(feature = "qrcode")]
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(ChainRegistry::builtin(), crate::render::QrPngRenderer::default())
    }

    /// Returns the chain registry.
    #[must_use]
    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    /// Parses, validates and encodes `input`.
    ///
    /// # Errors
    ///
    /// Returns any parsing, lookup, address or amount [`Error`](crate::Error).
    pub fn prepare(&self, input: &str) -> Result<PreparedPayment> {
        let intent = parse_intent(&self.registry, input)?;
        let uri = encode_uri(&self.registry, &intent)?;
        let token_info = *self.registry.lookup_token(&intent.chain, &intent.token)?;

        #[cfg(feature = "telemetry")]
        tracing::debug!(chain = %intent.chain, token = %intent.token, %uri, "Payment URI built");

        Ok(PreparedPayment {
            uri,
            params: PaymentParams { intent, token_info },
        })
    }

    /// Renders a prepared payment into its final result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`](crate::Error::Render) if the renderer fails.
    pub fn render(&self, prepared: PreparedPayment) -> Result<PaymentQr> {
        let qr_code_image = self.renderer.render(&prepared.uri)?;
        Ok(PaymentQr {
            qr_code_image,
            uri: prepared.uri,
            params: prepared.params,
        })
    }

    /// Runs every stage synchronously.
    ///
    /// # Errors
    ///
    /// Returns the first stage's [`Error`](crate::Error).
    pub fn process(&self, input: &str) -> Result<PaymentQr> {
        let prepared = self.prepare(input)?;
        self.render(prepared)
    }
}
