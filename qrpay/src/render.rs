//! Rendering of payment URIs into scannable images.
//!
//! The pipeline only depends on the [`Renderer`] trait. The default
//! implementation, [`QrPngRenderer`] (feature `qrcode`), encodes the text as a
//! high error-correction QR code and returns it as a PNG `data:` URL that can
//! be embedded directly in HTML.

/// Errors raised by a [`Renderer`].
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The text does not fit in a QR symbol.
    #[error("QR generation failed: {0}")]
    Encode(String),
    /// The bitmap could not be serialized.
    #[error("image encoding failed: {0}")]
    Image(String),
}

impl From<RenderError> for crate::Error {
    fn from(err: RenderError) -> Self {
        Self::Render(err.to_string())
    }
}

/// Turns text into an image representation (`render(text) → image`).
pub trait Renderer: Send + Sync {
    /// Renders `text`, returning the image as a string (e.g. a data URL).
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if the text cannot be rendered.
    fn render(&self, text: &str) -> Result<String, RenderError>;
}

/// Renderer that returns its input unchanged.
///
/// Useful where a caller only needs the URI, and in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughRenderer;

impl Renderer for PassthroughRenderer {
    fn render(&self, text: &str) -> Result<String, RenderError> {
        Ok(text.to_owned())
    }
}

#[cfg(feature = "qrcode")]
pub use qr::*;

#[cfg(feature = "qrcode")]
mod qr {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use image::{ExtendedColorType, ImageEncoder, Luma};
    use qrcode::{EcLevel, QrCode};

    use super::{RenderError, Renderer};

    /// QR renderer producing `data:image/png;base64,...` URLs.
    #[derive(Debug, Clone, Copy)]
    pub struct QrPngRenderer {
        /// Minimum image width and height in pixels.
        pub size: u32,
        /// Whether to surround the symbol with a quiet zone.
        pub quiet_zone: bool,
        /// Error-correction level.
        pub ec_level: EcLevel,
    }

    impl Default for QrPngRenderer {
        fn default() -> Self {
            Self {
                size: 300,
                quiet_zone: true,
                ec_level: EcLevel::H,
            }
        }
    }

    impl QrPngRenderer {
        /// Creates a renderer with the default options and the given size.
        #[must_use]
        pub fn with_size(size: u32) -> Self {
            Self {
                size,
                ..Self::default()
            }
        }

        /// Renders `text` to raw PNG bytes.
        ///
        /// # Errors
        ///
        /// Returns a [`RenderError`] if the QR symbol or PNG cannot be built.
        pub fn png(&self, text: &str) -> Result<Vec<u8>, RenderError> {
            let code = QrCode::with_error_correction_level(text.as_bytes(), self.ec_level)
                .map_err(|e| RenderError::Encode(e.to_string()))?;
            let bitmap = code
                .render::<Luma<u8>>()
                .quiet_zone(self.quiet_zone)
                .min_dimensions(self.size, self.size)
                .build();

            let mut bytes = Vec::new();
            image::codecs::png::PngEncoder::new(&mut bytes)
                .write_image(
                    bitmap.as_raw(),
                    bitmap.width(),
                    bitmap.height(),
                    ExtendedColorType::L8,
                )
                .map_err(|e| RenderError::Image(e.to_string()))?;
            Ok(bytes)
        }
    }

    impl Renderer for QrPngRenderer {
        fn render(&self, text: &str) -> Result<String, RenderError> {
            let png = self.png(text)?;
            Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_png_has_magic_bytes_and_min_size() {
            let renderer = QrPngRenderer::with_size(128);
            let png = renderer.png("bitcoin:1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa?amount=1").unwrap();
            assert!(png.starts_with(&[0x89, 0x50, 0x4E, 0x47]));

            let decoded = image::load_from_memory(&png).unwrap();
            assert!(decoded.width() >= 128);
            assert_eq!(decoded.width(), decoded.height());
        }

        #[test]
        fn test_render_returns_data_url() {
            let url = QrPngRenderer::default()
                .render("solana:9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM?amount=1")
                .unwrap();
            assert!(url.starts_with("data:image/png;base64,"));
        }

        #[test]
        fn test_oversized_payload_is_an_error() {
            let text = "x".repeat(8000);
            assert!(matches!(
                QrPngRenderer::default().render(&text),
                Err(RenderError::Encode(_))
            ));
        }
    }
}
