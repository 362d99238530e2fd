//! Image ingestion - payload decoding and recompression.
//!
//! Admin uploads arrive as base64 text, sometimes wrapped in a data URL prefix and
//! sometimes base64-encoded twice (once by the browser, once by the transport). The
//! helpers here peel those layers off, downscale oversized images and re-encode them
//! as JPEG so the result can be stored inline as a data URL.

use crate::config::ImageConfig;
use crate::errors::{Error, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType};
use tracing::{debug, instrument};

/// Most encoding layers peeled off a payload before giving up.
const MAX_ENCODING_LAYERS: usize = 2;

/// Output of [`compress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub original_size: usize,
}

impl CompressedImage {
    /// Encoded size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// `size / original_size`, rounded to two decimals.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compression_ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        let ratio = self.bytes.len() as f64 / self.original_size as f64;
        (ratio * 100.0).round() / 100.0
    }

    /// Inline `data:image/jpeg;base64,...` representation.
    #[must_use]
    pub fn data_url(&self) -> String {
        data_url("image/jpeg", &self.bytes)
    }
}

/// Builds a data URL for `bytes` of the given media type.
#[must_use]
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Decodes a base64 file payload into raw bytes.
///
/// Accepts an optional `data:<mime>;base64,` prefix and unwraps a second base64 layer
/// when the first decode yields base64 text rather than a recognisable image.
///
/// # Errors
/// Returns a decode error when the payload is not valid base64.
pub fn decode_payload(encoded: &str) -> Result<Vec<u8>> {
    let encoded = strip_data_url_prefix(encoded.trim());
    let bytes = decode_base64(encoded.as_bytes())?;
    Ok(unwrap_encoded(bytes))
}

/// Peels extra base64 layers off bytes that should be binary image data.
///
/// Bytes that already look like an image, or that are not base64 text, are
/// returned unchanged.
#[must_use]
pub fn unwrap_encoded(mut bytes: Vec<u8>) -> Vec<u8> {
    for _ in 0..MAX_ENCODING_LAYERS {
        if image::guess_format(&bytes).is_ok() || !looks_like_base64(&bytes) {
            break;
        }
        let trimmed = strip_data_url_prefix_bytes(&bytes);
        match decode_base64(trimmed) {
            Ok(inner) => {
                debug!(outer = bytes.len(), inner = inner.len(), "Unwrapped nested base64 layer");
                bytes = inner;
            }
            Err(_) => break,
        }
    }
    bytes
}

/// Decodes, flattens to RGB, downscales to fit `settings.max_dimension` and
/// re-encodes as JPEG.
///
/// # Errors
/// Returns an image error when the bytes are not a supported image format or the
/// JPEG encoder fails.
#[instrument(skip(bytes, settings), fields(original_size = bytes.len()))]
pub fn compress(bytes: &[u8], settings: &ImageConfig) -> Result<CompressedImage> {
    let decoded = image::load_from_memory(bytes)?;
    let max = settings.max_dimension;
    let resized = if decoded.width() > max || decoded.height() > max {
        decoded.resize(max, max, FilterType::Lanczos3)
    } else {
        decoded
    };
    let rgb = resized.to_rgb8();

    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, settings.jpeg_quality);
    encoder.encode_image(&rgb)?;

    debug!(
        width = rgb.width(),
        height = rgb.height(),
        size = out.len(),
        "Image recompressed"
    );
    Ok(CompressedImage {
        width: rgb.width(),
        height: rgb.height(),
        bytes: out,
        original_size: bytes.len(),
    })
}

fn decode_base64(encoded: &[u8]) -> Result<Vec<u8>> {
    let cleaned: Vec<u8> = encoded
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Err(Error::validation("Empty file payload"));
    }
    STANDARD.decode(cleaned).map_err(Into::into)
}

fn strip_data_url_prefix(encoded: &str) -> &str {
    match encoded.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => encoded,
    }
}

fn strip_data_url_prefix_bytes(bytes: &[u8]) -> &[u8] {
    std::str::from_utf8(bytes).map_or(bytes, |text| strip_data_url_prefix(text.trim()).as_bytes())
}

fn looks_like_base64(bytes: &[u8]) -> bool {
    let body = strip_data_url_prefix_bytes(bytes);
    !body.is_empty()
        && body.iter().all(|b| {
            b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'=') || b.is_ascii_whitespace()
        })
}
