//! Crop surface encoding for export.
//!
//! This module provides functionality for:
//! - Encoding RGBA pixels to PNG (the default, keeps the transparent corners)
//! - Encoding to JPEG with configurable quality, flattening alpha onto a matte
//!
//! # Examples
//!
//! ```ignore
//! use thumbcrop_core::encode::{encode_rgba, ExportFormat};
//!
//! let pixels = vec![0u8; 100 * 100 * 4]; // Fully transparent
//! let png = encode_rgba(&pixels, 100, 100, ExportFormat::Png, [255, 255, 255]).unwrap();
//! println!("Encoded {} bytes", png.len());
//! ```

mod jpeg;
mod png;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use jpeg::{encode_jpeg, flatten_rgba};
pub use png::encode_png;

/// Errors that can occur while encoding the crop.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * {channels}), got {actual}")]
    InvalidPixelData {
        expected: usize,
        actual: usize,
        channels: usize,
    },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying encoder failed
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Output format of the exported thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ExportFormat {
    /// Lossless PNG with alpha.
    #[default]
    Png,
    /// Lossy JPEG (1-100). Transparent pixels are composited onto the matte.
    Jpeg { quality: u8 },
}

impl ExportFormat {
    /// MIME type of the encoded bytes.
    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg { .. } => "image/jpeg",
        }
    }

    /// Conventional file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg { .. } => "jpg",
        }
    }
}

/// Encode straight RGBA8 pixels in the requested format.
///
/// `matte` is only used by formats without an alpha channel.
pub fn encode_rgba(
    pixels: &[u8],
    width: u32,
    height: u32,
    format: ExportFormat,
    matte: [u8; 3],
) -> Result<Vec<u8>, EncodeError> {
    match format {
        ExportFormat::Png => encode_png(pixels, width, height),
        ExportFormat::Jpeg { quality } => {
            validate(pixels, width, height, 4)?;
            let rgb = flatten_rgba(pixels, matte);
            encode_jpeg(&rgb, width, height, quality)
        }
    }
}

/// Check dimensions and buffer length for a `channels`-per-pixel image.
pub(crate) fn validate(
    pixels: &[u8],
    width: u32,
    height: u32,
    channels: usize,
) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = (width as usize) * (height as usize) * channels;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
            channels,
        });
    }

    Ok(())
}
