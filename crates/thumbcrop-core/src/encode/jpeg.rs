//! JPEG encoding for export.
//!
//! JPEG has no alpha channel, so the crop's transparent corners are
//! composited onto a solid matte colour before encoding.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;

use super::{validate, EncodeError};

/// Encode RGB pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - JPEG quality (1-100, where 100 is highest quality)
///
/// # Example
///
/// ```
/// use thumbcrop_core::encode::encode_jpeg;
///
/// let pixels = vec![128u8; 100 * 100 * 3]; // Gray image
/// let jpeg = encode_jpeg(&pixels, 100, 100, 90).unwrap();
///
/// // Verify JPEG magic bytes
/// assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
/// ```
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    validate(pixels, width, height, 3)?;

    // Clamp quality to valid range (1-100)
    let quality = quality.clamp(1, 100);

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);

    encoder
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

/// Composite straight RGBA8 pixels over an opaque `matte`, returning RGB8.
pub fn flatten_rgba(pixels: &[u8], matte: [u8; 3]) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixels.len() / 4 * 3);
    for px in pixels.chunks_exact(4) {
        let a = px[3] as u32;
        for c in 0..3 {
            let blended = (px[c] as u32 * a + matte[c] as u32 * (255 - a) + 127) / 255;
            out.push(blended as u8);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_jpeg_basic() {
        let pixels = vec![128u8; 100 * 100 * 3];
        let jpeg_bytes = encode_jpeg(&pixels, 100, 100, 90).unwrap();

        // SOI and EOI markers
        assert_eq!(&jpeg_bytes[0..2], &[0xFF, 0xD8]);
        let len = jpeg_bytes.len();
        assert_eq!(&jpeg_bytes[len - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_jpeg_quality_clamping() {
        let pixels = vec![128u8; 10 * 10 * 3];

        // Quality 0 should be clamped to 1
        assert!(encode_jpeg(&pixels, 10, 10, 0).is_ok());
        // Quality 255 should be clamped to 100
        assert!(encode_jpeg(&pixels, 10, 10, 255).is_ok());
    }

    #[test]
    fn test_encode_jpeg_invalid_pixel_data() {
        let pixels = vec![128u8; 99 * 100 * 3]; // One row short
        let result = encode_jpeg(&pixels, 100, 100, 90);
        assert!(matches!(result, Err(EncodeError::InvalidPixelData { .. })));
    }

    #[test]
    fn test_encode_jpeg_zero_width() {
        let result = encode_jpeg(&[], 0, 100, 90);
        assert!(matches!(result, Err(EncodeError::InvalidDimensions { .. })));
    }

    #[test]
    fn test_flatten_opaque_is_unchanged() {
        let rgba = [10, 20, 30, 255, 40, 50, 60, 255];
        assert_eq!(flatten_rgba(&rgba, [255, 255, 255]), vec![10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn test_flatten_transparent_takes_matte() {
        let rgba = [10, 20, 30, 0];
        assert_eq!(flatten_rgba(&rgba, [255, 128, 0]), vec![255, 128, 0]);
    }

    #[test]
    fn test_flatten_half_alpha_blends() {
        let rgba = [255, 0, 0, 128];
        let rgb = flatten_rgba(&rgba, [0, 0, 255]);
        assert!((rgb[0] as i32 - 128).abs() <= 1);
        assert_eq!(rgb[1], 0);
        assert!((rgb[2] as i32 - 127).abs() <= 1);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
