//! Editor configuration.
//!
//! Everything that was a hardcoded constant of the editor lives here: the
//! viewport and crop surface sizes, the bundled default image, the download
//! filename and the export format. The struct deserializes from a partial
//! camelCase object, so the page only has to pass the fields it overrides.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encode::ExportFormat;

/// Errors raised by [`EditorConfig::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("viewport_size must be non-zero")]
    ZeroViewport,

    #[error("crop_size must be non-zero")]
    ZeroCrop,

    #[error("output_filename must not be empty")]
    EmptyFilename,

    #[error("{field} of {size} exceeds the maximum surface side of {max}")]
    TooLarge {
        field: &'static str,
        size: u32,
        max: u32,
    },
}

/// Largest accepted surface side, in pixels.
pub const MAX_SURFACE_SIZE: u32 = 8192;

/// Editor configuration with the reference defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Side of the square preview surface, in pixels. Also the logical
    /// coordinate space of every placement computation.
    pub viewport_size: u32,
    /// Side of the square crop surface, in pixels.
    pub crop_size: u32,
    /// Asset loaded when no file has been selected.
    pub default_image_path: String,
    /// Name given to the downloaded thumbnail.
    pub output_filename: String,
    /// Encoding of the exported thumbnail.
    pub format: ExportFormat,
    /// Side of one checker square on the preview background, in viewport units.
    pub checker_cell: u32,
    /// Width of the crop outline stroked on the preview, in viewport units.
    pub outline_width: f64,
    /// Background colour for formats without alpha.
    pub matte: [u8; 3],
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            viewport_size: 400,
            crop_size: 100,
            default_image_path: "/default.png".to_string(),
            output_filename: "thumbnail.png".to_string(),
            format: ExportFormat::Png,
            checker_cell: 10,
            outline_width: 1.0,
            matte: [255, 255, 255],
        }
    }
}

impl EditorConfig {
    /// Reject configurations that cannot produce a frame.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.viewport_size == 0 {
            return Err(ConfigError::ZeroViewport);
        }
        if self.crop_size == 0 {
            return Err(ConfigError::ZeroCrop);
        }
        for (field, size) in [
            ("viewport_size", self.viewport_size),
            ("crop_size", self.crop_size),
        ] {
            let bytes = (size as usize)
                .checked_mul(size as usize)
                .and_then(|n| n.checked_mul(4));
            if size > MAX_SURFACE_SIZE || bytes.is_none() {
                return Err(ConfigError::TooLarge {
                    field,
                    size,
                    max: MAX_SURFACE_SIZE,
                });
            }
        }
        if self.output_filename.trim().is_empty() {
            return Err(ConfigError::EmptyFilename);
        }
        Ok(())
    }

    /// Viewport side as a float, for geometry.
    pub fn viewport(&self) -> f64 {
        self.viewport_size as f64
    }

    /// Scale from viewport units to crop surface pixels (reference: 1/4).
    pub fn crop_ratio(&self) -> f64 {
        self.crop_size as f64 / self.viewport_size as f64
    }

    /// Download filename with its extension matched to the export format.
    pub fn download_filename(&self) -> String {
        std::path::Path::new(&self.output_filename)
            .with_extension(self.format.extension())
            .to_string_lossy()
            .into_owned()
    }
}
