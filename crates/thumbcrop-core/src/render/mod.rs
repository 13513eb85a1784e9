//! Drawing the placed image onto the two output surfaces.
//!
//! ## Surfaces
//!
//! - **Preview**: viewport-sized, checker background, crop outline on top
//! - **Crop**: a fraction of the viewport, clipped once at setup to the
//!   inscribed circle so every draw onto it is masked
//!
//! Both surfaces are addressed in viewport units. A surface carries a fixed
//! logical-to-pixel scale (1.0 for the preview, the crop ratio for the crop
//! surface), so the same destination rectangle is used for both.
//!
//! ## Frame purity
//!
//! Each render starts with a clear, so a frame depends only on the image and
//! the destination rectangle passed in. Nothing accumulates between frames.

mod raster;

use image::Rgba;
use thiserror::Error;

use crate::config::EditorConfig;
use crate::decode::SourceImage;
use crate::geometry::{Circle, Rect};

pub use raster::RasterSurface;

/// Errors that prevent a frame from being drawn.
///
/// Both are fail-soft: the caller skips the frame and the previous pixels
/// stay on the surface.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    /// No image has been decoded yet.
    #[error("No source image loaded")]
    MissingImage,

    /// A drawable surface or its context is unavailable.
    #[error("Surface unavailable: {0}")]
    MissingSurface(&'static str),
}

/// The drawing capability the editor needs from an output surface.
///
/// All coordinates are viewport units; implementations map them to pixels.
pub trait Surface {
    /// Pixel dimensions of the backing store.
    fn dimensions(&self) -> (u32, u32);

    /// Reset every pixel to transparent.
    fn clear(&mut self);

    /// Paint a two-colour checkerboard with square cells of side `cell`.
    fn fill_checker(&mut self, cell: f64, light: Rgba<u8>, dark: Rgba<u8>);

    /// Draw `image` scaled to fill `dest`, composited source-over.
    fn draw_image(&mut self, image: &SourceImage, dest: Rect);

    /// Stroke the outline of `circle` with a line `width` units wide.
    fn stroke_circle(&mut self, circle: Circle, width: f64, color: Rgba<u8>);

    /// Restrict all subsequent drawing to the inside of `circle`.
    fn clip_to_circle(&mut self, circle: Circle);

    /// Straight RGBA8 pixels, row-major.
    fn pixels(&self) -> &[u8];
}

/// Appearance of the preview surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewStyle {
    pub checker_cell: f64,
    pub checker_light: Rgba<u8>,
    pub checker_dark: Rgba<u8>,
    pub outline_width: f64,
    pub outline_color: Rgba<u8>,
}

impl Default for PreviewStyle {
    fn default() -> Self {
        Self {
            checker_cell: 10.0,
            checker_light: Rgba([255, 255, 255, 255]),
            checker_dark: Rgba([204, 204, 204, 255]),
            outline_width: 1.0,
            outline_color: Rgba([0, 0, 0, 255]),
        }
    }
}

impl From<&EditorConfig> for PreviewStyle {
    fn from(config: &EditorConfig) -> Self {
        Self {
            checker_cell: config.checker_cell.max(1) as f64,
            outline_width: config.outline_width,
            ..Self::default()
        }
    }
}

/// Create the preview surface for a viewport of side `viewport` pixels.
pub fn preview_surface(viewport: u32) -> RasterSurface {
    RasterSurface::new(viewport, viewport, 1.0)
}

/// Create the crop surface and install its circular clip.
///
/// The clip is the circle inscribed in the viewport, expressed in viewport
/// units and scaled down with the surface.
pub fn crop_surface(viewport: u32, crop: u32) -> RasterSurface {
    let mut surface = RasterSurface::new(crop, crop, crop as f64 / viewport as f64);
    surface.clip_to_circle(Circle::inscribed(viewport as f64));
    surface
}

/// Draw one preview frame: checker, image, crop outline.
pub fn render_preview<S: Surface + ?Sized>(
    surface: &mut S,
    image: &SourceImage,
    dest: Rect,
    viewport: f64,
    style: &PreviewStyle,
) {
    surface.clear();
    surface.fill_checker(style.checker_cell, style.checker_light, style.checker_dark);
    surface.draw_image(image, dest);
    surface.stroke_circle(
        Circle::inscribed(viewport),
        style.outline_width,
        style.outline_color,
    );
}

/// Draw one crop frame. Masking comes from the clip installed at setup.
pub fn render_crop<S: Surface + ?Sized>(surface: &mut S, image: &SourceImage, dest: Rect) {
    surface.clear();
    surface.draw_image(image, dest);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records calls so the draw order can be checked without pixels.
    #[derive(Default)]
    struct RecordingSurface {
        calls: Vec<String>,
        buffer: Vec<u8>,
    }

    impl Surface for RecordingSurface {
        fn dimensions(&self) -> (u32, u32) {
            (0, 0)
        }
        fn clear(&mut self) {
            self.calls.push("clear".into());
        }
        fn fill_checker(&mut self, cell: f64, _light: Rgba<u8>, _dark: Rgba<u8>) {
            self.calls.push(format!("checker {cell}"));
        }
        fn draw_image(&mut self, _image: &SourceImage, dest: Rect) {
            self.calls.push(format!(
                "image {} {} {} {}",
                dest.x, dest.y, dest.width, dest.height
            ));
        }
        fn stroke_circle(&mut self, circle: Circle, _width: f64, _color: Rgba<u8>) {
            self.calls.push(format!(
                "circle {} {} {}",
                circle.center.x, circle.center.y, circle.radius
            ));
        }
        fn clip_to_circle(&mut self, _circle: Circle) {
            self.calls.push("clip".into());
        }
        fn pixels(&self) -> &[u8] {
            &self.buffer
        }
    }

    fn image() -> SourceImage {
        SourceImage::new(1, 1, vec![255, 0, 0, 255])
    }

    #[test]
    fn test_preview_draw_order() {
        let mut surface = RecordingSurface::default();
        let dest = Rect::new(0.0, 100.0, 400.0, 200.0);
        render_preview(&mut surface, &image(), dest, 400.0, &PreviewStyle::default());

        assert_eq!(
            surface.calls,
            vec![
                "clear",
                "checker 10",
                "image 0 100 400 200",
                "circle 200 200 200",
            ]
        );
    }

    #[test]
    fn test_crop_draw_order_has_no_checker_or_outline() {
        let mut surface = RecordingSurface::default();
        render_crop(&mut surface, &image(), Rect::new(0.0, 0.0, 400.0, 400.0));
        assert_eq!(surface.calls, vec!["clear", "image 0 0 400 400"]);
    }

    #[test]
    fn test_crop_surface_dimensions() {
        let surface = crop_surface(400, 100);
        assert_eq!(surface.dimensions(), (100, 100));
        assert_eq!(surface.scale(), 0.25);
        assert!(surface.clip().is_some());
    }

    #[test]
    fn test_style_from_config() {
        let mut config = EditorConfig::default();
        config.checker_cell = 0;
        config.outline_width = 3.0;

        let style = PreviewStyle::from(&config);
        assert_eq!(style.checker_cell, 1.0);
        assert_eq!(style.outline_width, 3.0);
    }
}
