//! Copies raster surfaces onto `<canvas>` elements.

use thumbcrop_core::{RasterSurface, RenderError, Surface};
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

/// Size the canvas backing store to match `surface`.
pub(crate) fn prepare(canvas: &HtmlCanvasElement, surface: &RasterSurface) {
    let (width, height) = surface.dimensions();
    canvas.set_width(width);
    canvas.set_height(height);
}

fn context(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, RenderError> {
    canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
        .ok_or(RenderError::MissingSurface("2d canvas context"))
}

/// Put the pixels of `surface` on `canvas`.
pub(crate) fn blit(
    surface: &RasterSurface,
    canvas: &HtmlCanvasElement,
) -> Result<(), RenderError> {
    let ctx = context(canvas)?;
    let (width, height) = surface.dimensions();
    let data =
        ImageData::new_with_u8_clamped_array_and_sh(Clamped(surface.pixels()), width, height)
            .map_err(|_| RenderError::MissingSurface("image data"))?;
    ctx.put_image_data(&data, 0.0, 0.0)
        .map_err(|_| RenderError::MissingSurface("2d canvas context"))
}

/// [`blit`], skipping the frame if the canvas can't take it.
pub(crate) fn blit_or_skip(surface: &RasterSurface, canvas: &HtmlCanvasElement) {
    let result = blit(surface, canvas);
    debug_assert!(result.is_ok(), "canvas blit failed: {:?}", result);
    if let Err(e) = result {
        log::error!("skipping frame: {}", e);
    }
}
