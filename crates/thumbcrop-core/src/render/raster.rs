//! Software implementation of [`Surface`] on an `image::RgbaImage`.
//!
//! # Algorithm
//!
//! Every operation walks the pixels it may touch and evaluates the pixel
//! centre in viewport units (`(px + 0.5) / scale`):
//! 1. Skip the pixel if a clip is installed and the centre is outside it
//! 2. For images, map the centre back into source space and sample bilinearly
//!    in premultiplied alpha
//! 3. Composite source-over onto the stored straight-alpha pixel
//!
//! The clip is a hard edge: a pixel whose centre lies outside the circle is
//! never written, so it keeps whatever `clear` left there (transparent).

use image::{Rgba, RgbaImage};

use super::Surface;
use crate::decode::SourceImage;
use crate::geometry::{Circle, Point, Rect};

/// CPU raster surface with a fixed logical-to-pixel scale and optional
/// circular clip.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSurface {
    buffer: RgbaImage,
    scale: f64,
    clip: Option<Circle>,
}

impl RasterSurface {
    /// Create a transparent `width` x `height` surface where one viewport
    /// unit covers `scale` pixels.
    pub fn new(width: u32, height: u32, scale: f64) -> Self {
        Self {
            buffer: RgbaImage::new(width, height),
            scale,
            clip: None,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn clip(&self) -> Option<Circle> {
        self.clip
    }

    /// Borrow the backing image.
    pub fn image(&self) -> &RgbaImage {
        &self.buffer
    }

    /// Pixel at `(x, y)` in surface pixels.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.buffer.get_pixel(x, y).0
    }

    /// Centre of pixel `(px, py)` in viewport units.
    #[inline]
    fn logical_center(&self, px: u32, py: u32) -> Point {
        Point::new(
            (px as f64 + 0.5) / self.scale,
            (py as f64 + 0.5) / self.scale,
        )
    }

    #[inline]
    fn clipped_out(&self, p: Point) -> bool {
        self.clip.is_some_and(|c| !c.contains(p))
    }

    /// Pixel range `[start, end)` covering `[lo, hi)` viewport units on an
    /// axis of `len` pixels.
    fn pixel_span(&self, lo: f64, hi: f64, len: u32) -> (u32, u32) {
        let start = (lo * self.scale).floor().max(0.0).min(len as f64) as u32;
        let end = (hi * self.scale).ceil().max(0.0).min(len as f64) as u32;
        (start, end)
    }

    /// Source-over composite of a premultiplied colour onto pixel `(x, y)`.
    #[inline]
    fn blend(&mut self, x: u32, y: u32, src: [f32; 4]) {
        let dst = self.buffer.get_pixel_mut(x, y);
        let sa = src[3];
        if sa <= 0.0 {
            return;
        }

        let da = dst.0[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        let mut out = [0u8; 4];
        for c in 0..3 {
            let dc = dst.0[c] as f32 / 255.0 * da;
            let premul = src[c] + dc * (1.0 - sa);
            out[c] = to_u8(premul / out_a);
        }
        out[3] = to_u8(out_a);
        dst.0 = out;
    }
}

impl Surface for RasterSurface {
    fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    fn clear(&mut self) {
        self.buffer
            .pixels_mut()
            .for_each(|p| *p = Rgba([0, 0, 0, 0]));
    }

    fn fill_checker(&mut self, cell: f64, light: Rgba<u8>, dark: Rgba<u8>) {
        if cell.is_nan() || cell <= 0.0 {
            return;
        }
        let (w, h) = self.dimensions();
        for py in 0..h {
            for px in 0..w {
                let p = self.logical_center(px, py);
                if self.clipped_out(p) {
                    continue;
                }
                let parity = ((p.x / cell).floor() + (p.y / cell).floor()) as i64 & 1;
                let color = if parity == 0 { light } else { dark };
                self.blend(px, py, premultiply(color.0, 1.0));
            }
        }
    }

    fn draw_image(&mut self, image: &SourceImage, dest: Rect) {
        if dest.is_degenerate() || image.is_empty() {
            return;
        }

        let (w, h) = self.dimensions();
        let (x0, x1) = self.pixel_span(dest.x, dest.right(), w);
        let (y0, y1) = self.pixel_span(dest.y, dest.bottom(), h);

        let sx = image.width as f64 / dest.width;
        let sy = image.height as f64 / dest.height;

        for py in y0..y1 {
            for px in x0..x1 {
                let p = self.logical_center(px, py);
                if p.x < dest.x || p.x >= dest.right() || p.y < dest.y || p.y >= dest.bottom() {
                    continue;
                }
                if self.clipped_out(p) {
                    continue;
                }

                let u = (p.x - dest.x) * sx - 0.5;
                let v = (p.y - dest.y) * sy - 0.5;
                let sample = sample_bilinear(image, u, v);
                self.blend(px, py, sample);
            }
        }
    }

    fn stroke_circle(&mut self, circle: Circle, width: f64, color: Rgba<u8>) {
        let drawable = width > 0.0 && circle.radius >= 0.0 && circle.center.is_finite();
        if !drawable {
            return;
        }

        let (w, h) = self.dimensions();
        let reach = circle.radius + width;
        let (x0, x1) = self.pixel_span(circle.center.x - reach, circle.center.x + reach, w);
        let (y0, y1) = self.pixel_span(circle.center.y - reach, circle.center.y + reach, h);
        let half = width / 2.0;

        for py in y0..y1 {
            for px in x0..x1 {
                let p = self.logical_center(px, py);
                if self.clipped_out(p) {
                    continue;
                }
                let d = (p.x - circle.center.x).hypot(p.y - circle.center.y);
                // One pixel of antialiasing around the stroke band
                let coverage = ((half - (d - circle.radius).abs()) * self.scale + 0.5)
                    .clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(px, py, premultiply(color.0, coverage as f32));
                }
            }
        }
    }

    fn clip_to_circle(&mut self, circle: Circle) {
        self.clip = Some(circle);
    }

    fn pixels(&self) -> &[u8] {
        self.buffer.as_raw()
    }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Straight RGBA8 to premultiplied floats, with extra `coverage` applied.
#[inline]
fn premultiply(px: [u8; 4], coverage: f32) -> [f32; 4] {
    let a = px[3] as f32 / 255.0 * coverage;
    [
        px[0] as f32 / 255.0 * a,
        px[1] as f32 / 255.0 * a,
        px[2] as f32 / 255.0 * a,
        a,
    ]
}

/// Bilinear sample at source coordinates `(u, v)` (pixel centres at
/// integer + 0.5 have been shifted to integers), clamped to the edge.
fn sample_bilinear(image: &SourceImage, u: f64, v: f64) -> [f32; 4] {
    let fx = u.floor();
    let fy = v.floor();
    let tx = (u - fx) as f32;
    let ty = (v - fy) as f32;
    let (ix, iy) = (fx as i64, fy as i64);

    let p00 = premultiply(image.pixel_clamped(ix, iy), 1.0);
    let p10 = premultiply(image.pixel_clamped(ix + 1, iy), 1.0);
    let p01 = premultiply(image.pixel_clamped(ix, iy + 1), 1.0);
    let p11 = premultiply(image.pixel_clamped(ix + 1, iy + 1), 1.0);

    let mut out = [0f32; 4];
    for c in 0..4 {
        let top = p00[c] + (p10[c] - p00[c]) * tx;
        let bottom = p01[c] + (p11[c] - p01[c]) * tx;
        out[c] = top + (bottom - top) * ty;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, px: [u8; 4]) -> SourceImage {
        let pixels = px
            .iter()
            .copied()
            .cycle()
            .take((width * height * 4) as usize)
            .collect();
        SourceImage::new(width, height, pixels)
    }

    #[test]
    fn test_new_surface_is_transparent() {
        let surface = RasterSurface::new(4, 4, 1.0);
        assert!(surface.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_draw_image_fills_dest_rect_only() {
        let mut surface = RasterSurface::new(10, 10, 1.0);
        let img = solid(2, 2, [255, 0, 0, 255]);
        surface.draw_image(&img, Rect::new(2.0, 3.0, 4.0, 5.0));

        assert_eq!(surface.pixel(2, 3), [255, 0, 0, 255]);
        assert_eq!(surface.pixel(5, 7), [255, 0, 0, 255]);
        assert_eq!(surface.pixel(1, 3)[3], 0);
        assert_eq!(surface.pixel(6, 3)[3], 0);
        assert_eq!(surface.pixel(2, 8)[3], 0);
    }

    #[test]
    fn test_draw_image_respects_scale() {
        // Quarter-scale surface: a 40x40 unit rect covers 10x10 pixels
        let mut surface = RasterSurface::new(20, 20, 0.25);
        let img = solid(1, 1, [0, 255, 0, 255]);
        surface.draw_image(&img, Rect::new(0.0, 0.0, 40.0, 40.0));

        assert_eq!(surface.pixel(9, 9), [0, 255, 0, 255]);
        assert_eq!(surface.pixel(10, 10)[3], 0);
    }

    #[test]
    fn test_draw_image_degenerate_rect_draws_nothing() {
        let mut surface = RasterSurface::new(8, 8, 1.0);
        let img = solid(2, 2, [255, 255, 255, 255]);

        surface.draw_image(&img, Rect::new(4.0, 4.0, 0.0, 0.0));
        surface.draw_image(&img, Rect::new(f64::NAN, 0.0, 8.0, 8.0));
        assert!(surface.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_draw_image_partially_offscreen() {
        let mut surface = RasterSurface::new(8, 8, 1.0);
        let img = solid(4, 4, [0, 0, 255, 255]);
        surface.draw_image(&img, Rect::new(-100.0, -100.0, 104.0, 104.0));

        assert_eq!(surface.pixel(0, 0), [0, 0, 255, 255]);
        assert_eq!(surface.pixel(3, 3), [0, 0, 255, 255]);
        assert_eq!(surface.pixel(4, 4)[3], 0);
    }

    #[test]
    fn test_source_alpha_composites_over_checker() {
        let mut surface = RasterSurface::new(4, 4, 1.0);
        surface.fill_checker(2.0, Rgba([255, 255, 255, 255]), Rgba([0, 0, 0, 255]));
        let img = solid(1, 1, [0, 0, 0, 0]);
        surface.draw_image(&img, Rect::new(0.0, 0.0, 4.0, 4.0));

        // Fully transparent source leaves the checker visible
        assert_eq!(surface.pixel(0, 0), [255, 255, 255, 255]);
        assert_eq!(surface.pixel(2, 0), [0, 0, 0, 255]);
        assert_eq!(surface.pixel(2, 2), [255, 255, 255, 255]);
    }

    #[test]
    fn test_half_transparent_over_transparent_keeps_color() {
        let mut surface = RasterSurface::new(1, 1, 1.0);
        let img = solid(1, 1, [200, 100, 50, 128]);
        surface.draw_image(&img, Rect::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(surface.pixel(0, 0), [200, 100, 50, 128]);
    }

    #[test]
    fn test_clip_masks_draws() {
        let mut surface = RasterSurface::new(10, 10, 1.0);
        surface.clip_to_circle(Circle::inscribed(10.0));
        surface.draw_image(&solid(1, 1, [9, 9, 9, 255]), Rect::new(0.0, 0.0, 10.0, 10.0));

        assert_eq!(surface.pixel(0, 0)[3], 0);
        assert_eq!(surface.pixel(9, 9)[3], 0);
        assert_eq!(surface.pixel(5, 5)[3], 255);
        assert_eq!(surface.pixel(5, 0)[3], 255);
    }

    #[test]
    fn test_stroke_circle_marks_ring_only() {
        let mut surface = RasterSurface::new(41, 41, 1.0);
        let circle = Circle::new(Point::new(20.5, 20.5), 20.0);
        surface.stroke_circle(circle, 1.0, Rgba([0, 0, 0, 255]));

        // Pixel whose centre sits exactly on the ring
        assert_eq!(surface.pixel(20, 0)[3], 255);
        // Centre and corners untouched
        assert_eq!(surface.pixel(20, 20)[3], 0);
        assert_eq!(surface.pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_clear_resets_pixels() {
        let mut surface = RasterSurface::new(3, 3, 1.0);
        surface.draw_image(&solid(1, 1, [1, 2, 3, 255]), Rect::new(0.0, 0.0, 3.0, 3.0));
        surface.clear();
        assert!(surface.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_bilinear_sample_between_pixels() {
        let img = SourceImage::new(2, 1, vec![0, 0, 0, 255, 255, 255, 255, 255]);
        let mid = sample_bilinear(&img, 0.5, 0.0);
        assert!((mid[0] - 0.5).abs() < 1e-6);
        assert!((mid[3] - 1.0).abs() < 1e-6);

        // Clamped outside the edge
        let left = sample_bilinear(&img, -3.0, 0.0);
        assert_eq!(left[0], 0.0);
    }
}
