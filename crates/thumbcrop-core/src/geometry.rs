//! Placement math for a source image inside the square viewport.
//!
//! Everything here is pure: no rendering, no state. A frame is fully
//! determined by the [`Placement`] computed once per loaded image and the
//! user-controlled [`ViewState`] layered on top of it.
//!
//! # Coordinate System
//!
//! - Units are viewport (logical) pixels, origin at the top-left corner
//! - The viewport is a square of side `V`
//! - Pan is expressed in pre-zoom units, so it is multiplied by zoom when drawn
//! - Zoom is anchored at the viewport centre, not at the canvas origin

use serde::{Deserialize, Serialize};

/// A point or vector in viewport units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned destination rectangle in viewport units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns true if the rectangle covers no area or holds a NaN/infinity.
    ///
    /// Degenerate rectangles are legal (zoom 0 produces one) but draw nothing.
    pub fn is_degenerate(&self) -> bool {
        !(self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Circle in viewport units, used for the crop outline and clip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    /// The circle inscribed in a square viewport of side `viewport`.
    pub fn inscribed(viewport: f64) -> Self {
        Self::new(Point::new(viewport / 2.0, viewport / 2.0), viewport / 2.0)
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: Point) -> bool {
        let dx = p.x - self.center.x;
        let dy = p.y - self.center.y;
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

/// Letterboxing offset and per-axis scale that fit an image into the viewport.
///
/// The longer side of the image fills the viewport exactly
/// (`max(scale_w, scale_h) == 1`) and the shorter side is centred.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub origin_x: f64,
    pub origin_y: f64,
    pub scale_w: f64,
    pub scale_h: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            origin_x: 0.0,
            origin_y: 0.0,
            scale_w: 1.0,
            scale_h: 1.0,
        }
    }
}

impl Placement {
    /// Compute the placement of a `width` x `height` image in a square
    /// viewport of side `viewport`.
    ///
    /// # Example
    ///
    /// ```
    /// use thumbcrop_core::geometry::Placement;
    ///
    /// let p = Placement::fit(800, 400, 400.0);
    /// assert_eq!((p.scale_w, p.scale_h), (1.0, 0.5));
    /// assert_eq!((p.origin_x, p.origin_y), (0.0, 100.0));
    /// ```
    pub fn fit(width: u32, height: u32, viewport: f64) -> Self {
        let longer = width.max(height);
        if longer == 0 {
            return Self::default();
        }

        let longer = longer as f64;
        let scale_w = width as f64 / longer;
        let scale_h = height as f64 / longer;

        let origin_x = if scale_w < scale_h {
            (1.0 - scale_w) * viewport / 2.0
        } else {
            0.0
        };
        let origin_y = if scale_h < scale_w {
            (1.0 - scale_h) * viewport / 2.0
        } else {
            0.0
        };

        Self {
            origin_x,
            origin_y,
            scale_w,
            scale_h,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.origin_x, self.origin_y)
    }
}

/// User-controlled zoom and pan applied on top of a [`Placement`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub zoom: f64,
    pub pan: Point,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Point::default(),
        }
    }
}

impl ViewState {
    pub fn new(zoom: f64, pan: Point) -> Self {
        Self {
            zoom: clamp_zoom(zoom),
            pan,
        }
    }

    /// Set the zoom factor, clamped to `>= 0`.
    ///
    /// Negative zoom would mirror the image; NaN collapses to 0.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = clamp_zoom(zoom);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_reset(&self) -> bool {
        *self == Self::default()
    }
}

#[inline]
fn clamp_zoom(zoom: f64) -> f64 {
    // f64::max returns the non-NaN operand
    zoom.max(0.0)
}

/// Offset added to the placement origin when drawing.
///
/// ```text
/// drawX = pan.x * zoom - (zoom - 1) * scale_w * V / 2
/// drawY = pan.y * zoom - (zoom - 1) * scale_h * V / 2
/// ```
///
/// Zoom is only ever multiplied, so `zoom == 0` is well defined and collapses
/// the image onto the viewport centre.
pub fn draw_offset(placement: &Placement, view: &ViewState, viewport: f64) -> Point {
    let zoom = view.zoom;
    Point::new(
        view.pan.x * zoom - (zoom - 1.0) * placement.scale_w * viewport / 2.0,
        view.pan.y * zoom - (zoom - 1.0) * placement.scale_h * viewport / 2.0,
    )
}

/// Destination rectangle of the image for the current frame.
///
/// Position is `origin + draw_offset`, size is `scale * V * zoom` per axis.
pub fn draw_rect(placement: &Placement, view: &ViewState, viewport: f64) -> Rect {
    let offset = draw_offset(placement, view, viewport);
    Rect::new(
        placement.origin_x + offset.x,
        placement.origin_y + offset.y,
        placement.scale_w * viewport * view.zoom,
        placement.scale_h * viewport * view.zoom,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const V: f64 = 400.0;

    #[test]
    fn test_fit_square_image() {
        let p = Placement::fit(256, 256, V);
        assert_eq!(p, Placement::default());
    }

    #[test]
    fn test_fit_landscape() {
        let p = Placement::fit(800, 400, V);
        assert_eq!(p.scale_w, 1.0);
        assert_eq!(p.scale_h, 0.5);
        assert_eq!(p.origin_x, 0.0);
        assert_eq!(p.origin_y, 100.0);
    }

    #[test]
    fn test_fit_portrait() {
        let p = Placement::fit(300, 1200, V);
        assert_eq!(p.scale_w, 0.25);
        assert_eq!(p.scale_h, 1.0);
        assert_eq!(p.origin_x, 150.0);
        assert_eq!(p.origin_y, 0.0);
    }

    #[test]
    fn test_fit_zero_sized_image_is_identity() {
        assert_eq!(Placement::fit(0, 0, V), Placement::default());
    }

    #[test]
    fn test_draw_offset_identity_view() {
        let p = Placement::fit(800, 400, V);
        let offset = draw_offset(&p, &ViewState::default(), V);
        assert_eq!(offset, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_draw_offset_zoom_is_center_anchored() {
        let p = Placement::default();
        let view = ViewState::new(2.0, Point::default());
        let rect = draw_rect(&p, &view, V);

        // Doubling a 400px image around the centre puts its corner at -200
        assert_eq!(rect, Rect::new(-200.0, -200.0, 800.0, 800.0));
        let center = Point::new(rect.x + rect.width / 2.0, rect.y + rect.height / 2.0);
        assert_eq!(center, Point::new(200.0, 200.0));
    }

    #[test]
    fn test_draw_offset_pan_is_scaled_by_zoom() {
        let p = Placement::default();
        let view = ViewState::new(3.0, Point::new(10.0, -5.0));
        let offset = draw_offset(&p, &view, V);
        assert_eq!(offset.x, 30.0 - 2.0 * 200.0);
        assert_eq!(offset.y, -15.0 - 2.0 * 200.0);
    }

    #[test]
    fn test_zero_zoom_collapses_to_center() {
        let p = Placement::fit(800, 400, V);
        let view = ViewState::new(0.0, Point::new(50.0, 50.0));
        let rect = draw_rect(&p, &view, V);

        assert_eq!(rect.width, 0.0);
        assert_eq!(rect.height, 0.0);
        assert_eq!(rect.x, 200.0);
        assert_eq!(rect.y, 200.0);
        assert!(rect.is_degenerate());
    }

    #[test]
    fn test_negative_zoom_is_clamped() {
        let mut view = ViewState::default();
        view.set_zoom(-2.5);
        assert_eq!(view.zoom, 0.0);

        view.set_zoom(f64::NAN);
        assert_eq!(view.zoom, 0.0);
    }

    #[test]
    fn test_view_reset() {
        let mut view = ViewState::new(4.0, Point::new(3.0, 9.0));
        assert!(!view.is_reset());
        view.reset();
        assert!(view.is_reset());
    }

    #[test]
    fn test_rect_degenerate() {
        assert!(!Rect::new(0.0, 0.0, 1.0, 1.0).is_degenerate());
        assert!(Rect::new(0.0, 0.0, 0.0, 1.0).is_degenerate());
        assert!(Rect::new(f64::NAN, 0.0, 1.0, 1.0).is_degenerate());
        assert!(Rect::new(0.0, 0.0, f64::INFINITY, 1.0).is_degenerate());
    }

    #[test]
    fn test_circle_contains() {
        let c = Circle::inscribed(V);
        assert!(c.contains(Point::new(200.0, 200.0)));
        assert!(c.contains(Point::new(200.0, 0.0)));
        assert!(!c.contains(Point::new(0.0, 0.0)));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
