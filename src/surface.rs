//! Drawing surface abstraction shared by the effects.
//!
//! The starfield and the gradient sky only ever need a handful of 2D
//! primitives: a translucent full-surface fill, stroked lines and polylines,
//! filled/stroked polygons and radial gradients. [`Surface`] captures exactly
//! that set, so the same frame logic can paint into an in-memory
//! [`RgbaImage`](image::RgbaImage) (see [`crate::raster`]) or into a browser
//! canvas (see the `wasm` module).
//!
//! All coordinates are viewport pixels. Local particle frames (translate +
//! rotate) are resolved by the caller through [`Transform`].

use image::Rgba;

/// A point in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A color plus the global alpha it is drawn with.
///
/// Kept separate from the color's own alpha channel so low opacities (the
/// 8% fade, faint connection lines) don't lose precision to `u8` rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: Rgba<u8>,
    pub alpha: f64,
}

impl Paint {
    pub fn new(color: Rgba<u8>, alpha: f64) -> Self {
        Self { color, alpha }
    }

    /// Paint with full global alpha.
    pub fn solid(color: Rgba<u8>) -> Self {
        Self { color, alpha: 1.0 }
    }

    /// Effective opacity in 0.0-1.0.
    pub fn opacity(&self) -> f64 {
        (self.color[3] as f64 / 255.0 * self.alpha).clamp(0.0, 1.0)
    }
}

/// Line cap style for strokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
}

/// Stroke geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f64,
    pub cap: LineCap,
}

impl Stroke {
    pub fn new(width: f64) -> Self {
        Self { width, cap: LineCap::Butt }
    }

    pub fn round(width: f64) -> Self {
        Self { width, cap: LineCap::Round }
    }
}

/// A color stop of a radial gradient, `offset` in 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Rgba<u8>,
}

impl GradientStop {
    pub const fn new(offset: f64, color: Rgba<u8>) -> Self {
        Self { offset, color }
    }
}

/// Fully transparent black, the CSS `transparent` keyword.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Translate + rotate transform mapping a particle's local frame to the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    origin: Point,
    sin: f64,
    cos: f64,
}

impl Transform {
    pub fn new(origin: Point, rotation: f64) -> Self {
        let (sin, cos) = rotation.sin_cos();
        Self { origin, sin, cos }
    }

    pub fn identity() -> Self {
        Self::new(Point::default(), 0.0)
    }

    /// Map a local point into viewport coordinates.
    pub fn apply(&self, local: Point) -> Point {
        Point {
            x: self.origin.x + local.x * self.cos - local.y * self.sin,
            y: self.origin.y + local.x * self.sin + local.y * self.cos,
        }
    }

    pub fn origin(&self) -> Point {
        self.origin
    }
}

/// A 2D drawing target.
pub trait Surface {
    /// Surface dimensions in pixels.
    fn size(&self) -> (u32, u32);

    /// Paint the whole surface with a (usually translucent) color.
    fn fill_all(&mut self, paint: Paint);

    /// Stroke a connected sequence of points.
    fn stroke_polyline(&mut self, points: &[Point], stroke: Stroke, paint: Paint);

    /// Fill a closed polygon.
    fn fill_polygon(&mut self, points: &[Point], paint: Paint);

    /// Stroke the outline of a closed polygon.
    fn stroke_polygon(&mut self, points: &[Point], stroke: Stroke, paint: Paint);

    /// Fill a disc of `radius` around `center` with a radial gradient.
    ///
    /// `alpha` is the global alpha applied on top of the stop colors.
    fn radial_gradient(&mut self, center: Point, radius: f64, stops: &[GradientStop], alpha: f64);

    /// Stroke a single segment.
    fn stroke_line(&mut self, from: Point, to: Point, stroke: Stroke, paint: Paint) {
        self.stroke_polyline(&[from, to], stroke, paint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_transform_translate_only() {
        let t = Transform::new(Point::new(10.0, 20.0), 0.0);
        assert_eq!(t.apply(Point::new(1.0, 2.0)), Point::new(11.0, 22.0));
    }

    #[test]
    fn test_transform_quarter_turn() {
        let t = Transform::new(Point::new(0.0, 0.0), FRAC_PI_2);
        let p = t.apply(Point::new(1.0, 0.0));
        assert!(p.x.abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_paint_opacity_combines_channels() {
        let paint = Paint::new(Rgba([255, 255, 255, 0x80]), 0.5);
        assert!((paint.opacity() - 0.5 * 128.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_distance() {
        assert_eq!(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0);
    }
}
