//! Software rasterizer implementing [`Surface`] over an [`RgbaImage`].
//!
//! Used by the CLI to export preview frames and by the tests to observe
//! what a frame actually painted. Shapes are small (a few pixels across), so
//! every primitive simply scans its bounding box and computes per-pixel
//! coverage; only the full-surface fade is parallelized.

use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use crate::surface::{GradientStop, Paint, Point, Stroke, Surface};

/// Sub-sample offsets used for polygon coverage (2x2 grid per pixel).
const SUBSAMPLES: [(f64, f64); 4] = [(0.25, 0.25), (0.75, 0.25), (0.25, 0.75), (0.75, 0.75)];

/// A [`Surface`] that paints into an owned RGBA image.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    image: RgbaImage,
}

impl RasterSurface {
    /// Create a transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self { image: RgbaImage::new(width, height) }
    }

    /// Create a surface filled with a solid background.
    pub fn with_background(width: u32, height: u32, background: Rgba<u8>) -> Self {
        Self { image: RgbaImage::from_pixel(width, height, background) }
    }

    /// Wrap an existing image.
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Blend `color` at `coverage` (0.0-1.0, already including paint alpha)
    /// into pixel (x, y). Out-of-bounds writes are dropped.
    fn blend(&mut self, x: i64, y: i64, color: Rgba<u8>, coverage: f64) {
        if coverage <= 0.0 || x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.image.width() || y >= self.image.height() {
            return;
        }
        let dst = *self.image.get_pixel(x, y);
        self.image.put_pixel(x, y, alpha_blend(&color, &dst, coverage.min(1.0)));
    }

    /// Clamp a floating bounding box to pixel indices.
    fn pixel_bounds(&self, min: Point, max: Point) -> Option<(i64, i64, i64, i64)> {
        let x0 = min.x.floor().max(0.0) as i64;
        let y0 = min.y.floor().max(0.0) as i64;
        let x1 = (max.x.ceil() as i64).min(self.image.width() as i64 - 1);
        let y1 = (max.y.ceil() as i64).min(self.image.height() as i64 - 1);
        if x0 > x1 || y0 > y1 {
            None
        } else {
            Some((x0, y0, x1, y1))
        }
    }

    fn stroke_segment(&mut self, a: Point, b: Point, stroke: Stroke, paint: Paint) {
        let half = stroke.width / 2.0;
        let pad = half + 1.0;
        let min = Point::new(a.x.min(b.x) - pad, a.y.min(b.y) - pad);
        let max = Point::new(a.x.max(b.x) + pad, a.y.max(b.y) + pad);
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(min, max) else {
            return;
        };
        let opacity = paint.opacity();
        let color = opaque(paint.color);

        for py in y0..=y1 {
            for px in x0..=x1 {
                let center = Point::new(px as f64 + 0.5, py as f64 + 0.5);
                let d = distance_to_segment(center, a, b);
                // Thin lines still get partial coverage, like a canvas hairline
                let coverage = (half + 0.5 - d).clamp(0.0, 1.0);
                self.blend(px, py, color, coverage * opacity);
            }
        }
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn fill_all(&mut self, paint: Paint) {
        let opacity = paint.opacity();
        if opacity <= 0.0 {
            return;
        }
        let src = opaque(paint.color);
        self.image.par_chunks_mut(4).for_each(|px| {
            let dst = Rgba([px[0], px[1], px[2], px[3]]);
            let out = alpha_blend(&src, &dst, opacity);
            px.copy_from_slice(&out.0);
        });
    }

    fn stroke_polyline(&mut self, points: &[Point], stroke: Stroke, paint: Paint) {
        for pair in points.windows(2) {
            self.stroke_segment(pair[0], pair[1], stroke, paint);
        }
    }

    fn fill_polygon(&mut self, points: &[Point], paint: Paint) {
        if points.len() < 3 {
            return;
        }
        let (min, max) = bounding_box(points);
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(min, max) else {
            return;
        };
        let opacity = paint.opacity();
        let color = opaque(paint.color);

        for py in y0..=y1 {
            for px in x0..=x1 {
                let inside = SUBSAMPLES
                    .iter()
                    .filter(|(dx, dy)| {
                        point_in_polygon(Point::new(px as f64 + dx, py as f64 + dy), points)
                    })
                    .count();
                let coverage = inside as f64 / SUBSAMPLES.len() as f64;
                self.blend(px, py, color, coverage * opacity);
            }
        }
    }

    fn stroke_polygon(&mut self, points: &[Point], stroke: Stroke, paint: Paint) {
        if points.len() < 2 {
            return;
        }
        self.stroke_polyline(points, stroke, paint);
        if let (Some(&last), Some(&first)) = (points.last(), points.first()) {
            self.stroke_segment(last, first, stroke, paint);
        }
    }

    fn radial_gradient(&mut self, center: Point, radius: f64, stops: &[GradientStop], alpha: f64) {
        if radius <= 0.0 || stops.is_empty() || alpha <= 0.0 {
            return;
        }
        let min = Point::new(center.x - radius, center.y - radius);
        let max = Point::new(center.x + radius, center.y + radius);
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(min, max) else {
            return;
        };

        for py in y0..=y1 {
            for px in x0..=x1 {
                let p = Point::new(px as f64 + 0.5, py as f64 + 0.5);
                let t = p.distance(center) / radius;
                if t > 1.0 {
                    continue;
                }
                let c = sample_gradient(stops, t);
                let coverage = c[3] as f64 / 255.0 * alpha;
                self.blend(px, py, opaque(c), coverage);
            }
        }
    }
}

/// Force a color's alpha to 255 (alpha is carried as coverage instead).
fn opaque(c: Rgba<u8>) -> Rgba<u8> {
    Rgba([c[0], c[1], c[2], 255])
}

/// Interpolate gradient stops at `t`, in premultiplied space so fading to
/// `transparent` does not darken toward black.
pub fn sample_gradient(stops: &[GradientStop], t: f64) -> Rgba<u8> {
    let Some(first) = stops.first() else {
        return Rgba([0, 0, 0, 0]);
    };
    if t <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = (b.offset - a.offset).max(f64::EPSILON);
            return lerp_premultiplied(a.color, b.color, (t - a.offset) / span);
        }
    }
    stops.last().map(|s| s.color).unwrap_or(first.color)
}

fn lerp_premultiplied(a: Rgba<u8>, b: Rgba<u8>, f: f64) -> Rgba<u8> {
    let aa = a[3] as f64 / 255.0;
    let ba = b[3] as f64 / 255.0;
    let out_a = aa + (ba - aa) * f;
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |i: usize| -> u8 {
        let pa = a[i] as f64 * aa;
        let pb = b[i] as f64 * ba;
        ((pa + (pb - pa) * f) / out_a).round().clamp(0.0, 255.0) as u8
    };
    Rgba([channel(0), channel(1), channel(2), (out_a * 255.0).round() as u8])
}

/// Alpha-blend source over destination with the given source alpha.
pub fn alpha_blend(src: &Rgba<u8>, dst: &Rgba<u8>, src_alpha: f64) -> Rgba<u8> {
    let sa = src_alpha;
    let da = dst[3] as f64 / 255.0;

    // Standard "source over" compositing
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend = |s: u8, d: u8| -> u8 {
        let sf = s as f64 / 255.0;
        let df = d as f64 / 255.0;
        let out = (sf * sa + df * da * (1.0 - sa)) / out_a;
        (out * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend(src[0], dst[0]),
        blend(src[1], dst[1]),
        blend(src[2], dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

fn bounding_box(points: &[Point]) -> (Point, Point) {
    points.iter().fold(
        (Point::new(f64::INFINITY, f64::INFINITY), Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY)),
        |(min, max), p| {
            (Point::new(min.x.min(p.x), min.y.min(p.y)), Point::new(max.x.max(p.x), max.y.max(p.y)))
        },
    )
}

/// Even-odd point in polygon test.
fn point_in_polygon(p: Point, poly: &[Point]) -> bool {
    let mut inside = false;
    let mut j = poly.len() - 1;
    for i in 0..poly.len() {
        let (a, b) = (poly[i], poly[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * dx, a.y + t * dy))
}
