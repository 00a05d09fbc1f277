//! Per-variant particle rendering.
//!
//! Each variant has its own routine; [`draw_particle`] picks one with a
//! `match` on [`Variant`]. Shapes are built in the particle's local frame
//! (origin at the particle, rotated by its rotation) and mapped to the
//! viewport through a [`Transform`].

use std::f64::consts::PI;

use image::Rgba;

use super::particle::{Particle, Variant};
use crate::color::with_alpha;
use crate::surface::{GradientStop, Paint, Point, Stroke, Surface, Transform, TRANSPARENT};

/// Highlight stroke drawn around crystals (`#FFFFFF60`).
const CRYSTAL_HIGHLIGHT: Rgba<u8> = Rgba([0xFF, 0xFF, 0xFF, 0x60]);

/// Opacity and size a particle is drawn with for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawState {
    pub opacity: f64,
    pub size: f64,
}

impl DrawState {
    /// Derive the frame's opacity and size from the particle's base values.
    pub fn for_particle(p: &Particle, time_ms: f64, base_opacity: f64) -> Self {
        let twinkle = p.twinkle(time_ms);
        Self {
            opacity: (p.base_opacity * twinkle * base_opacity).max(0.0),
            size: (p.base_size * twinkle).max(0.0),
        }
    }
}

/// Draw one particle with the given frame state.
pub fn draw_particle<S: Surface + ?Sized>(surface: &mut S, p: &Particle, state: DrawState) {
    let frame = Transform::new(p.position(), p.rotation);
    let alpha = state.opacity;
    let size = state.size;

    match p.variant {
        Variant::Star => draw_star(surface, &frame, size, size * 0.4, 5, p.color, alpha),
        Variant::Glow => draw_glow(surface, &frame, size, p.color, alpha),
        Variant::Sparkle => draw_sparkle(surface, &frame, size, p.color, alpha),
        Variant::Crystal => draw_crystal(surface, &frame, size, p.color, alpha),
        Variant::Comet => draw_comet(surface, &frame, p, size, alpha),
    }
}

/// Filled star with `points` tips plus a soft halo three times its radius.
pub fn draw_star<S: Surface + ?Sized>(
    surface: &mut S,
    frame: &Transform,
    outer: f64,
    inner: f64,
    points: usize,
    color: Rgba<u8>,
    alpha: f64,
) {
    let outline: Vec<Point> = (0..points * 2)
        .map(|i| {
            let radius = if i % 2 == 0 { outer } else { inner };
            let angle = PI * i as f64 / points as f64;
            frame.apply(Point::new(angle.cos() * radius, angle.sin() * radius))
        })
        .collect();
    surface.fill_polygon(&outline, Paint::new(color, alpha));

    let halo = [GradientStop::new(0.0, with_alpha(color, 0x40)), GradientStop::new(1.0, TRANSPARENT)];
    surface.radial_gradient(frame.origin(), outer * 3.0, &halo, alpha);
}

/// Soft radial glow twice the particle radius.
pub fn draw_glow<S: Surface + ?Sized>(
    surface: &mut S,
    frame: &Transform,
    size: f64,
    color: Rgba<u8>,
    alpha: f64,
) {
    surface.radial_gradient(frame.origin(), size * 2.0, &glow_stops(color), alpha);
}

/// Cross plus diagonals.
pub fn draw_sparkle<S: Surface + ?Sized>(
    surface: &mut S,
    frame: &Transform,
    size: f64,
    color: Rgba<u8>,
    alpha: f64,
) {
    let stroke = Stroke::new(size * 0.3);
    let paint = Paint::new(color, alpha);
    let d = size * 0.7;
    let arms = [
        ((-size, 0.0), (size, 0.0)),
        ((0.0, -size), (0.0, size)),
        ((-d, -d), (d, d)),
        ((-d, d), (d, -d)),
    ];
    for ((ax, ay), (bx, by)) in arms {
        surface.stroke_line(frame.apply(Point::new(ax, ay)), frame.apply(Point::new(bx, by)), stroke, paint);
    }
}

/// Filled hexagon with a translucent white highlight outline.
pub fn draw_crystal<S: Surface + ?Sized>(
    surface: &mut S,
    frame: &Transform,
    size: f64,
    color: Rgba<u8>,
    alpha: f64,
) {
    let hexagon: Vec<Point> = (0..6)
        .map(|i| {
            let angle = PI * i as f64 / 3.0;
            frame.apply(Point::new(angle.cos() * size, angle.sin() * size))
        })
        .collect();
    surface.fill_polygon(&hexagon, Paint::new(color, alpha));
    surface.stroke_polygon(&hexagon, Stroke::new(size * 0.2), Paint::new(CRYSTAL_HIGHLIGHT, alpha));
}

/// Fading trail polyline followed by a glowing head.
///
/// The trail is stored in viewport coordinates and drawn as-is.
pub fn draw_comet<S: Surface + ?Sized>(
    surface: &mut S,
    frame: &Transform,
    p: &Particle,
    size: f64,
    alpha: f64,
) {
    if let Some(trail) = p.trail.as_ref().filter(|t| t.len() > 1) {
        surface.stroke_polyline(
            &trail.to_vec(),
            Stroke::round(size * 0.5),
            Paint::new(with_alpha(p.color, 0x30), alpha),
        );
    }
    surface.radial_gradient(frame.origin(), size * 2.0, &glow_stops(p.color), alpha);
}

fn glow_stops(color: Rgba<u8>) -> [GradientStop; 3] {
    [
        GradientStop::new(0.0, color),
        GradientStop::new(0.7, with_alpha(color, 0x80)),
        GradientStop::new(1.0, TRANSPARENT),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::starfield::particle::Trail;

    /// Records calls instead of painting.
    #[derive(Default)]
    struct Recorder {
        polygons: Vec<(usize, Rgba<u8>)>,
        strokes: Vec<(Vec<Point>, Stroke, Rgba<u8>)>,
        gradients: Vec<(Point, f64, usize)>,
    }

    impl Surface for Recorder {
        fn size(&self) -> (u32, u32) {
            (100, 100)
        }
        fn fill_all(&mut self, _paint: Paint) {}
        fn stroke_polyline(&mut self, points: &[Point], stroke: Stroke, paint: Paint) {
            self.strokes.push((points.to_vec(), stroke, paint.color));
        }
        fn fill_polygon(&mut self, points: &[Point], paint: Paint) {
            self.polygons.push((points.len(), paint.color));
        }
        fn stroke_polygon(&mut self, points: &[Point], stroke: Stroke, paint: Paint) {
            self.strokes.push((points.to_vec(), stroke, paint.color));
        }
        fn radial_gradient(&mut self, center: Point, radius: f64, stops: &[GradientStop], _alpha: f64) {
            self.gradients.push((center, radius, stops.len()));
        }
    }

    fn particle(variant: Variant) -> Particle {
        Particle {
            x: 50.0,
            y: 40.0,
            vx: 0.0,
            vy: 0.0,
            size: 2.0,
            base_size: 2.0,
            speed: 0.1,
            variant,
            rotation: 0.0,
            rotation_speed: 0.0,
            opacity: 1.0,
            base_opacity: 1.0,
            twinkle_speed: 0.0,
            twinkle_offset: std::f64::consts::FRAC_PI_2,
            color: Rgba([0xFF, 0xD7, 0x00, 0xFF]),
            trail: (variant == Variant::Comet).then(|| Trail::new(8)),
            connections: 0,
        }
    }

    #[test]
    fn test_draw_state_uses_twinkle_and_global_opacity() {
        // twinkle_offset = pi/2 and speed 0 -> sin = 1 -> twinkle = 1.0
        let p = particle(Variant::Glow);
        let state = DrawState::for_particle(&p, 12345.0, 0.8);
        assert!((state.opacity - 0.8).abs() < 1e-12);
        assert!((state.size - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_star_has_ten_vertices_and_halo() {
        let mut r = Recorder::default();
        draw_particle(&mut r, &particle(Variant::Star), DrawState { opacity: 1.0, size: 2.0 });
        assert_eq!(r.polygons, vec![(10, Rgba([0xFF, 0xD7, 0x00, 0xFF]))]);
        assert_eq!(r.gradients, vec![(Point::new(50.0, 40.0), 6.0, 2)]);
    }

    #[test]
    fn test_glow_radius_is_twice_size() {
        let mut r = Recorder::default();
        draw_particle(&mut r, &particle(Variant::Glow), DrawState { opacity: 1.0, size: 3.0 });
        assert_eq!(r.gradients, vec![(Point::new(50.0, 40.0), 6.0, 3)]);
        assert!(r.polygons.is_empty());
    }

    #[test]
    fn test_sparkle_draws_four_arms() {
        let mut r = Recorder::default();
        draw_particle(&mut r, &particle(Variant::Sparkle), DrawState { opacity: 1.0, size: 2.0 });
        assert_eq!(r.strokes.len(), 4);
        assert!(r.strokes.iter().all(|(_, s, _)| (s.width - 0.6).abs() < 1e-12));
        // Horizontal arm spans +-size around the particle
        assert_eq!(r.strokes[0].0, vec![Point::new(48.0, 40.0), Point::new(52.0, 40.0)]);
    }

    #[test]
    fn test_crystal_hexagon_with_highlight() {
        let mut r = Recorder::default();
        draw_particle(&mut r, &particle(Variant::Crystal), DrawState { opacity: 1.0, size: 2.0 });
        assert_eq!(r.polygons.len(), 1);
        assert_eq!(r.polygons[0].0, 6);
        assert_eq!(r.strokes.len(), 1);
        assert_eq!(r.strokes[0].2, CRYSTAL_HIGHLIGHT);
    }

    #[test]
    fn test_comet_trail_drawn_once_long_enough() {
        let mut p = particle(Variant::Comet);
        let mut r = Recorder::default();
        draw_particle(&mut r, &p, DrawState { opacity: 1.0, size: 2.0 });
        assert!(r.strokes.is_empty(), "single-point trails are not drawn");

        if let Some(trail) = p.trail.as_mut() {
            trail.push(Point::new(10.0, 10.0));
            trail.push(Point::new(11.0, 10.0));
        }
        let mut r = Recorder::default();
        draw_particle(&mut r, &p, DrawState { opacity: 1.0, size: 2.0 });
        assert_eq!(r.strokes.len(), 1);
        assert_eq!(r.strokes[0].0, vec![Point::new(11.0, 10.0), Point::new(10.0, 10.0)]);
        assert_eq!(r.strokes[0].1.cap, crate::surface::LineCap::Round);
        assert_eq!(r.strokes[0].2[3], 0x30);
        assert_eq!(r.gradients.len(), 1);
    }
}
