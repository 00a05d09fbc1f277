//! Starfield particles: variants, palettes and per-particle state.

use std::collections::VecDeque;
use std::f64::consts::TAU;

use image::Rgba;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::surface::Point;

/// Visual variant of a particle. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Star,
    Glow,
    Sparkle,
    Crystal,
    Comet,
}

impl Variant {
    pub const ALL: [Variant; 5] =
        [Variant::Star, Variant::Glow, Variant::Sparkle, Variant::Crystal, Variant::Comet];

    /// Colors a particle of this variant may be given.
    pub fn palette(self) -> &'static [Rgba<u8>] {
        match self {
            Variant::Star => &[
                Rgba([0xFF, 0xD7, 0x00, 0xFF]),
                Rgba([0xFF, 0xA5, 0x00, 0xFF]),
                Rgba([0xFF, 0x6B, 0x6B, 0xFF]),
                Rgba([0x4E, 0xCD, 0xC4, 0xFF]),
                Rgba([0x45, 0xB7, 0xD1, 0xFF]),
            ],
            Variant::Glow => &[
                Rgba([0xFF, 0x9A, 0x8B, 0xFF]),
                Rgba([0xFF, 0x6B, 0x6B, 0xFF]),
                Rgba([0xA8, 0xE6, 0xCF, 0xFF]),
                Rgba([0x74, 0xB9, 0xFF, 0xFF]),
                Rgba([0xE8, 0x43, 0x93, 0xFF]),
            ],
            Variant::Sparkle => &[
                Rgba([0xFF, 0xFF, 0xFF, 0xFF]),
                Rgba([0xF8, 0xEF, 0xBA, 0xFF]),
                Rgba([0xCA, 0xD3, 0xC8, 0xFF]),
                Rgba([0xDF, 0xE6, 0xE9, 0xFF]),
                Rgba([0xFF, 0xEA, 0xA7, 0xFF]),
            ],
            Variant::Crystal => &[
                Rgba([0x81, 0xEC, 0xEC, 0xFF]),
                Rgba([0x74, 0xB9, 0xFF, 0xFF]),
                Rgba([0xA2, 0x9B, 0xFE, 0xFF]),
                Rgba([0xFD, 0x79, 0xA8, 0xFF]),
                Rgba([0x55, 0xE6, 0xC1, 0xFF]),
            ],
            Variant::Comet => &[
                Rgba([0xFF, 0xFF, 0xFF, 0xFF]),
                Rgba([0x74, 0xB9, 0xFF, 0xFF]),
                Rgba([0x81, 0xEC, 0xEC, 0xFF]),
            ],
        }
    }

    /// Range (min, span) of the radius drawn at creation.
    fn size_range(self) -> (f64, f64) {
        match self {
            Variant::Comet => (0.8, 1.5),
            _ => (0.5, 2.5),
        }
    }

    /// Range (min, span) of the nominal speed drawn at creation.
    fn speed_range(self) -> (f64, f64) {
        match self {
            Variant::Comet => (0.3, 0.8),
            _ => (0.05, 0.4),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::Star => "star",
            Variant::Glow => "glow",
            Variant::Sparkle => "sparkle",
            Variant::Crystal => "crystal",
            Variant::Comet => "comet",
        }
    }
}

/// Bounded history of past positions, newest first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Trail {
    points: VecDeque<Point>,
    capacity: usize,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self { points: VecDeque::with_capacity(capacity + 1), capacity }
    }

    /// Record a new position, evicting the oldest past the capacity.
    pub fn push(&mut self, p: Point) {
        self.points.push_front(p);
        self.points.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent position.
    pub fn newest(&self) -> Option<Point> {
        self.points.front().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    pub fn to_vec(&self) -> Vec<Point> {
        self.points.iter().copied().collect()
    }
}

/// A single starfield particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Current radius; equals `base_size` between frames
    pub size: f64,
    pub base_size: f64,
    /// Nominal speed assigned at creation (informational)
    pub speed: f64,
    pub variant: Variant,
    pub rotation: f64,
    pub rotation_speed: f64,
    /// Opacity derived during the last draw
    pub opacity: f64,
    pub base_opacity: f64,
    pub twinkle_speed: f64,
    pub twinkle_offset: f64,
    pub color: Rgba<u8>,
    /// Present only for comets
    pub trail: Option<Trail>,
    /// Connections drawn this frame
    pub connections: u32,
}

impl Particle {
    /// Create a particle of a random variant somewhere inside the viewport.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, width: f64, height: f64, trail_length: usize) -> Self {
        let variant = Variant::ALL[rng.random_range(0..Variant::ALL.len())];
        Self::random_of(rng, variant, width, height, trail_length)
    }

    /// Create a particle of the given variant with randomized attributes.
    pub fn random_of<R: Rng + ?Sized>(
        rng: &mut R,
        variant: Variant,
        width: f64,
        height: f64,
        trail_length: usize,
    ) -> Self {
        let (size_min, size_span) = variant.size_range();
        let (speed_min, speed_span) = variant.speed_range();
        let size = rng.random::<f64>() * size_span + size_min;
        let palette = variant.palette();
        let base_opacity = rng.random::<f64>() * 0.6 + 0.4;

        Self {
            x: rng.random::<f64>() * width,
            y: rng.random::<f64>() * height,
            vx: (rng.random::<f64>() - 0.5) * 0.2,
            vy: (rng.random::<f64>() - 0.5) * 0.2,
            size,
            base_size: size,
            speed: rng.random::<f64>() * speed_span + speed_min,
            variant,
            rotation: rng.random::<f64>() * TAU,
            rotation_speed: (rng.random::<f64>() - 0.5) * 0.02,
            opacity: base_opacity,
            base_opacity,
            twinkle_speed: rng.random::<f64>() * 0.03 + 0.01,
            twinkle_offset: rng.random::<f64>() * TAU,
            color: palette[rng.random_range(0..palette.len())],
            trail: (variant == Variant::Comet).then(|| Trail::new(trail_length)),
            connections: 0,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Brightness/size oscillation at host time `time_ms`, in [0.2, 1.0].
    pub fn twinkle(&self, time_ms: f64) -> f64 {
        (time_ms * self.twinkle_speed + self.twinkle_offset).sin() * 0.4 + 0.6
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_trail_is_bounded_and_newest_first() {
        let mut trail = Trail::new(8);
        for i in 0..20 {
            trail.push(Point::new(i as f64, 0.0));
            assert!(trail.len() <= 8);
            assert_eq!(trail.newest(), Some(Point::new(i as f64, 0.0)));
        }
        let xs: Vec<f64> = trail.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![19.0, 18.0, 17.0, 16.0, 15.0, 14.0, 13.0, 12.0]);
    }

    #[test]
    fn test_random_attributes_in_range() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..500 {
            let p = Particle::random(&mut rng, 800.0, 600.0, 8);
            assert!(p.x >= 0.0 && p.x < 800.0);
            assert!(p.y >= 0.0 && p.y < 600.0);
            assert!(p.vx.abs() <= 0.1 && p.vy.abs() <= 0.1);
            assert!(p.base_opacity >= 0.4 && p.base_opacity < 1.0);
            assert!(p.twinkle_speed >= 0.01 && p.twinkle_speed < 0.04);
            assert!(p.rotation_speed.abs() <= 0.01);
            assert_eq!(p.size, p.base_size);
            assert!(p.variant.palette().contains(&p.color));
            match p.variant {
                Variant::Comet => {
                    assert!(p.base_size >= 0.8 && p.base_size < 2.3);
                    assert!(p.speed >= 0.3 && p.speed < 1.1);
                    assert_eq!(p.trail.as_ref().map(Trail::capacity), Some(8));
                }
                _ => {
                    assert!(p.base_size >= 0.5 && p.base_size < 3.0);
                    assert!(p.trail.is_none());
                }
            }
        }
    }

    #[test]
    fn test_random_covers_all_variants() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(Particle::random(&mut rng, 100.0, 100.0, 8).variant);
        }
        assert_eq!(seen.len(), Variant::ALL.len());
    }

    #[test]
    fn test_twinkle_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let p = Particle::random(&mut rng, 10.0, 10.0, 8);
        for t in (0..10_000).step_by(37) {
            let k = p.twinkle(t as f64);
            assert!((0.2 - 1e-12..=1.0 + 1e-12).contains(&k));
        }
    }

    #[test]
    fn test_variant_names_roundtrip_serde() {
        let json = serde_json::to_string(&Variant::Crystal).unwrap();
        assert_eq!(json, "\"crystal\"");
        assert_eq!(Variant::Comet.name(), "comet");
    }
}
