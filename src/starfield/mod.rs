//! Animated starfield simulation.
//!
//! A full-viewport particle field layered behind page content. Each frame:
//!
//! 1. [`Starfield::update`] integrates positions, applies mouse repulsion,
//!    wraps particles around the viewport edges, damps velocities, records
//!    comet trails and resets the per-frame connection counters.
//! 2. [`Starfield::draw`] washes the surface with translucent black (so
//!    previous frames linger as motion trails), draws a sparse,
//!    degree-bounded connection graph between nearby particles and then
//!    every particle with its variant-specific routine.
//!
//! The simulation owns its RNG, so a fixed seed reproduces the same field.
//! Connections stay probabilistic per frame: static particles still flicker
//! between connected and unconnected.
//!
//! # Example
//!
//! ```
//! use skyglow::config::StarfieldConfig;
//! use skyglow::raster::RasterSurface;
//! use skyglow::starfield::Starfield;
//!
//! let config = StarfieldConfig { seed: Some(1), ..Default::default() };
//! let mut field = Starfield::new(config, 320.0, 200.0);
//! let mut surface = RasterSurface::new(320, 200);
//! field.frame(&mut surface, 0.0);
//! assert_eq!(field.particles().len(), 200);
//! ```

mod draw;
mod frame_loop;
mod particle;

pub use draw::{draw_comet, draw_crystal, draw_glow, draw_particle, draw_sparkle, draw_star, DrawState};
pub use frame_loop::{FrameLoop, LoopState};
pub use particle::{Particle, Trail, Variant};

use image::Rgba;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::StarfieldConfig;
use crate::surface::{Paint, Point, Stroke, Surface};

/// An edge drawn by the connection pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    pub distance: f64,
    /// Line opacity, `(1 - distance / threshold) * connection_opacity`
    pub opacity: f64,
}

/// Number of particles for a viewport width.
///
/// `max(width / divisor, min)`, truncated toward zero.
pub fn particle_count(width: f64, config: &StarfieldConfig) -> usize {
    let by_width = if config.width_divisor > 0.0 { width / config.width_divisor } else { 0.0 };
    by_width.max(config.min_particles as f64).max(0.0) as usize
}

/// The starfield simulation state.
#[derive(Debug, Clone)]
pub struct Starfield {
    config: StarfieldConfig,
    width: f64,
    height: f64,
    particles: Vec<Particle>,
    mouse: Point,
    rng: StdRng,
}

impl Starfield {
    /// Create a field for a viewport and populate it.
    ///
    /// Uses `config.seed` when set, otherwise seeds from the thread RNG.
    pub fn new(config: StarfieldConfig, width: f64, height: f64) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::rng().random()),
        };
        Self::with_rng(config, width, height, rng)
    }

    /// Create a field driven by an explicit RNG.
    pub fn with_rng(config: StarfieldConfig, width: f64, height: f64, rng: StdRng) -> Self {
        let mut field = Self {
            config,
            width,
            height,
            particles: Vec::new(),
            mouse: Point::default(),
            rng,
        };
        field.populate();
        field
    }

    /// Regenerate the whole particle set for the current viewport.
    fn populate(&mut self) {
        let count = particle_count(self.width, &self.config);
        let (w, h, trail) = (self.width, self.height, self.config.trail_length);
        let rng = &mut self.rng;
        self.particles = (0..count).map(|_| Particle::random(&mut *rng, w, h, trail)).collect();
        log::debug!("starfield populated with {} particles ({}x{})", count, w, h);
    }

    /// Handle a viewport resize: previous simulation state is discarded.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.populate();
    }

    /// Record the latest pointer position; consumed by the next update.
    pub fn set_mouse(&mut self, x: f64, y: f64) {
        self.mouse = Point::new(x, y);
    }

    pub fn mouse(&self) -> Point {
        self.mouse
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn config(&self) -> &StarfieldConfig {
        &self.config
    }

    pub fn viewport(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Advance every particle by one frame.
    pub fn update(&mut self) {
        let radius = self.config.mouse_radius;
        let repulsion = self.config.repulsion_force;
        let damping = self.config.damping;
        let (width, height) = (self.width, self.height);
        let mouse = self.mouse;

        for p in &mut self.particles {
            p.x += p.vx;
            p.y += p.vy;
            p.rotation += p.rotation_speed;

            let dx = p.x - mouse.x;
            let dy = p.y - mouse.y;
            let distance = dx.hypot(dy);
            if distance < radius {
                let force = (radius - distance) / radius;
                let angle = dy.atan2(dx);
                p.vx += angle.cos() * force * repulsion;
                p.vy += angle.sin() * force * repulsion;
            }

            wrap(p, width, height);

            p.vx *= damping;
            p.vy *= damping;

            if let Some(trail) = p.trail.as_mut() {
                trail.push(Point::new(p.x, p.y));
            }

            p.connections = 0;
        }
    }

    /// Choose this frame's connections.
    ///
    /// Scans every pair `i < j`, skipping particles that already hit the
    /// per-frame cap. Pairs closer than the threshold are connected with
    /// probability `connection_chance`; each edge bumps both counters.
    pub fn connect(&mut self) -> Vec<Connection> {
        let cap = self.config.max_connections;
        let threshold = self.config.connection_distance;
        let chance = self.config.connection_chance.clamp(0.0, 1.0);
        let peak = self.config.connection_opacity;
        let n = self.particles.len();
        let mut edges = Vec::new();

        for i in 0..n {
            if self.particles[i].connections >= cap {
                continue;
            }
            for j in (i + 1)..n {
                if self.particles[j].connections >= cap {
                    continue;
                }
                let distance = self.particles[i].position().distance(self.particles[j].position());
                if distance >= threshold || !self.rng.random_bool(chance) {
                    continue;
                }

                edges.push(Connection {
                    a: i,
                    b: j,
                    distance,
                    opacity: (1.0 - distance / threshold) * peak,
                });
                self.particles[i].connections += 1;
                self.particles[j].connections += 1;

                if self.particles[i].connections >= cap {
                    break;
                }
            }
        }

        edges
    }

    /// Render the current state onto a surface.
    ///
    /// Returns the connections drawn this frame.
    pub fn draw<S: Surface + ?Sized>(&mut self, surface: &mut S, time_ms: f64) -> Vec<Connection> {
        surface.fill_all(Paint::new(Rgba([0, 0, 0, 255]), self.config.fade_alpha));

        let edges = self.connect();
        let stroke = Stroke::new(self.config.connection_width);
        for edge in &edges {
            let a = self.particles[edge.a].position();
            let b = self.particles[edge.b].position();
            surface.stroke_line(a, b, stroke, Paint::new(Rgba([255, 255, 255, 255]), edge.opacity));
        }

        let base_opacity = self.config.base_opacity;
        for p in &mut self.particles {
            let state = DrawState::for_particle(p, time_ms, base_opacity);
            p.opacity = state.opacity;
            draw_particle(surface, p, state);
        }

        edges
    }

    /// One animation frame: update then draw.
    pub fn frame<S: Surface + ?Sized>(&mut self, surface: &mut S, time_ms: f64) -> Vec<Connection> {
        self.update();
        self.draw(surface, time_ms)
    }
}

/// Toroidal wrap: a particle more than twice its size past an edge
/// re-enters just inside the opposite edge.
fn wrap(p: &mut Particle, width: f64, height: f64) {
    let margin = p.size * 2.0;
    if p.x < -margin {
        p.x = width + p.size;
    }
    if p.x > width + margin {
        p.x = -p.size;
    }
    if p.y < -margin {
        p.y = height + p.size;
    }
    if p.y > height + margin {
        p.y = -p.size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RasterSurface;

    fn seeded(seed: u64) -> StarfieldConfig {
        StarfieldConfig { seed: Some(seed), ..Default::default() }
    }

    fn still_particle(x: f64, y: f64) -> Particle {
        Particle {
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            size: 1.0,
            base_size: 1.0,
            speed: 0.1,
            variant: Variant::Glow,
            rotation: 0.0,
            rotation_speed: 0.0,
            opacity: 1.0,
            base_opacity: 1.0,
            twinkle_speed: 0.01,
            twinkle_offset: 0.0,
            color: Rgba([255, 255, 255, 255]),
            trail: None,
            connections: 0,
        }
    }

    #[test]
    fn test_particle_count_formula() {
        let config = StarfieldConfig::default();
        assert_eq!(particle_count(0.0, &config), 200);
        assert_eq!(particle_count(399.0, &config), 200);
        assert_eq!(particle_count(400.0, &config), 200);
        assert_eq!(particle_count(401.0, &config), 200);
        assert_eq!(particle_count(1001.0, &config), 500);
        assert_eq!(particle_count(1920.0, &config), 960);
    }

    #[test]
    fn test_new_populates_for_viewport() {
        let field = Starfield::new(seeded(1), 1280.0, 720.0);
        assert_eq!(field.particles().len(), 640);
    }

    #[test]
    fn test_resize_regenerates() {
        let mut field = Starfield::new(seeded(1), 1280.0, 720.0);
        let before = field.particles()[0].clone();
        field.resize(600.0, 400.0);
        assert_eq!(field.particles().len(), 300);
        assert!(field.particles().iter().all(|p| p.x < 600.0 && p.y < 400.0));
        assert_ne!(field.particles()[0], before);
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = Starfield::new(seeded(77), 500.0, 500.0);
        let b = Starfield::new(seeded(77), 500.0, 500.0);
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn test_update_integrates_and_damps() {
        let mut field = Starfield::new(seeded(2), 400.0, 400.0);
        field.set_mouse(-1000.0, -1000.0);
        let mut p = still_particle(100.0, 100.0);
        p.vx = 1.0;
        p.vy = -0.5;
        p.rotation_speed = 0.01;
        field.particles = vec![p];

        field.update();
        let p = &field.particles()[0];
        assert!((p.x - 101.0).abs() < 1e-12);
        assert!((p.y - 99.5).abs() < 1e-12);
        assert!((p.vx - 0.99).abs() < 1e-12);
        assert!((p.vy + 0.495).abs() < 1e-12);
        assert!((p.rotation - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_mouse_repulsion_pushes_away() {
        let mut field = Starfield::new(seeded(3), 400.0, 400.0);
        field.particles = vec![still_particle(150.0, 100.0)];
        field.set_mouse(100.0, 100.0);

        field.update();
        let p = &field.particles()[0];
        // distance 50 of radius 100 -> force 0.5, times repulsion 0.5, damped
        assert!((p.vx - 0.25 * 0.99).abs() < 1e-12);
        assert!(p.vy.abs() < 1e-12);
    }

    #[test]
    fn test_mouse_outside_radius_has_no_effect() {
        let mut field = Starfield::new(seeded(3), 400.0, 400.0);
        field.particles = vec![still_particle(300.0, 300.0)];
        field.set_mouse(100.0, 100.0);
        field.update();
        assert_eq!(field.particles()[0].vx, 0.0);
        assert_eq!(field.particles()[0].vy, 0.0);
    }

    #[test]
    fn test_wrap_to_opposite_edges() {
        let mut field = Starfield::new(seeded(4), 400.0, 300.0);
        field.set_mouse(-1000.0, -1000.0);
        let mut left = still_particle(-2.5, 150.0);
        left.vx = -0.1;
        let mut bottom = still_particle(200.0, 302.5);
        bottom.vy = 0.1;
        field.particles = vec![left, bottom];

        field.update();
        assert_eq!(field.particles()[0].x, 401.0);
        assert_eq!(field.particles()[1].y, -1.0);
    }

    #[test]
    fn test_positions_stay_within_wrap_bounds() {
        let mut field = Starfield::new(seeded(5), 300.0, 200.0);
        for p in field.particles_mut() {
            p.vx *= 40.0;
            p.vy *= 40.0;
        }
        for frame in 0..500 {
            field.set_mouse((frame * 7 % 300) as f64, (frame * 3 % 200) as f64);
            field.update();
            for p in field.particles() {
                let m = p.size * 2.0;
                assert!(p.x >= -m && p.x <= 300.0 + m, "x out of bounds: {}", p.x);
                assert!(p.y >= -m && p.y <= 200.0 + m, "y out of bounds: {}", p.y);
            }
        }
    }

    #[test]
    fn test_comet_trail_bounded_newest_first() {
        let mut field = Starfield::new(seeded(6), 400.0, 400.0);
        field.set_mouse(-1000.0, -1000.0);
        let mut comet = still_particle(10.0, 10.0);
        comet.variant = Variant::Comet;
        comet.vx = 1.0;
        comet.trail = Some(Trail::new(8));
        field.particles = vec![comet];

        for _ in 0..20 {
            field.update();
            let p = &field.particles()[0];
            let trail = p.trail.as_ref().unwrap();
            assert!(trail.len() <= 8);
            assert_eq!(trail.newest(), Some(p.position()));
        }
    }

    #[test]
    fn test_connection_counts_capped_and_reset() {
        let config = StarfieldConfig { connection_chance: 1.0, ..seeded(7) };
        let mut field = Starfield::new(config, 100.0, 100.0);
        // Every particle is within range of every other
        for p in field.particles_mut() {
            p.x = 50.0;
            p.y = 50.0;
            p.vx = 0.0;
            p.vy = 0.0;
        }
        field.set_mouse(-1000.0, -1000.0);

        field.update();
        let edges = field.connect();
        assert!(!edges.is_empty());
        assert!(field.particles().iter().all(|p| p.connections <= 3));
        for e in &edges {
            assert!(e.a < e.b);
        }

        field.update();
        assert!(field.particles().iter().all(|p| p.connections == 0));
    }

    #[test]
    fn test_connection_degree_matches_edges() {
        let mut field = Starfield::new(seeded(8), 300.0, 300.0);
        field.update();
        let edges = field.connect();
        let mut degree = vec![0u32; field.particles().len()];
        for e in &edges {
            degree[e.a] += 1;
            degree[e.b] += 1;
            assert!(e.distance < 150.0);
            assert!(e.opacity > 0.0 && e.opacity <= 0.2);
        }
        for (p, d) in field.particles().iter().zip(degree) {
            assert_eq!(p.connections, d);
            assert!(d <= 3);
        }
    }

    #[test]
    fn test_no_connections_beyond_threshold() {
        let config = StarfieldConfig { connection_chance: 1.0, min_particles: 2, ..seeded(9) };
        let mut field = Starfield::new(config, 2.0, 2.0);
        field.particles = vec![still_particle(0.0, 0.0), still_particle(150.0, 0.0)];
        assert!(field.connect().is_empty());

        field.particles = vec![still_particle(0.0, 0.0), still_particle(149.0, 0.0)];
        let edges = field.connect();
        assert_eq!(edges.len(), 1);
        assert!((edges[0].opacity - (1.0 - 149.0 / 150.0) * 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_zero_chance_never_connects() {
        let config = StarfieldConfig { connection_chance: 0.0, ..seeded(10) };
        let mut field = Starfield::new(config, 200.0, 200.0);
        field.update();
        assert!(field.connect().is_empty());
    }

    #[test]
    fn test_frame_paints_surface() {
        let mut field = Starfield::new(seeded(11), 200.0, 150.0);
        let mut surface = RasterSurface::new(200, 150);
        for t in 0..5 {
            field.frame(&mut surface, t as f64 * 16.0);
        }
        assert!(surface.image().pixels().any(|p| p[0] > 0 || p[1] > 0 || p[2] > 0));
        assert!(field.particles().iter().all(|p| p.opacity >= 0.0));
    }
}
