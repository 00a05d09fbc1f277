//! Click heart markers.
//!
//! Every click spawns a small heart at the pointer that floats up, grows and
//! fades over one second, then is removed. [`ClickHearts`] tracks the
//! markers in flight; DOM hosts render them with [`HeartMarker::inline_style`]
//! and [`STYLESHEET`], other hosts can sample [`HeartMarker::pose`].

use serde::Serialize;

use crate::config::HeartsConfig;

/// Style element id; the keyframes are injected at most once per document.
pub const STYLE_ID: &str = "click-effect-style";

/// Class given to every marker element.
pub const MARKER_CLASS: &str = "click-heart";

/// Glyph shown by a marker.
pub const GLYPH: &str = "\u{2764}";

/// Vertical travel over the lifetime, in CSS pixels (negative is up).
const RISE_PX: f64 = -50.0;
/// Scale reached at the end of the animation.
const END_SCALE: f64 = 1.5;

/// The `heartFloat` keyframes.
pub const STYLESHEET: &str = r#"@keyframes heartFloat {
    0% {
        opacity: 1;
        transform: translateY(0) scale(1);
    }
    100% {
        opacity: 0;
        transform: translateY(-50px) scale(1.5);
    }
}
"#;

/// One heart in flight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeartMarker {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub created_ms: f64,
    pub lifetime_ms: f64,
}

/// Animated properties of a marker at an instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeartPose {
    pub opacity: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl HeartMarker {
    /// Elapsed fraction of the lifetime, clamped to [0, 1].
    pub fn progress(&self, now_ms: f64) -> f64 {
        if self.lifetime_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.created_ms) / self.lifetime_ms).clamp(0.0, 1.0)
    }

    pub fn is_expired(&self, now_ms: f64) -> bool {
        now_ms - self.created_ms >= self.lifetime_ms
    }

    /// Keyframe values at `now_ms` under `ease-out` timing.
    pub fn pose(&self, now_ms: f64) -> HeartPose {
        let k = ease_out(self.progress(now_ms));
        HeartPose {
            opacity: 1.0 - k,
            translate_y: RISE_PX * k,
            scale: 1.0 + (END_SCALE - 1.0) * k,
        }
    }

    /// Inline `style` attribute for the marker element.
    pub fn inline_style(&self, config: &HeartsConfig) -> String {
        format!(
            "position: fixed; color: {}; font-size: {}px; z-index: 9999; pointer-events: none; \
             left: {}px; top: {}px; animation: heartFloat {}s ease-out forwards; user-select: none;",
            config.color,
            config.font_size,
            self.x,
            self.y,
            self.lifetime_ms / 1000.0,
        )
    }
}

/// Markers currently on screen.
#[derive(Debug, Clone)]
pub struct ClickHearts {
    lifetime_ms: f64,
    next_id: u64,
    markers: Vec<HeartMarker>,
}

impl Default for ClickHearts {
    fn default() -> Self {
        Self::new(&HeartsConfig::default())
    }
}

impl ClickHearts {
    pub fn new(config: &HeartsConfig) -> Self {
        Self { lifetime_ms: config.lifetime_ms as f64, next_id: 0, markers: Vec::new() }
    }

    /// Spawn a marker at the click position.
    pub fn click(&mut self, x: f64, y: f64, now_ms: f64) -> HeartMarker {
        let marker = HeartMarker { id: self.next_id, x, y, created_ms: now_ms, lifetime_ms: self.lifetime_ms };
        self.next_id += 1;
        self.markers.push(marker.clone());
        marker
    }

    /// Remove and return every marker whose lifetime has elapsed.
    pub fn expire(&mut self, now_ms: f64) -> Vec<HeartMarker> {
        let (expired, live): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.markers).into_iter().partition(|m| m.is_expired(now_ms));
        self.markers = live;
        expired
    }

    /// Remove one marker by id (hosts with per-marker timers).
    pub fn remove(&mut self, id: u64) -> Option<HeartMarker> {
        let pos = self.markers.iter().position(|m| m.id == id)?;
        Some(self.markers.remove(pos))
    }

    pub fn markers(&self) -> &[HeartMarker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn lifetime_ms(&self) -> f64 {
        self.lifetime_ms
    }
}

/// CSS `ease-out`, i.e. `cubic-bezier(0, 0, 0.58, 1)`.
pub fn ease_out(progress: f64) -> f64 {
    cubic_bezier(0.0, 0.0, 0.58, 1.0, progress)
}

/// Evaluate a CSS cubic-bezier timing function at `x`.
fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let bezier = |a: f64, b: f64, t: f64| {
        let u = 1.0 - t;
        3.0 * u * u * t * a + 3.0 * u * t * t * b + t * t * t
    };

    // x(t) is monotonic on [0, 1] for valid timing functions
    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    for _ in 0..48 {
        let mid = (lo + hi) / 2.0;
        if bezier(x1, x2, mid) < x {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    bezier(y1, y2, (lo + hi) / 2.0)
}
