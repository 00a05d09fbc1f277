//! Daily gradient sky background.
//!
//! Two pale colors derived from the calendar date drive an animated
//! full-viewport `linear-gradient`. The colors move along a sinusoid whose
//! period is exactly one year, so consecutive days differ only slightly and
//! December 31st flows into January 1st without a jump.

use std::f64::consts::TAU;

use chrono::{Datelike, NaiveDate};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::color::{ColorError, Hsl};
use crate::config::SkyConfig;

/// Style element id guarding against double injection.
pub const STYLE_ID: &str = "dynamic-gradient-style";

const HUE_CENTER: f64 = 30.0;
const HUE_SWING: f64 = 30.0;
const HUE_SPREAD: f64 = 45.0;
const SATURATION_CENTER: f64 = 70.0;
const SATURATION_SWING: f64 = 10.0;
const LIGHTNESS: [f64; 2] = [90.0, 92.0];

/// The two gradient colors for one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyGradient {
    pub day_of_year: u32,
    pub days_in_year: u32,
    pub start: Hsl,
    pub end: Hsl,
}

/// 1-based ordinal of the date within its year (January 1st is 1).
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

/// 365 or 366.
pub fn days_in_year(year: i32) -> u32 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

/// Phase angle of a day within its year, in radians.
fn year_phase(day_of_year: u32, days_in_year: u32) -> f64 {
    TAU * (day_of_year.saturating_sub(1)) as f64 / days_in_year.max(1) as f64
}

/// Compute the gradient colors for a date.
pub fn daily_gradient(date: NaiveDate) -> DailyGradient {
    let day = day_of_year(date);
    let days = days_in_year(date.year());
    let theta = year_phase(day, days);

    let hue1 = HUE_CENTER + HUE_SWING * theta.sin();
    let hue2 = (hue1 + HUE_SPREAD).rem_euclid(360.0);
    let saturation1 = SATURATION_CENTER + SATURATION_SWING * theta.cos();
    let saturation2 = SATURATION_CENTER + SATURATION_SWING * theta.sin();

    DailyGradient {
        day_of_year: day,
        days_in_year: days,
        start: Hsl::new(hue1, saturation1, LIGHTNESS[0]),
        end: Hsl::new(hue2, saturation2, LIGHTNESS[1]),
    }
}

impl DailyGradient {
    /// The injected stylesheet: a fixed pseudo-element behind the page
    /// carrying the gradient, plus the keyframes that slowly pan it.
    pub fn stylesheet(&self, config: &SkyConfig) -> String {
        format!(
            r#"body::before {{
    content: '';
    position: fixed;
    top: 0;
    left: 0;
    width: 100vw;
    height: 100vh;
    z-index: -2;
    background: linear-gradient({angle}deg, {start}, {end});
    background-size: 200% 200%;
    animation: gradient-animation {secs}s ease infinite;
}}

@keyframes gradient-animation {{
    0% {{ background-position: 0% 50%; }}
    50% {{ background-position: 100% 50%; }}
    100% {{ background-position: 0% 50%; }}
}}
"#,
            angle = config.angle,
            start = self.start,
            end = self.end,
            secs = config.animation_secs,
        )
    }

    /// Rasterize the gradient at rest (background-position 0% 50%).
    pub fn render(&self, width: u32, height: u32, angle_deg: f64) -> Result<RgbaImage, ColorError> {
        let from = self.start.to_rgba()?;
        let to = self.end.to_rgba()?;
        Ok(render_linear_gradient(width, height, angle_deg, from, to))
    }
}

/// Paint a CSS-style linear gradient (angle measured clockwise from "to top").
pub fn render_linear_gradient(
    width: u32,
    height: u32,
    angle_deg: f64,
    from: Rgba<u8>,
    to: Rgba<u8>,
) -> RgbaImage {
    let angle = angle_deg.to_radians();
    let (dx, dy) = (angle.sin(), -angle.cos());
    let (w, h) = (width as f64, height as f64);
    // CSS gradient line length: corners land exactly on 0% and 100%
    let half_len = (w * dx.abs() + h * dy.abs()) / 2.0;

    RgbaImage::from_fn(width, height, |x, y| {
        let px = x as f64 + 0.5 - w / 2.0;
        let py = y as f64 + 0.5 - h / 2.0;
        let t = if half_len > 0.0 { ((px * dx + py * dy) / half_len + 1.0) / 2.0 } else { 0.0 };
        lerp_color(from, to, t.clamp(0.0, 1.0))
    })
}

fn lerp_color(a: Rgba<u8>, b: Rgba<u8>, t: f64) -> Rgba<u8> {
    let mix = |i: usize| (a[i] as f64 + (b[i] as f64 - a[i] as f64) * t).round() as u8;
    Rgba([mix(0), mix(1), mix(2), mix(3)])
}
