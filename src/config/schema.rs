//! Configuration schema types for `skyglow.toml`
//!
//! Every section is optional; missing fields fall back to the values the
//! theme ships with.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Starfield simulation tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarfieldConfig {
    /// Minimum number of particles regardless of viewport width
    pub min_particles: usize,
    /// Particle count is `viewport_width / width_divisor` (floored at `min_particles`)
    pub width_divisor: f64,
    /// Radius around the mouse inside which particles are pushed away
    pub mouse_radius: f64,
    /// Scale of the repulsion impulse
    pub repulsion_force: f64,
    /// Per-frame velocity multiplier
    pub damping: f64,
    /// Maximum distance at which two particles may be connected
    pub connection_distance: f64,
    /// Probability that an eligible pair is connected in a given frame
    pub connection_chance: f64,
    /// Per-frame connection cap per particle
    pub max_connections: u32,
    /// Peak opacity of connection lines
    pub connection_opacity: f64,
    /// Stroke width of connection lines
    pub connection_width: f64,
    /// Global opacity multiplier for particles
    pub base_opacity: f64,
    /// Alpha of the black wash painted each frame instead of clearing
    pub fade_alpha: f64,
    /// Number of past positions kept by comets
    pub trail_length: usize,
    /// Fixed RNG seed; random when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            min_particles: 200,
            width_divisor: 2.0,
            mouse_radius: 100.0,
            repulsion_force: 0.5,
            damping: 0.99,
            connection_distance: 150.0,
            connection_chance: 0.3,
            max_connections: 3,
            connection_opacity: 0.2,
            connection_width: 0.3,
            base_opacity: 0.8,
            fade_alpha: 0.08,
            trail_length: 8,
            seed: None,
        }
    }
}

/// Daily gradient background settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyConfig {
    /// Gradient direction in degrees (CSS `linear-gradient` convention)
    pub angle: f64,
    /// Duration of one background-position sweep
    pub animation_secs: u32,
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self { angle: 135.0, animation_secs: 20 }
    }
}

/// Banner image cycling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BannerConfig {
    /// URL prefix; images are `{base_path}{index}.jpg`
    pub base_path: String,
    /// Number of images (one per hour of the day)
    pub total_images: u32,
    /// CSS transition applied when the image changes
    pub transition: String,
    /// Candidate banner selectors, first match wins
    pub selectors: Vec<String>,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            base_path: "/img/bg".to_string(),
            total_images: 24,
            transition: "background-image 1.2s ease-in-out".to_string(),
            selectors: crate::banner::BANNER_SELECTORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Click heart settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartsConfig {
    /// Marker lifetime in milliseconds
    pub lifetime_ms: u64,
    /// Marker color
    pub color: String,
    /// Marker font size in pixels
    pub font_size: u32,
}

impl Default for HeartsConfig {
    fn default() -> Self {
        Self { lifetime_ms: 1000, color: "#ff6b6b".to_string(), font_size: 20 }
    }
}

/// Site uptime counter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UptimeConfig {
    /// Date the site went live
    pub start_date: NaiveDate,
    /// Text shown before the counter
    pub label: String,
    /// Id of the element that displays the counter
    pub element_id: String,
}

impl Default for UptimeConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2025, 10, 28).unwrap_or_default(),
            label: "Site running for".to_string(),
            element_id: "runtime-count".to_string(),
        }
    }
}

/// Offline preview rendering (CLI)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Frames to simulate
    pub frames: u32,
    /// Frame duration in milliseconds (also the GIF frame delay)
    pub frame_ms: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { width: 640, height: 360, frames: 90, frame_ms: 33 }
    }
}

/// Complete skyglow.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkyglowConfig {
    #[serde(default)]
    pub starfield: StarfieldConfig,
    #[serde(default)]
    pub sky: SkyConfig,
    #[serde(default)]
    pub banner: BannerConfig,
    #[serde(default)]
    pub hearts: HeartsConfig,
    #[serde(default)]
    pub uptime: UptimeConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "starfield.connection_chance")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "skyglow.toml: '{}' {}", self.field, self.message)
    }
}

impl SkyglowConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: &str, message: &str| {
            errors.push(ConfigValidationError {
                field: field.to_string(),
                message: message.to_string(),
            });
        };

        let s = &self.starfield;
        if s.width_divisor <= 0.0 {
            push("starfield.width_divisor", "must be positive");
        }
        if !(0.0..=1.0).contains(&s.connection_chance) {
            push("starfield.connection_chance", "must be between 0 and 1");
        }
        if !(0.0..=1.0).contains(&s.fade_alpha) {
            push("starfield.fade_alpha", "must be between 0 and 1");
        }
        if !(0.0..=1.0).contains(&s.damping) {
            push("starfield.damping", "must be between 0 and 1");
        }
        if s.mouse_radius <= 0.0 {
            push("starfield.mouse_radius", "must be positive");
        }
        if s.connection_distance <= 0.0 {
            push("starfield.connection_distance", "must be positive");
        }

        if self.banner.total_images == 0 {
            push("banner.total_images", "must be a positive integer");
        }
        if self.banner.selectors.is_empty() {
            push("banner.selectors", "must contain at least one selector");
        }

        if self.hearts.lifetime_ms == 0 {
            push("hearts.lifetime_ms", "must be a positive integer");
        }
        if crate::color::parse_color(&self.hearts.color).is_err() {
            push("hearts.color", "must be a valid CSS color");
        }

        if self.sky.animation_secs == 0 {
            push("sky.animation_secs", "must be a positive integer");
        }

        if self.render.width == 0 || self.render.height == 0 {
            push("render", "dimensions must be positive");
        }
        if self.render.frame_ms == 0 {
            push("render.frame_ms", "must be a positive integer");
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let errors = SkyglowConfig::default().validate();
        assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config: SkyglowConfig = toml::from_str("").unwrap();
        assert_eq!(config, SkyglowConfig::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: SkyglowConfig = toml::from_str(
            r#"
[starfield]
connection_chance = 0.5
seed = 7
"#,
        )
        .unwrap();
        assert_eq!(config.starfield.connection_chance, 0.5);
        assert_eq!(config.starfield.seed, Some(7));
        assert_eq!(config.starfield.max_connections, 3);
        assert_eq!(config.banner.total_images, 24);
    }

    #[test]
    fn test_uptime_start_date_parses() {
        let config: SkyglowConfig = toml::from_str(
            r#"
[uptime]
start_date = "2024-02-29"
"#,
        )
        .unwrap();
        assert_eq!(config.uptime.start_date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_validate_reports_each_field() {
        let mut config = SkyglowConfig::default();
        config.starfield.connection_chance = 1.5;
        config.starfield.width_divisor = 0.0;
        config.banner.total_images = 0;
        config.hearts.color = "not-a-color".to_string();

        let fields: Vec<String> = config.validate().into_iter().map(|e| e.field).collect();
        assert!(fields.contains(&"starfield.connection_chance".to_string()));
        assert!(fields.contains(&"starfield.width_divisor".to_string()));
        assert!(fields.contains(&"banner.total_images".to_string()));
        assert!(fields.contains(&"hearts.color".to_string()));
    }

    #[test]
    fn test_validation_error_display() {
        let err = ConfigValidationError {
            field: "banner.total_images".to_string(),
            message: "must be a positive integer".to_string(),
        };
        assert_eq!(err.to_string(), "skyglow.toml: 'banner.total_images' must be a positive integer");
    }
}
