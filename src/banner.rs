//! Hour-of-day banner image cycling.
//!
//! The home page banner shows image `N` for hour `N - 1` of the day. A
//! [`BannerCycler`] owns the current index and the single pending timer; the
//! host supplies a [`BannerSurface`] to paint on and schedules a real timer
//! for each [`HourlyTimer`] the cycler hands back. Firing recomputes the
//! index from the wall clock rather than incrementing, so late or skipped
//! timers correct themselves.

use chrono::{NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::Serialize;
use thiserror::Error;

use crate::config::BannerConfig;

/// Banner selectors tried in order; the first match wins.
pub const BANNER_SELECTORS: &[&str] = &["#page-header", ".page-header", "#banner", ".banner", ".header"];

/// Body class that marks a page as the home page.
pub const HOME_PAGE_CLASS: &str = "home-page";

/// Banner operation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BannerError {
    /// Manual index outside `1..=total`
    #[error("image index must be between 1 and {total}, got {index}")]
    IndexOutOfRange { index: u32, total: u32 },
    /// No banner element was found
    #[error("banner cycler is not active")]
    NotActive,
}

/// Lifecycle of a cycler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleState {
    /// Not on the home page, or no banner found
    #[default]
    Uninitialized,
    Active,
    Stopped,
}

/// Background declarations applied to the banner element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BannerBackground {
    pub url: String,
    pub size: &'static str,
    pub position: &'static str,
    pub repeat: &'static str,
    pub transition: String,
}

impl BannerBackground {
    pub fn new(url: String, transition: &str) -> Self {
        Self {
            url,
            size: "cover",
            position: "center center",
            repeat: "no-repeat",
            transition: transition.to_string(),
        }
    }

    /// `url('...')` value for `background-image`.
    pub fn image(&self) -> String {
        format!("url('{}')", self.url)
    }

    /// CSS property/value pairs in application order.
    pub fn declarations(&self) -> [(&'static str, String); 5] {
        [
            ("background-image", self.image()),
            ("background-size", self.size.to_string()),
            ("background-position", self.position.to_string()),
            ("background-repeat", self.repeat.to_string()),
            ("transition", self.transition.clone()),
        ]
    }
}

/// Element the banner image is painted on.
pub trait BannerSurface {
    fn apply_background(&mut self, background: &BannerBackground);
    /// Start fetching an image so the next switch is instant.
    fn preload(&mut self, url: &str);
}

/// A timer the host must schedule: call [`BannerCycler::fire`] with `id`
/// after `delay_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourlyTimer {
    pub id: u64,
    pub deadline: NaiveDateTime,
    pub delay_ms: u64,
}

/// True for `/`, `/index.html`, paginated index pages and pages whose body
/// carries the home page class.
pub fn is_home_page(path: &str, has_home_class: bool) -> bool {
    path == "/" || path == "/index.html" || path.contains("/page/") || has_home_class
}

/// Image index for an hour of the day: hour 0 is image 1, hour 23 is 24.
pub fn hourly_index(hour: u32) -> u32 {
    hour + 1
}

/// `base_path` + index + `.jpg`.
pub fn image_url(base_path: &str, index: u32) -> String {
    format!("{}{}.jpg", base_path, index)
}

/// Next index after `index`, wrapping from `total` to 1.
pub fn following_index(index: u32, total: u32) -> u32 {
    (index % total.max(1)) + 1
}

/// The first instant strictly after `now` with zero minutes and seconds.
pub fn next_hour_boundary(now: NaiveDateTime) -> NaiveDateTime {
    let top = NaiveTime::from_hms_opt(now.hour(), 0, 0).unwrap_or_default();
    now.date().and_time(top) + TimeDelta::hours(1)
}

/// Find the banner element by trying each selector in order.
pub fn locate<T, S: AsRef<str>>(selectors: &[S], mut query: impl FnMut(&str) -> Option<T>) -> Option<T> {
    selectors.iter().find_map(|s| query(s.as_ref()))
}

/// Hourly banner cycler.
#[derive(Debug)]
pub struct BannerCycler<S> {
    config: BannerConfig,
    state: CycleState,
    current: u32,
    surface: Option<S>,
    pending: Option<HourlyTimer>,
    next_timer_id: u64,
}

impl<S: BannerSurface> BannerCycler<S> {
    pub fn new(config: BannerConfig) -> Self {
        Self { config, state: CycleState::Uninitialized, current: 1, surface: None, pending: None, next_timer_id: 0 }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Index of the image currently shown (1-based).
    pub fn current_index(&self) -> u32 {
        self.current
    }

    pub fn pending(&self) -> Option<HourlyTimer> {
        self.pending
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn config(&self) -> &BannerConfig {
        &self.config
    }

    /// Index for the hour of `now`, folded into the configured image count.
    fn index_for(&self, now: NaiveDateTime) -> u32 {
        hourly_index(now.hour() % self.config.total_images.max(1))
    }

    /// Attach the located banner and start cycling.
    ///
    /// With no banner a warning is logged and the cycler stays
    /// uninitialized; `None` is returned in that case.
    pub fn activate(&mut self, surface: Option<S>, now: NaiveDateTime) -> Option<HourlyTimer> {
        let Some(surface) = surface else {
            log::warn!("no banner element matched {:?}", self.config.selectors);
            return None;
        };
        self.surface = Some(surface);
        self.state = CycleState::Active;
        self.current = self.index_for(now);
        self.show();
        log::info!("banner set to image {}, switching hourly", self.current);
        Some(self.start_hourly_cycle(now))
    }

    /// Arm the timer for the next hour boundary, replacing any pending one.
    pub fn start_hourly_cycle(&mut self, now: NaiveDateTime) -> HourlyTimer {
        if let Some(old) = self.pending.take() {
            log::debug!("replacing pending banner timer {}", old.id);
        }
        let deadline = next_hour_boundary(now);
        let delay_ms = (deadline - now).num_milliseconds().max(0) as u64;
        let timer = HourlyTimer { id: self.next_timer_id, deadline, delay_ms };
        self.next_timer_id += 1;
        self.pending = Some(timer);
        log::debug!("next banner switch in {} min", (delay_ms as f64 / 60_000.0).round());
        timer
    }

    /// Handle a host timer firing.
    ///
    /// Stale ids (replaced or stopped timers) are ignored and return `None`;
    /// otherwise the image is recomputed from `now` and the next timer is
    /// returned.
    pub fn fire(&mut self, id: u64, now: NaiveDateTime) -> Option<HourlyTimer> {
        if self.pending.map(|t| t.id) != Some(id) {
            log::debug!("ignoring stale banner timer {}", id);
            return None;
        }
        self.pending = None;
        self.current = self.index_for(now);
        self.show();
        log::info!("banner switched to image {} at {}", self.current, now.time());
        Some(self.start_hourly_cycle(now))
    }

    /// Fire the pending timer if its deadline has passed.
    pub fn poll(&mut self, now: NaiveDateTime) -> Option<HourlyTimer> {
        let timer = self.pending.filter(|t| t.deadline <= now)?;
        self.fire(timer.id, now)
    }

    /// Advance one image, wrapping after the last.
    pub fn next_image(&mut self) -> Result<u32, BannerError> {
        if self.surface.is_none() {
            log::warn!("banner cycler is not active");
            return Err(BannerError::NotActive);
        }
        self.current = following_index(self.current, self.config.total_images);
        self.show();
        log::info!("banner advanced to image {}", self.current);
        Ok(self.current)
    }

    /// Jump to a specific image.
    pub fn set_image(&mut self, index: u32) -> Result<(), BannerError> {
        let total = self.config.total_images;
        if index < 1 || index > total {
            log::warn!("image index must be between 1 and {}", total);
            return Err(BannerError::IndexOutOfRange { index, total });
        }
        if self.surface.is_none() {
            log::warn!("banner cycler is not active");
            return Err(BannerError::NotActive);
        }
        self.current = index;
        self.show();
        log::info!("banner set to image {}", index);
        Ok(())
    }

    /// Clear the pending timer. Returns the cleared timer, if any.
    pub fn stop(&mut self) -> Option<HourlyTimer> {
        let cleared = self.pending.take();
        if cleared.is_some() {
            self.state = CycleState::Stopped;
            log::info!("banner cycling stopped");
        }
        cleared
    }

    /// Re-arm the timer unless one is already pending.
    pub fn resume(&mut self, now: NaiveDateTime) -> Option<HourlyTimer> {
        if self.pending.is_some() {
            return None;
        }
        if self.surface.is_none() {
            log::warn!("banner cycler is not active");
            return None;
        }
        self.state = CycleState::Active;
        log::info!("banner cycling resumed");
        Some(self.start_hourly_cycle(now))
    }

    /// Apply the current image and preload its successor.
    fn show(&mut self) {
        let base = &self.config.base_path;
        let background = BannerBackground::new(image_url(base, self.current), &self.config.transition);
        let next = image_url(base, following_index(self.current, self.config.total_images));
        if let Some(surface) = self.surface.as_mut() {
            surface.apply_background(&background);
            surface.preload(&next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[derive(Debug, Default)]
    struct FakeBanner {
        applied: Vec<BannerBackground>,
        preloaded: Vec<String>,
    }

    impl BannerSurface for FakeBanner {
        fn apply_background(&mut self, background: &BannerBackground) {
            self.applied.push(background.clone());
        }
        fn preload(&mut self, url: &str) {
            self.preloaded.push(url.to_string());
        }
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap().and_hms_opt(h, m, s).unwrap()
    }

    fn active(now: NaiveDateTime) -> BannerCycler<FakeBanner> {
        let mut c = BannerCycler::new(BannerConfig::default());
        c.activate(Some(FakeBanner::default()), now);
        c
    }

    #[test]
    fn test_hourly_index_covers_day() {
        for hour in 0..24 {
            assert_eq!(hourly_index(hour), hour + 1);
        }
        assert_eq!(hourly_index(0), 1);
        assert_eq!(hourly_index(23), 24);
    }

    #[test]
    fn test_is_home_page() {
        assert!(is_home_page("/", false));
        assert!(is_home_page("/index.html", false));
        assert!(is_home_page("/page/2/", false));
        assert!(is_home_page("/about/", true));
        assert!(!is_home_page("/about/", false));
        assert!(!is_home_page("/posts/hello.html", false));
    }

    #[test]
    fn test_locate_first_match_wins() {
        let found = locate(BANNER_SELECTORS, |s| (s == "#banner" || s == ".header").then(|| s.to_string()));
        assert_eq!(found.as_deref(), Some("#banner"));
        assert_eq!(locate(BANNER_SELECTORS, |_| None::<()>), None);
    }

    #[test]
    fn test_next_hour_boundary() {
        assert_eq!(next_hour_boundary(at(10, 15, 30)), at(11, 0, 0));
        assert_eq!(next_hour_boundary(at(10, 0, 0)), at(11, 0, 0));
        let midnight = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(next_hour_boundary(at(23, 59, 59)), midnight);
    }

    #[test]
    fn test_activation_applies_and_preloads() {
        let now = at(10, 15, 0);
        let c = active(now);
        assert_eq!(c.state(), CycleState::Active);
        assert_eq!(c.current_index(), 11);
        let banner = c.surface().unwrap();
        assert_eq!(banner.applied.len(), 1);
        let bg = &banner.applied[0];
        assert_eq!(bg.image(), "url('/img/bg11.jpg')");
        assert_eq!(bg.size, "cover");
        assert_eq!(bg.position, "center center");
        assert_eq!(bg.repeat, "no-repeat");
        assert_eq!(bg.transition, "background-image 1.2s ease-in-out");
        assert_eq!(banner.preloaded, vec!["/img/bg12.jpg"]);

        let timer = c.pending().unwrap();
        assert_eq!(timer.deadline, at(11, 0, 0));
        assert_eq!(timer.delay_ms, 45 * 60 * 1000);
    }

    #[test]
    fn test_missing_banner_stays_uninitialized() {
        let mut c: BannerCycler<FakeBanner> = BannerCycler::new(BannerConfig::default());
        assert!(c.activate(None, at(9, 0, 0)).is_none());
        assert_eq!(c.state(), CycleState::Uninitialized);
        assert!(c.pending().is_none());
        assert_eq!(c.next_image(), Err(BannerError::NotActive));
        assert!(c.resume(at(9, 0, 0)).is_none());
    }

    #[test]
    fn test_fire_recomputes_from_clock() {
        let mut c = active(at(10, 15, 0));
        let timer = c.pending().unwrap();
        // Timer delivered late: index follows the clock, not an increment
        let next = c.fire(timer.id, at(13, 2, 0)).unwrap();
        assert_eq!(c.current_index(), 14);
        assert_eq!(next.deadline, at(14, 0, 0));
        assert_eq!(c.surface().unwrap().preloaded.last().map(String::as_str), Some("/img/bg15.jpg"));
    }

    #[test]
    fn test_midnight_rollover() {
        let mut c = active(at(23, 30, 0));
        assert_eq!(c.current_index(), 24);
        assert_eq!(c.surface().unwrap().preloaded, vec!["/img/bg1.jpg"]);
        let timer = c.pending().unwrap();
        let midnight = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap().and_hms_opt(0, 0, 0).unwrap();
        c.fire(timer.id, midnight);
        assert_eq!(c.current_index(), 1);
    }

    #[test]
    fn test_start_twice_leaves_one_pending_timer() {
        let mut c = active(at(8, 0, 0));
        let first = c.pending().unwrap();
        let second = c.start_hourly_cycle(at(8, 30, 0));
        assert_ne!(first.id, second.id);
        assert_eq!(c.pending(), Some(second));
        // The replaced timer no longer fires
        assert!(c.fire(first.id, at(9, 0, 0)).is_none());
        assert_eq!(c.current_index(), 9);
        assert!(c.fire(second.id, at(9, 0, 0)).is_some());
        assert_eq!(c.current_index(), 10);
    }

    #[test]
    fn test_poll_fires_only_after_deadline() {
        let mut c = active(at(6, 59, 0));
        assert!(c.poll(at(6, 59, 59)).is_none());
        assert_eq!(c.current_index(), 7);
        assert!(c.poll(at(7, 0, 0)).is_some());
        assert_eq!(c.current_index(), 8);
    }

    #[test]
    fn test_next_image_wraps() {
        let mut c = active(at(22, 0, 0));
        assert_eq!(c.next_image(), Ok(24));
        assert_eq!(c.next_image(), Ok(1));
        assert_eq!(c.surface().unwrap().applied.last().unwrap().url, "/img/bg1.jpg");
    }

    #[test]
    fn test_set_image_validates() {
        let mut c = active(at(5, 0, 0));
        let applied = c.surface().unwrap().applied.len();
        assert_eq!(c.set_image(0), Err(BannerError::IndexOutOfRange { index: 0, total: 24 }));
        assert_eq!(c.set_image(25), Err(BannerError::IndexOutOfRange { index: 25, total: 24 }));
        assert_eq!(c.current_index(), 6);
        assert_eq!(c.surface().unwrap().applied.len(), applied);

        assert_eq!(c.set_image(24), Ok(()));
        assert_eq!(c.current_index(), 24);
        assert_eq!(c.surface().unwrap().preloaded.last().map(String::as_str), Some("/img/bg1.jpg"));
    }

    #[test]
    fn test_stop_and_resume() {
        let mut c = active(at(12, 10, 0));
        let cleared = c.stop().unwrap();
        assert_eq!(c.state(), CycleState::Stopped);
        assert!(c.pending().is_none());
        assert!(c.fire(cleared.id, at(13, 0, 0)).is_none());
        assert!(c.stop().is_none());

        let rearmed = c.resume(at(12, 20, 0)).unwrap();
        assert_eq!(c.state(), CycleState::Active);
        assert_eq!(rearmed.deadline, at(13, 0, 0));
        // Already pending: resume is a no-op
        assert!(c.resume(at(12, 21, 0)).is_none());
        assert_eq!(c.pending(), Some(rearmed));
    }

    #[test]
    fn test_declarations_order() {
        let bg = BannerBackground::new(image_url("/img/bg", 3), "none");
        let names: Vec<_> = bg.declarations().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            names,
            vec!["background-image", "background-size", "background-position", "background-repeat", "transition"]
        );
    }
}
