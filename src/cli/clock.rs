//! Time-driven commands: banner and uptime

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;

use crate::banner::{BannerBackground, BannerCycler, BannerSurface};
use crate::config::CliOverrides;
use crate::uptime::Uptime;

use super::sky::parse_date;
use super::{resolve_config, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Captures what the cycler would do to a real banner element.
#[derive(Debug, Default)]
struct CapturedBanner {
    background: Option<BannerBackground>,
    preloaded: Option<String>,
}

impl BannerSurface for CapturedBanner {
    fn apply_background(&mut self, background: &BannerBackground) {
        self.background = Some(background.clone());
    }

    fn preload(&mut self, url: &str) {
        self.preloaded = Some(url.to_string());
    }
}

#[derive(Debug, Serialize)]
struct BannerReport {
    at: NaiveDateTime,
    index: u32,
    background_image: String,
    preload: String,
    next_switch: NaiveDateTime,
    minutes_until_switch: i64,
}

#[derive(Debug, Serialize)]
struct UptimeReport {
    since: NaiveDate,
    at: NaiveDateTime,
    #[serde(flatten)]
    uptime: Uptime,
    text: String,
}

/// Parse "YYYY-MM-DD HH:MM[:SS]" or "HH:MM[:SS]" (today), defaulting to now.
pub(crate) fn parse_time(at: Option<&str>) -> Result<NaiveDateTime, String> {
    let Some(s) = at.map(str::trim) else {
        return Ok(Local::now().naive_local());
    };
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    for fmt in ["%H:%M:%S", "%H:%M"] {
        if let Ok(t) = NaiveTime::parse_from_str(s, fmt) {
            return Ok(Local::now().date_naive().and_time(t));
        }
    }
    Err(format!("invalid time '{}', expected \"YYYY-MM-DD HH:MM[:SS]\" or \"HH:MM\"", s))
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(s) => {
            println!("{}", s);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Execute the banner command
pub fn run_banner(config_path: Option<&Path>, overrides: &CliOverrides, at: Option<&str>, json: bool) -> ExitCode {
    let config = match resolve_config(config_path, overrides) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let now = match parse_time(at) {
        Ok(now) => now,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let mut cycler = BannerCycler::new(config.banner);
    let Some(timer) = cycler.activate(Some(CapturedBanner::default()), now) else {
        eprintln!("Error: banner cycler failed to activate");
        return ExitCode::from(EXIT_ERROR);
    };
    let captured = cycler.surface();
    let background = captured.and_then(|b| b.background.clone());
    let preload = captured.and_then(|b| b.preloaded.clone()).unwrap_or_default();
    let background_image = background.map(|b| b.image()).unwrap_or_default();

    let report = BannerReport {
        at: now,
        index: cycler.current_index(),
        background_image,
        preload,
        next_switch: timer.deadline,
        minutes_until_switch: (timer.deadline - now).num_minutes(),
    };

    if json {
        return print_json(&report);
    }
    println!("{}: image {} -> {}", report.at, report.index, report.background_image);
    println!("  preload: {}", report.preload);
    println!("  next switch: {} (in {} min)", report.next_switch, report.minutes_until_switch);
    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the uptime command
pub fn run_uptime(config_path: Option<&Path>, since: Option<&str>, at: Option<&str>, json: bool) -> ExitCode {
    let config = match resolve_config(config_path, &CliOverrides::default()) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let start = match since {
        Some(s) => match parse_date(Some(s)) {
            Ok(date) => date,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
        },
        None => config.uptime.start_date,
    };
    let now = match parse_time(at) {
        Ok(now) => now,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let uptime = Uptime::since(start, now);
    let text = uptime.labelled(&config.uptime.label).to_string();
    if json {
        return print_json(&UptimeReport { since: start, at: now, uptime, text });
    }
    println!("{}", text);
    ExitCode::from(EXIT_SUCCESS)
}
