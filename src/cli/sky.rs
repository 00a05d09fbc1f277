//! Daily gradient and stylesheet commands

use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;

use crate::config::CliOverrides;
use crate::hearts;
use crate::output::{save_png, save_text};
use crate::sky::{self, daily_gradient};

use super::{resolve_config, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

#[derive(Debug, Serialize)]
struct SkyReport {
    date: NaiveDate,
    day_of_year: u32,
    days_in_year: u32,
    start: String,
    end: String,
    angle: f64,
}

/// Parse `YYYY-MM-DD`, defaulting to today's local date.
pub(crate) fn parse_date(date: Option<&str>) -> Result<NaiveDate, String> {
    match date {
        None => Ok(Local::now().date_naive()),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|e| format!("invalid date '{}': {} (expected YYYY-MM-DD)", s, e)),
    }
}

/// Execute the sky command
pub fn run_sky(
    config_path: Option<&Path>,
    date: Option<&str>,
    css: Option<&Path>,
    png: Option<&Path>,
    json: bool,
) -> ExitCode {
    let config = match resolve_config(config_path, &CliOverrides::default()) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let date = match parse_date(date) {
        Ok(date) => date,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let gradient = daily_gradient(date);

    if let Some(css_path) = css {
        if let Err(e) = save_text(&gradient.stylesheet(&config.sky), css_path) {
            eprintln!("Error: Failed to write '{}': {}", css_path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    }

    if let Some(png_path) = png {
        let image = match gradient.render(config.render.width, config.render.height, config.sky.angle) {
            Ok(image) => image,
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        };
        if let Err(e) = save_png(&image, png_path) {
            eprintln!("Error: Failed to write '{}': {}", png_path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    }

    if json {
        let report = SkyReport {
            date,
            day_of_year: gradient.day_of_year,
            days_in_year: gradient.days_in_year,
            start: gradient.start.to_css(),
            end: gradient.end.to_css(),
            angle: config.sky.angle,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        println!("{} (day {}/{})", date, gradient.day_of_year, gradient.days_in_year);
        println!("  from: {}", gradient.start);
        println!("  to:   {}", gradient.end);
    }

    ExitCode::from(EXIT_SUCCESS)
}

/// Execute the css command
pub fn run_css(config_path: Option<&Path>, date: Option<&str>) -> ExitCode {
    let config = match resolve_config(config_path, &CliOverrides::default()) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let date = match parse_date(date) {
        Ok(date) => date,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    println!("/* #{} */", sky::STYLE_ID);
    print!("{}", daily_gradient(date).stylesheet(&config.sky));
    println!();
    println!("/* #{} */", hearts::STYLE_ID);
    print!("{}", hearts::STYLESHEET);

    ExitCode::from(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date(Some("2024-07-01")), Ok(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()));
        assert!(parse_date(Some("2024-13-01")).is_err());
        assert!(parse_date(Some("yesterday")).is_err());
        assert!(parse_date(None).is_ok());
    }
}
