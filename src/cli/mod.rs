//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod clock;
mod sky;
mod starfield;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{load_config, merge_cli_overrides, CliOverrides, SkyglowConfig};

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Skyglow - starfield, daily gradient sky and banner cycling effects
#[derive(Parser)]
#[command(name = "skyglow")]
#[command(about = "Skyglow - preview and inspect blog theme sky effects")]
#[command(version)]
pub struct Cli {
    /// Path to skyglow.toml (default: search upward from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Simulate the starfield and write a PNG (last frame) or animated GIF
    Starfield {
        /// Output file or directory.
        /// If omitted: starfield.png (starfield.gif with --gif)
        /// A .gif extension selects animated output
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Viewport width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Viewport height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Number of frames to simulate
        #[arg(long)]
        frames: Option<u32>,

        /// RNG seed for a reproducible field
        #[arg(long)]
        seed: Option<u64>,

        /// Mouse position as "X,Y" held for the whole run
        #[arg(long)]
        mouse: Option<String>,

        /// Write every frame as an animated GIF
        #[arg(long)]
        gif: bool,

        /// Scale output by integer factor (1-16)
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..=16))]
        scale: u8,

        /// Print a JSON summary of the final frame
        #[arg(long)]
        json: bool,
    },

    /// Print the daily gradient colors
    Sky {
        /// Date as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,

        /// Write the gradient stylesheet to this file
        #[arg(long)]
        css: Option<PathBuf>,

        /// Render the gradient to this PNG file
        #[arg(long)]
        png: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which banner image is active and when it next changes
    Banner {
        /// Local time as "YYYY-MM-DD HH:MM[:SS]" or "HH:MM" (default: now)
        #[arg(long)]
        at: Option<String>,

        /// Override the image base path
        #[arg(long)]
        base_path: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print how long the site has been running
    Uptime {
        /// Start date as YYYY-MM-DD (default: from config)
        #[arg(long)]
        since: Option<String>,

        /// Local time as "YYYY-MM-DD HH:MM[:SS]" (default: now)
        #[arg(long)]
        at: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print every stylesheet the effects inject
    Css {
        /// Date for the gradient as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
}

/// Initialise `env_logger`; `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

/// Load the configuration and apply CLI overrides, reporting failures.
pub(crate) fn resolve_config(path: Option<&Path>, overrides: &CliOverrides) -> Result<SkyglowConfig, ExitCode> {
    let mut config = match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(ExitCode::from(EXIT_ERROR));
        }
    };
    merge_cli_overrides(&mut config, overrides);

    let errors = config.validate();
    if !errors.is_empty() {
        for error in errors {
            eprintln!("Error: {}", error);
        }
        return Err(ExitCode::from(EXIT_INVALID_ARGS));
    }
    Ok(config)
}

/// Entry point for the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Starfield { output, width, height, frames, seed, mouse, gif, scale, json } => {
            let overrides = CliOverrides { seed, width, height, frames, base_path: None };
            starfield::run_starfield(config_path, &overrides, output.as_deref(), mouse.as_deref(), gif, scale, json)
        }
        Commands::Sky { date, css, png, json } => {
            sky::run_sky(config_path, date.as_deref(), css.as_deref(), png.as_deref(), json)
        }
        Commands::Banner { at, base_path, json } => {
            let overrides = CliOverrides { base_path, ..Default::default() };
            clock::run_banner(config_path, &overrides, at.as_deref(), json)
        }
        Commands::Uptime { since, at, json } => {
            clock::run_uptime(config_path, since.as_deref(), at.as_deref(), json)
        }
        Commands::Css { date } => sky::run_css(config_path, date.as_deref()),
    }
}
