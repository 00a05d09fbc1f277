//! Starfield preview command

use image::Rgba;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::ExitCode;

use crate::config::CliOverrides;
use crate::gif::render_gif;
use crate::output::{preview_path, save_png, scale_image, PreviewFormat};
use crate::raster::RasterSurface;
use crate::starfield::{FrameLoop, Starfield};

use super::{resolve_config, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Summary printed with `--json`
#[derive(Debug, Serialize)]
struct StarfieldReport {
    output: String,
    width: u32,
    height: u32,
    frames: u64,
    particles: usize,
    connections: usize,
    variants: BTreeMap<&'static str, usize>,
}

/// Parse a mouse position given as "X,Y".
pub(crate) fn parse_point(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("invalid point '{}', expected X,Y", s))?;
    let x = x.trim().parse::<f64>().map_err(|_| format!("invalid x coordinate '{}'", x.trim()))?;
    let y = y.trim().parse::<f64>().map_err(|_| format!("invalid y coordinate '{}'", y.trim()))?;
    Ok((x, y))
}

/// Execute the starfield command
pub fn run_starfield(
    config_path: Option<&Path>,
    overrides: &CliOverrides,
    output: Option<&Path>,
    mouse: Option<&str>,
    gif: bool,
    scale: u8,
    json: bool,
) -> ExitCode {
    let config = match resolve_config(config_path, overrides) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let mouse = match mouse.map(parse_point).transpose() {
        Ok(mouse) => mouse,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let default_format = if gif { PreviewFormat::Gif } else { PreviewFormat::Png };
    let path = preview_path("starfield", output, default_format);
    let format = PreviewFormat::from_path(&path);

    let render = &config.render;
    let (width, height) = (render.width, render.height);
    let mut field = Starfield::new(config.starfield.clone(), width as f64, height as f64);
    if let Some((x, y)) = mouse {
        field.set_mouse(x, y);
    }
    let mut frame_loop = FrameLoop::new(field);
    frame_loop.start();

    let mut surface = RasterSurface::with_background(width, height, BACKGROUND);
    let frame_ms = render.frame_ms as f64;
    let total_frames = render.frames.max(1);
    let mut connections = 0;

    let result = match format {
        PreviewFormat::Gif => {
            let frames = (0..total_frames).map(|i| {
                connections = frame_loop.tick(&mut surface, i as f64 * frame_ms).map_or(0, |c| c.len());
                scale_image(surface.image().clone(), scale)
            });
            render_gif(frames, render.frame_ms, true, &path).map(|_| ())
        }
        PreviewFormat::Png => {
            for i in 0..total_frames {
                connections = frame_loop.tick(&mut surface, i as f64 * frame_ms).map_or(0, |c| c.len());
            }
            save_png(&scale_image(surface.image().clone(), scale), &path)
        }
    };
    frame_loop.stop();

    if let Err(e) = result {
        eprintln!("Error: Failed to write '{}': {}", path.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    let field = frame_loop.field();
    if json {
        let mut variants = BTreeMap::new();
        for p in field.particles() {
            *variants.entry(p.variant.name()).or_insert(0) += 1;
        }
        let report = StarfieldReport {
            output: path.display().to_string(),
            width,
            height,
            frames: frame_loop.frames(),
            particles: field.particles().len(),
            connections,
            variants,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        println!(
            "Saved: {} ({} particles, {} frames, {} connections in last frame)",
            path.display(),
            field.particles().len(),
            frame_loop.frames(),
            connections
        );
    }

    ExitCode::from(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("10,20"), Ok((10.0, 20.0)));
        assert_eq!(parse_point(" 1.5 , -2 "), Ok((1.5, -2.0)));
        assert!(parse_point("10").is_err());
        assert!(parse_point("a,2").is_err());
        assert!(parse_point("1,b").is_err());
    }
}
