//! Skyglow - decorative sky effects for static blog themes
//!
//! This library provides:
//! - [`starfield`]: an animated particle field with mouse repulsion, comet
//!   trails and a sparse connection graph, drawn through the [`surface::Surface`] trait
//! - [`sky`]: a daily gradient background that drifts with the calendar
//! - [`banner`]: hour-of-day banner image cycling with an explicit timer handle
//! - [`hearts`]: floating heart markers spawned by clicks
//! - [`uptime`]: the "site running for" counter
//!
//! Effects render offline into an [`image::RgbaImage`] through
//! [`raster::RasterSurface`] (used by the `skyglow` CLI for PNG/GIF
//! previews), or into a live page through the `wasm` feature.

pub mod banner;
pub mod cli;
pub mod color;
pub mod config;
pub mod gif;
pub mod hearts;
pub mod output;
pub mod raster;
pub mod sky;
pub mod starfield;
pub mod surface;
pub mod uptime;

#[cfg(feature = "wasm")]
pub mod wasm;
