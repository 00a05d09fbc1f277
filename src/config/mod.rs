//! Configuration module
//!
//! Provides types and parsing for `skyglow.toml`.

pub mod loader;
pub mod schema;

pub use loader::{
    find_config, find_config_from, load_config, merge_cli_overrides, parse_config, CliOverrides,
    ConfigError, CONFIG_FILE_NAME,
};
pub use schema::*;
