//! cfg module - configuration loading
//!
//! YAML, JSON5 and TOML files with `${VAR}` environment expansion

mod app_config;
mod loader;

pub use app_config::AppConfig;
pub use loader::{expand_env_vars, load_file, ConfigFormat};
