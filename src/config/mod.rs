//! Configuration module.
//!
//! Provides `AppConfig` (top-level settings), `LlmConfig` for the judge,
//! `AppPaths` for the platform config directory, and TOML loading via
//! `AppConfig::load` / `AppConfig::load_from`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, LlmConfig, API_KEY_ENV};
