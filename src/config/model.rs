//! Configuration data model.
//!
//! All structs derive `Serialize`/`Deserialize` for TOML persistence.
//! Every field has a sensible default so the demo works without a config file.

use serde::{Deserialize, Serialize};

/// Root application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Initial contents of the demo store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub initial_val: f64,
    #[serde(default = "default_initial_name")]
    pub initial_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            initial_val: 0.0,
            initial_name: default_initial_name(),
        }
    }
}

/// UI refresh and display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    #[serde(default = "default_true")]
    pub show_refresh_counts: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            show_refresh_counts: true,
        }
    }
}

/// Diagnostic log file settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: default_log_dir(),
            level: default_level(),
        }
    }
}

fn default_initial_name() -> String {
    "vamshi".to_string()
}
fn default_tick_rate() -> u64 {
    50
}
fn default_true() -> bool {
    true
}
fn default_log_dir() -> String {
    "~/.local/share/tinystore/logs".to_string()
}
fn default_level() -> String {
    "info".to_string()
}
