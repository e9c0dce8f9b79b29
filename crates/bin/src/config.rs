//! orbview configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;
use viewer::{CanvasSize, ViewerConfig};

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "ORBVIEW_CONFIG";
const DEFAULT_PATH: &str = "orbview.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub viewer: ViewerConfig,
}

impl Config {
    /// Path from `ORBVIEW_CONFIG`, or `orbview.toml` in the working directory.
    pub fn path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PATH))
    }

    /// Load configuration from `path`, writing the defaults there if it does
    /// not exist yet.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<Self>(&contents)?
        } else {
            info!("No {} found, creating default config", path.display());
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            default_config
        };
        config.viewer.validate()?;
        Ok(config)
    }
}

/// Simulation stream settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamConfig {
    /// Server address; `http://`, `ws://` or bare `host:port`.
    #[serde(default = "default_server")]
    pub url: String,
    /// First reconnect delay in milliseconds.
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_ms: u64,
    /// Reconnect delay ceiling in milliseconds.
    #[serde(default = "default_max_reconnect_delay")]
    pub max_reconnect_delay_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: default_server(),
            reconnect_delay_ms: default_reconnect_delay(),
            max_reconnect_delay_ms: default_max_reconnect_delay(),
        }
    }
}

/// Control API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControlConfig {
    /// Base URL of `launch_simulation` / `delete_simulation`.
    #[serde(default = "default_server")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Delete the launched simulation on Ctrl-C.
    #[serde(default = "default_stop_on_exit")]
    pub stop_on_exit: bool,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            base_url: default_server(),
            timeout_secs: default_timeout(),
            stop_on_exit: default_stop_on_exit(),
        }
    }
}

/// Virtual canvas used for headless rendering.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Seconds between coordinate read-outs (0 disables them).
    #[serde(default = "default_status_interval")]
    pub status_interval_secs: u64,
}

impl DisplayConfig {
    pub fn canvas(&self) -> CanvasSize {
        CanvasSize::new(self.width.max(1), self.height.max(1))
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            status_interval_secs: default_status_interval(),
        }
    }
}

fn default_server() -> String {
    "http://localhost:5000".to_string()
}
fn default_reconnect_delay() -> u64 {
    1000
}
fn default_max_reconnect_delay() -> u64 {
    5000
}
fn default_timeout() -> u64 {
    10
}
fn default_stop_on_exit() -> bool {
    true
}
fn default_width() -> u32 {
    800
}
fn default_height() -> u32 {
    600
}
fn default_status_interval() -> u64 {
    5
}
