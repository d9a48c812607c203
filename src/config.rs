//! Configuration for the reel video window
//!
//! Loads configuration from TOML file at `~/.config/reel/config.toml`
//! Auto-generates default config file on first run if missing.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub cursor: CursorConfig,
    pub screensaver: ScreenSaverConfig,
}

impl Config {
    /// Load configuration from file, or use defaults if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!("Config file not found at {:?}, using defaults", config_path);
            if let Err(e) = Self::save_default(&config_path) {
                warn!("Failed to create default config file: {}", e);
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .context("Failed to read config file")?;

        let config = Self::parse(&content)?;

        info!("Configuration loaded from {:?}", config_path);
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Parse a TOML document; missing sections and keys take their defaults
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the event loop cannot run with
    fn validate(&self) -> Result<()> {
        if self.cursor.tick_interval_ms == 0 {
            bail!("cursor.tick_interval_ms must be at least 1");
        }
        Ok(())
    }

    /// Get the path to the config file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("reel");

        Ok(config_dir.join("config.toml"))
    }

    /// Save default configuration to file
    fn save_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default config")?;

        fs::write(path, toml_string)
            .context("Failed to write default config file")?;

        info!("Created default config file at {:?}", path);
        Ok(())
    }
}

/// Video window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Size used until the first video size is known
    pub width: u32,
    pub height: u32,
    pub title: String,
    /// Start in fullscreen
    pub fullscreen: bool,
    /// Background pixel, 0xRRGGBB
    pub background: u32,
    /// Opacity change per keypress
    pub opacity_step: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
            title: "reel".to_string(),
            fullscreen: false,
            background: 0x000000,
            opacity_step: 0.1,
        }
    }
}

/// Pointer auto-hide
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    /// Idle ticks before the pointer is hidden
    pub hide_after_ticks: u32,
    pub tick_interval_ms: u64,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            hide_after_ticks: crate::cursor::DEFAULT_HIDE_AFTER_TICKS,
            tick_interval_ms: 500,
        }
    }
}

/// Screen-saver suppression while the window is shown
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenSaverConfig {
    pub enabled: bool,
    /// Invoked as `<command> suspend|resume <window-id>`
    pub command: String,
    /// Kill the command if it has not finished after this long
    pub timeout_ms: u64,
}

impl Default for ScreenSaverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "xdg-screensaver".to_string(),
            timeout_ms: 5000,
        }
    }
}

/// Parse a `WIDTHxHEIGHT` size argument
pub fn parse_size(value: &str) -> Result<(u32, u32)> {
    let Some((width, height)) = value.split_once(['x', 'X']) else {
        bail!("Invalid size {:?}, expected WIDTHxHEIGHT", value);
    };
    let width: u32 = width.trim().parse().with_context(|| format!("Invalid width in {:?}", value))?;
    let height: u32 = height.trim().parse().with_context(|| format!("Invalid height in {:?}", value))?;
    if width == 0 || height == 0 {
        bail!("Size {:?} must be non-zero", value);
    }
    Ok((width, height))
}
