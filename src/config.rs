//! # Configuration Module
//!
//! Handles loading, clamping, and saving settings from a TOML file.
//!
//! Only the numeric pointer preferences (sensitivity and dead zone) are
//! authoritative user state; the host-wiring tunables (controller slot,
//! trigger scroll threshold, scroll range, precision/fast factors) default to
//! the stock values and are exposed mostly for tinkering. Every numeric field
//! is clamped to its valid range on load and again on save, so a hand-edited
//! file can never push the runtime out of bounds.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub pointer: PointerConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
}

/// Pointer motion preferences (persisted user state)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PointerConfig {
    /// Cursor speed multiplier, clamped to [1.0, 30.0].
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,

    /// Stick dead-zone radius, clamped to [0.0, 0.5].
    #[serde(default = "default_dead_zone")]
    pub dead_zone: f32,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            sensitivity: default_sensitivity(),
            dead_zone: default_dead_zone(),
        }
    }
}

/// Controller and host-wiring tunables
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Controller slot to poll (0-3).
    #[serde(default)]
    pub index: u32,

    /// Trigger magnitude that must be exceeded before scrolling engages.
    #[serde(default = "default_trigger_threshold")]
    pub trigger_threshold: u8,

    /// Maximum wheel units per cycle at full trigger pull.
    #[serde(default = "default_scroll_max")]
    pub scroll_max: f32,

    /// Sensitivity factor while the left shoulder is held (precision mode).
    #[serde(default = "default_precision_factor")]
    pub precision_factor: f32,

    /// Sensitivity factor while the right shoulder is held (fast mode).
    #[serde(default = "default_fast_factor")]
    pub fast_factor: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            index: 0,
            trigger_threshold: default_trigger_threshold(),
            scroll_max: default_scroll_max(),
            precision_factor: default_precision_factor(),
            fast_factor: default_fast_factor(),
        }
    }
}

// Default value functions
fn default_sensitivity() -> f32 { 10.0 }
fn default_dead_zone() -> f32 { 0.1 }

fn default_trigger_threshold() -> u8 { 20 }
fn default_scroll_max() -> f32 { 80.0 }
fn default_precision_factor() -> f32 { 1.0 / 3.0 }
fn default_fast_factor() -> f32 { 3.0 }

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// Out-of-range values are clamped, not rejected.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or TOML parsing fails.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gamepad_pointer::config::Config;
    ///
    /// let config = Config::load("settings.toml")?;
    /// # Ok::<(), gamepad_pointer::error::GamepadPointerError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.clamp();
        Ok(config)
    }

    /// Load configuration from the given path, falling back to defaults if
    /// the file is missing or unreadable.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "could not load settings from {}: {e}, using defaults",
                    path.as_ref().display()
                );
                Self::default()
            }
        }
    }

    /// Save configuration to a TOML file, clamping first.
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the filesystem write fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut clamped = self.clone();
        clamped.clamp();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(&clamped)?)?;
        Ok(())
    }

    /// Default settings path: `<user config dir>/gamepad-pointer/settings.toml`,
    /// or the bare filename when no config directory is available.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("gamepad-pointer").join("settings.toml"))
            .unwrap_or_else(|| PathBuf::from("settings.toml"))
    }

    /// Clamp every numeric field to its valid range.
    fn clamp(&mut self) {
        self.pointer.sensitivity = self.pointer.sensitivity.clamp(1.0, 30.0);
        self.pointer.dead_zone = self.pointer.dead_zone.clamp(0.0, 0.5);
        self.controller.index = self.controller.index.min(3);
        self.controller.scroll_max = self.controller.scroll_max.clamp(0.0, 120.0);
        self.controller.precision_factor = self.controller.precision_factor.clamp(0.0, 5.0);
        self.controller.fast_factor = self.controller.fast_factor.clamp(0.0, 5.0);
    }
}
