//! Configuration loading and typed config structures for Circadia.
//!
//! The canonical configuration lives in `circadia-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror
//! the YAML structure, a loader that reads the file, and [`CoreConfig`],
//! the flat set of fixed parameters the simulation core is built from.

use std::path::{Path, PathBuf};

use circadia_types::Minute;
use serde::Deserialize;

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A parameter is outside the range the core can run with.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `circadia-config.yaml`. Every field has a
/// default matching the reference visualization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Clock and autoplay settings.
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Motion model parameters.
    #[serde(default)]
    pub motion: MotionConfig,

    /// Main plotting area geometry.
    #[serde(default)]
    pub plot: PlotConfig,

    /// Input dataset location.
    #[serde(default)]
    pub data: DataConfig,

    /// Observer server binding.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `CIRCADIA_SAMPLES` overrides `data.samples_path`
    /// - `CIRCADIA_PORT` overrides `observer.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides on top of the parsed values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("CIRCADIA_SAMPLES") {
            self.data.samples_path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("CIRCADIA_PORT") {
            match val.parse::<u16>() {
                Ok(port) => self.observer.port = port,
                Err(e) => tracing::warn!(value = %val, error = %e, "ignoring invalid CIRCADIA_PORT"),
            }
        }
    }

    /// Extract the fixed parameters the simulation core is built from.
    pub fn core(&self) -> CoreConfig {
        CoreConfig {
            tick_minutes: self.playback.tick_minutes,
            cycle_length: self.playback.cycle_length,
            dampening: self.motion.dampening,
            velocity_floor: self.motion.velocity_floor,
            movement_scale: self.motion.movement_scale,
            activity_max: self.motion.activity_max,
            width: self.plot.width,
            height: self.plot.height,
            edge_margin: self.plot.edge_margin,
        }
    }
}

/// Clock and autoplay settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaybackConfig {
    /// Simulated minutes advanced per autoplay tick.
    #[serde(default = "default_tick_minutes")]
    pub tick_minutes: Minute,

    /// Render-transition duration of one frame; autoplay never schedules
    /// ticks closer together than this.
    #[serde(default = "default_frame_duration_ms")]
    pub frame_duration_ms: u64,

    /// Minutes in one day/night period.
    #[serde(default = "default_cycle_length")]
    pub cycle_length: Minute,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_minutes: default_tick_minutes(),
            frame_duration_ms: default_frame_duration_ms(),
            cycle_length: default_cycle_length(),
        }
    }
}

/// Motion model parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MotionConfig {
    /// Velocity multiplier applied every step.
    #[serde(default = "default_dampening")]
    pub dampening: f64,

    /// Velocity components smaller than this in magnitude are zeroed.
    #[serde(default = "default_velocity_floor")]
    pub velocity_floor: f64,

    /// Activity-to-velocity-delta multiplier.
    #[serde(default = "default_movement_scale")]
    pub movement_scale: f64,

    /// Activity value that maps to the full movement scale.
    #[serde(default = "default_activity_max")]
    pub activity_max: f64,

    /// Seed for the motion jitter; absent means seeded from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            dampening: default_dampening(),
            velocity_floor: default_velocity_floor(),
            movement_scale: default_movement_scale(),
            activity_max: default_activity_max(),
            seed: None,
        }
    }
}

/// Main plotting area geometry, in plot units.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlotConfig {
    /// Width of the main plotting area.
    #[serde(default = "default_plot_width")]
    pub width: f64,

    /// Height of the main plotting area.
    #[serde(default = "default_plot_height")]
    pub height: f64,

    /// Minimum clearance kept between any subject and every edge.
    #[serde(default = "default_edge_margin")]
    pub edge_margin: f64,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: default_plot_width(),
            height: default_plot_height(),
            edge_margin: default_edge_margin(),
        }
    }
}

/// Input dataset location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DataConfig {
    /// Path to the minute-level JSON sample file.
    #[serde(default = "default_samples_path")]
    pub samples_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            samples_path: default_samples_path(),
        }
    }
}

/// Observer server binding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Host address to bind.
    #[serde(default = "default_observer_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_observer_port")]
    pub port: u16,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            host: default_observer_host(),
            port: default_observer_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Fixed parameters supplied to the simulation core at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreConfig {
    /// Simulated minutes advanced per autoplay tick.
    pub tick_minutes: Minute,
    /// Minutes defining one day/night period.
    pub cycle_length: Minute,
    /// Velocity multiplier per step, strictly between 0 and 1.
    pub dampening: f64,
    /// Minimum retained velocity component magnitude.
    pub velocity_floor: f64,
    /// Activity-to-velocity-delta multiplier.
    pub movement_scale: f64,
    /// Activity value that maps to the full movement scale.
    pub activity_max: f64,
    /// Width of the bounded rectangle.
    pub width: f64,
    /// Height of the bounded rectangle.
    pub height: f64,
    /// Minimum clearance from every edge.
    pub edge_margin: f64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        SimulationConfig::default().core()
    }
}

impl CoreConfig {
    /// Check that the parameters describe a runnable simulation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_minutes == 0 {
            return Err(invalid("tick_minutes must be at least 1"));
        }
        if self.cycle_length == 0 {
            return Err(invalid("cycle_length must be at least 1"));
        }
        if !(self.dampening > 0.0 && self.dampening < 1.0) {
            return Err(invalid("dampening must be strictly between 0 and 1"));
        }
        if !(self.velocity_floor.is_finite() && self.velocity_floor >= 0.0) {
            return Err(invalid("velocity_floor must be a non-negative number"));
        }
        if !(self.movement_scale.is_finite() && self.movement_scale >= 0.0) {
            return Err(invalid("movement_scale must be a non-negative number"));
        }
        if !(self.activity_max.is_finite() && self.activity_max > 0.0) {
            return Err(invalid("activity_max must be positive"));
        }
        if !(self.edge_margin.is_finite() && self.edge_margin >= 0.0) {
            return Err(invalid("edge_margin must be a non-negative number"));
        }
        let room = 2.0 * self.edge_margin;
        if !(self.width.is_finite() && self.width > room) {
            return Err(invalid("width leaves no room inside the edge margins"));
        }
        if !(self.height.is_finite() && self.height > room) {
            return Err(invalid("height leaves no room inside the edge margins"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_tick_minutes() -> Minute {
    5
}

const fn default_frame_duration_ms() -> u64 {
    100
}

const fn default_cycle_length() -> Minute {
    1440
}

const fn default_dampening() -> f64 {
    0.8
}

const fn default_velocity_floor() -> f64 {
    0.3
}

const fn default_movement_scale() -> f64 {
    50.0
}

const fn default_activity_max() -> f64 {
    100.0
}

const fn default_plot_width() -> f64 {
    690.0
}

const fn default_plot_height() -> f64 {
    300.0
}

// 2 units of position buffer plus 5 units of minimum distance from the edge.
const fn default_edge_margin() -> f64 {
    7.0
}

fn default_samples_path() -> PathBuf {
    PathBuf::from("data/combined_minutes.json")
}

fn default_observer_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_observer_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}
