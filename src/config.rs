use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::render::CameraState;

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub camera: CameraConfig,
    pub ui: UiConfig,
    pub log: LogConfig,
}

/// How to launch and drive the search engine.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub path: PathBuf,
    pub args: Vec<String>,
    pub search_depth: u32,
    /// A pending engine reply older than this is treated as a fault.
    pub timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            path: PathBuf::from("./3d-connect4"),
            args: vec!["interactive".to_string()],
            search_depth: 6,
            timeout_ms: 30_000,
        }
    }
}

impl EngineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Initial camera pose and rotation speeds.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub yaw: f64,
    pub pitch: f64,
    pub distance: f64,
    pub fov: f64,
    /// Radians per arrow key press.
    pub rotate_step: f64,
    /// Radians per pixel of right-button drag.
    pub drag_sensitivity: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let camera = CameraState::default();
        CameraConfig {
            yaw: camera.angle_y,
            pitch: camera.angle_x,
            distance: camera.distance,
            fov: camera.fov,
            rotate_step: 0.05,
            drag_sensitivity: 0.01,
        }
    }
}

impl CameraConfig {
    pub fn initial_state(&self) -> CameraState {
        CameraState {
            angle_y: self.yaw,
            angle_x: self.pitch,
            distance: self.distance,
            fov: self.fov,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub tick_rate_hz: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig { tick_rate_hz: 30 }
    }
}

impl UiConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.tick_rate_hz.max(1)))
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub file: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            file: PathBuf::from("cube4.log"),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist. Runs before logging is set up, so the notice goes to
    /// stderr.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            eprintln!("Note: config file '{}' not found, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.path.as_os_str().is_empty() {
            return Err(ConfigError::Validation("engine.path must not be empty".into()));
        }
        if self.engine.search_depth == 0 {
            return Err(ConfigError::Validation(
                "engine.search_depth must be > 0".into(),
            ));
        }
        if self.engine.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "engine.timeout_ms must be > 0".into(),
            ));
        }
        if !(self.camera.distance > 0.0) {
            return Err(ConfigError::Validation(
                "camera.distance must be > 0".into(),
            ));
        }
        if !(self.camera.fov > 0.0) {
            return Err(ConfigError::Validation("camera.fov must be > 0".into()));
        }
        if !self.camera.yaw.is_finite() || !self.camera.pitch.is_finite() {
            return Err(ConfigError::Validation(
                "camera.yaw and camera.pitch must be finite".into(),
            ));
        }
        if !(self.camera.rotate_step > 0.0) || !(self.camera.drag_sensitivity > 0.0) {
            return Err(ConfigError::Validation(
                "camera.rotate_step and camera.drag_sensitivity must be > 0".into(),
            ));
        }
        if self.ui.tick_rate_hz == 0 || self.ui.tick_rate_hz > 240 {
            return Err(ConfigError::Validation(
                "ui.tick_rate_hz must be in [1, 240]".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&AppConfig::default())?)
    }
}
