use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{
    APP_DIR_NAME, DEFAULT_CAMERA_INDEX, DEFAULT_CAPTURE_FPS, DEFAULT_CAPTURE_HEIGHT,
    DEFAULT_CAPTURE_WIDTH, DEFAULT_DETECTION_QUEUE, DEFAULT_DETECTION_WORKERS,
    DEFAULT_MAX_IN_FLIGHT, OVERLAY_STROKE_COLOR, OVERLAY_STROKE_WIDTH,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Application configuration shared by the CLI and the desktop app.
///
/// Every field has a default so partial files are accepted. The file is
/// only ever read; nothing in the application writes it back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub camera_index: u32,
    pub capture_width: u32,
    pub capture_height: u32,
    pub capture_fps: u32,
    /// Clockwise degrees needed to turn captured frames upright.
    pub rotation_degrees: i32,
    pub max_in_flight: usize,
    pub detection_confidence: f64,
    pub detection_workers: usize,
    pub detection_queue: usize,
    pub model_dir: Option<PathBuf>,
    pub face_detection_model_url: Option<String>,
    pub face_mesh_model_url: Option<String>,
    pub stroke_width: f32,
    pub stroke_color: [u8; 4],
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            camera_index: DEFAULT_CAMERA_INDEX,
            capture_width: DEFAULT_CAPTURE_WIDTH,
            capture_height: DEFAULT_CAPTURE_HEIGHT,
            capture_fps: DEFAULT_CAPTURE_FPS,
            rotation_degrees: 0,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            detection_confidence: 0.5,
            detection_workers: DEFAULT_DETECTION_WORKERS,
            detection_queue: DEFAULT_DETECTION_QUEUE,
            model_dir: None,
            face_detection_model_url: None,
            face_mesh_model_url: None,
            stroke_width: OVERLAY_STROKE_WIDTH,
            stroke_color: OVERLAY_STROKE_COLOR,
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.json"))
    }

    /// Loads the user config, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{e}; using default configuration");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
