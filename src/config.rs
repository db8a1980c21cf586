use egui::Pos2;
use serde::{Deserialize, Serialize};

use crate::FacemarkError;
use crate::capture::session::{DEFAULT_JPEG_QUALITY, DEFAULT_SAMPLE_PROBABILITY};

const CONFIG_FILE_NAME: &str = "config.json";
const DEFAULT_MARK_ENDPOINT: &str = "http://127.0.0.1:5000/mark_attendance";
const DEFAULT_REFRESH_RATE_MS: u64 = 100;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WindowPosition {
    pub x: f32,
    pub y: f32,
}

impl Default for WindowPosition {
    fn default() -> Self {
        Self { x: 0., y: 0. }
    }
}

impl From<WindowPosition> for Pos2 {
    fn from(value: WindowPosition) -> Self {
        Pos2::new(value.x, value.y)
    }
}

impl From<Pos2> for WindowPosition {
    fn from(value: Pos2) -> Self {
        Self {
            x: value.x,
            y: value.y,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct AppConfig {
    pub mark_endpoint: String,
    pub refresh_rate_ms: u64,
    pub sample_probability: f64,
    pub jpeg_quality: u8,
    pub stop_on_success: bool,
    pub status_window_position: WindowPosition,
    pub chart_window_position: WindowPosition,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mark_endpoint: DEFAULT_MARK_ENDPOINT.to_string(),
            refresh_rate_ms: DEFAULT_REFRESH_RATE_MS,
            sample_probability: DEFAULT_SAMPLE_PROBABILITY,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            stop_on_success: false,
            status_window_position: WindowPosition::default(),
            chart_window_position: WindowPosition::default(),
        }
    }
}

impl AppConfig {
    pub fn from_local_file() -> Option<Self> {
        let config_path = dirs::config_dir()?.join("facemark").join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let file = std::fs::File::open(config_path).expect("Could not open config file");
            Some(serde_json::from_reader(file).expect("Could not parse config file"))
        } else {
            None
        }
    }

    pub fn save(&self) -> Result<(), FacemarkError> {
        let config_path = dirs::config_dir()
            .ok_or(FacemarkError::NoConfigDir)?
            .join("facemark")
            .join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            std::fs::create_dir_all(config_path.parent().ok_or(FacemarkError::NoConfigDir)?)
                .map_err(|e| FacemarkError::ConfigIOError { source: e })?;
        }

        let file = std::fs::File::create(config_path)
            .map_err(|e| FacemarkError::ConfigIOError { source: e })?;
        serde_json::to_writer(file, self)
            .map_err(|e| FacemarkError::ConfigSerializeError { source: e })
    }
}
