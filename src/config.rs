//! Persisted application settings.
//!
//! The settings dialog edits these values; the capture worker and login
//! request read them.

use std::{
    env, fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::detector::default_classifier_path;
use crate::login::ApiEndpoint;
use crate::settings::clamp_percent;
use crate::worker::CaptureWorker;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Eng,
    Rus,
}

impl Language {
    /// Locale segment used in API URLs.
    pub fn locale(self) -> &'static str {
        match self {
            Language::Eng => "en",
            Language::Rus => "ru",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Language::Eng => "Eng",
                Language::Rus => "Rus",
            }
        )
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eng" | "en" => Ok(Language::Eng),
            "rus" | "ru" => Ok(Language::Rus),
            other => Err(format!(
                "invalid language '{other}'; expected 'Eng' or 'Rus'"
            )),
        }
    }
}

/// Capture worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CaptureSettings {
    pub device_index: i32,
    pub classifier_path: PathBuf,
    /// Smallest detection window as a percentage of the frame (0-100).
    pub detector_min_size: i32,
    /// Largest detection window as a percentage of the frame (0-100).
    pub detector_max_size: i32,
    pub hidden_capture: bool,
    pub hidden_detect: bool,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            device_index: DEFAULT_DEVICE_INDEX,
            classifier_path: default_classifier_path(),
            detector_min_size: DEFAULT_DETECTOR_MIN_SIZE,
            detector_max_size: DEFAULT_DETECTOR_MAX_SIZE,
            hidden_capture: true,
            hidden_detect: true,
        }
    }
}

impl CaptureSettings {
    pub fn apply_to(&self, worker: &CaptureWorker) {
        worker.set_device_index(self.device_index);
        worker.set_detector_classifier(self.classifier_path.clone());
        worker.set_detector_min_size(self.detector_min_size);
        worker.set_detector_max_size(self.detector_max_size);
        worker.set_capture_hidden(self.hidden_capture);
        worker.set_detect_hidden(self.hidden_detect);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppSettings {
    pub language: Language,
    pub username: String,
    pub password: String,
    /// Minutes allowed in front of the webcam before warning (1-60).
    pub duration: u32,
    pub registration_link: String,
    pub domain: String,
    pub capture: CaptureSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            username: String::new(),
            password: String::new(),
            duration: DEFAULT_DURATION_MINUTES,
            registration_link: String::new(),
            domain: String::new(),
            capture: CaptureSettings::default(),
        }
    }
}

impl AppSettings {
    /// Clamp values to their valid ranges.
    pub fn sanitize(&mut self) {
        self.duration = self
            .duration
            .clamp(MIN_DURATION_MINUTES, MAX_DURATION_MINUTES);
        self.capture.detector_min_size = clamp_percent(self.capture.detector_min_size);
        self.capture.detector_max_size = clamp_percent(self.capture.detector_max_size);
    }

    pub fn locale(&self) -> &'static str {
        self.language.locale()
    }

    pub fn endpoint(&self) -> ApiEndpoint {
        ApiEndpoint::new(self.domain.as_str(), self.locale())
    }

    pub fn registration_link(&self) -> Option<&str> {
        Some(self.registration_link.as_str()).filter(|link| !link.is_empty())
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let mut settings: AppSettings = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse settings JSON at {}", path.display()))?;
        settings.sanitize();
        Ok(settings)
    }

    /// Loads `path` when it exists, otherwise returns the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_path(path)
        } else {
            debug!("No settings at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let payload =
            serde_json::to_string_pretty(self).context("failed to serialize settings JSON")?;
        fs::write(path, payload)
            .with_context(|| format!("failed to write settings file {}", path.display()))?;
        Ok(())
    }
}

/// Returns the default path for persisted settings (`config/settings.json`).
pub fn default_settings_path() -> PathBuf {
    env::current_dir()
        .map(|dir| dir.join("config/settings.json"))
        .unwrap_or_else(|_| PathBuf::from("config/settings.json"))
}
