use std::{
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::constants::{DEFAULT_DETECTOR_MAX_SIZE, DEFAULT_DETECTOR_MIN_SIZE, DEFAULT_DEVICE_INDEX};

/// Values shared between the owner of a capture worker and its thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSettings {
    pub device_index: i32,
    pub classifier_path: PathBuf,
    pub detector_min_size: i32,
    pub detector_max_size: i32,
    pub hidden_capture: bool,
    pub hidden_detect: bool,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            device_index: DEFAULT_DEVICE_INDEX,
            classifier_path: PathBuf::new(),
            detector_min_size: DEFAULT_DETECTOR_MIN_SIZE,
            detector_max_size: DEFAULT_DETECTOR_MAX_SIZE,
            hidden_capture: true,
            hidden_detect: true,
        }
    }
}

/// A single lock around [`WorkerSettings`]. Reads copy values out, so the lock
/// is never held across capture or detection.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings {
    inner: Arc<Mutex<WorkerSettings>>,
}

impl SharedSettings {
    fn lock(&self) -> MutexGuard<'_, WorkerSettings> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn read<T>(&self, f: impl FnOnce(&WorkerSettings) -> T) -> T {
        f(&self.lock())
    }

    pub fn update(&self, f: impl FnOnce(&mut WorkerSettings)) {
        f(&mut self.lock())
    }

    pub fn snapshot(&self) -> WorkerSettings {
        self.lock().clone()
    }
}

pub(crate) fn clamp_percent(percent: i32) -> i32 {
    percent.clamp(0, 100)
}
