use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::debug;
use opencv::core::{Mat, Rect, Size};
use opencv::{objdetect::CascadeClassifier, prelude::*, types::VectorOfRect};
use tempfile::NamedTempFile;

use crate::constants::{DETECT_MIN_NEIGHBORS, DETECT_SCALE_FACTOR};
use crate::error::CaptureError;

/// Multi-scale region detector run over the smoothed grayscale image.
pub trait RegionDetector: Send {
    fn detect(&mut self, image: &Mat, min_size: Size, max_size: Size) -> opencv::Result<Vec<Rect>>;
}

pub struct CascadeDetector {
    classifier: CascadeClassifier,
}

impl CascadeDetector {
    pub fn load(path: &Path) -> Result<Self, CaptureError> {
        let load_failed = || CaptureError::ClassifierLoad {
            path: path.to_path_buf(),
        };
        let filename = path.to_str().ok_or_else(load_failed)?;
        let mut classifier = CascadeClassifier::default()?;
        if !classifier.load(filename).map_err(|_| load_failed())? {
            return Err(load_failed());
        }
        Ok(Self { classifier })
    }
}

impl RegionDetector for CascadeDetector {
    fn detect(&mut self, image: &Mat, min_size: Size, max_size: Size) -> opencv::Result<Vec<Rect>> {
        let mut regions = VectorOfRect::new();
        self.classifier.detect_multi_scale(
            image,
            &mut regions,
            DETECT_SCALE_FACTOR,
            DETECT_MIN_NEIGHBORS,
            0,
            min_size,
            max_size,
        )?;
        Ok(regions.to_vec())
    }
}

/// Converts percentage bounds into pixel window sizes for a frame.
pub fn detection_window(frame: Size, min_percent: i32, max_percent: i32) -> (Size, Size) {
    let scale = |extent: i32, percent: i32| extent * percent / 100;
    (
        Size::new(scale(frame.width, min_percent), scale(frame.height, min_percent)),
        Size::new(scale(frame.width, max_percent), scale(frame.height, max_percent)),
    )
}

/// Copies a classifier definition into a uniquely named local file so the
/// detector library can read it regardless of where the source lives.
pub fn materialize_classifier(source: &Path) -> Result<NamedTempFile, CaptureError> {
    let contents = fs::read(source).map_err(CaptureError::TemporaryFile)?;
    let mut file = tempfile::Builder::new()
        .prefix("classifier-")
        .suffix(".xml")
        .tempfile()
        .map_err(CaptureError::TemporaryFile)?;
    file.write_all(&contents)
        .and_then(|_| file.flush())
        .map_err(CaptureError::TemporaryFile)?;
    debug!(
        "Materialized classifier {} as {}",
        source.display(),
        file.path().display()
    );
    Ok(file)
}

pub fn clamp_rect_to_frame(rect: Rect, frame: Size) -> Rect {
    let mut rect = rect;
    if rect.x < 0 {
        rect.width += rect.x;
        rect.x = 0;
    }
    if rect.y < 0 {
        rect.height += rect.y;
        rect.y = 0;
    }
    if rect.x + rect.width > frame.width {
        rect.width = frame.width - rect.x;
    }
    if rect.y + rect.height > frame.height {
        rect.height = frame.height - rect.y;
    }
    rect.width = rect.width.max(0);
    rect.height = rect.height.max(0);
    rect
}

pub fn default_classifier_path() -> PathBuf {
    PathBuf::from(crate::constants::CASCADE_XML_FILE)
}
