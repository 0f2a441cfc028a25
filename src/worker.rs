//! Background capture-and-detect loop.
//!
//! A [`CaptureWorker`] owns one thread that opens a video device, loads a
//! cascade classifier and then, frame by frame, smooths the grayscale image,
//! runs detection over it and queues [`CaptureEvent`]s for the consumer. The
//! consumer drains [`CaptureWorker::events`] on its own schedule; the worker
//! never waits for it.

use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use crossbeam_channel::{Receiver, Sender};
use image::RgbaImage;
use log::{debug, info, warn};
use opencv::core::{Mat, Rect, Size};
use opencv::prelude::*;

use crate::accumulator::{convert_to_grayscale, MotionAccumulator};
use crate::capture::Capture;
use crate::detector::{detection_window, materialize_classifier, CascadeDetector, RegionDetector};
use crate::display::{crop_display_image, to_display_image};
use crate::error::CaptureError;
use crate::settings::{clamp_percent, SharedSettings, WorkerSettings};

/// Rectangle of a detected region in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl From<Rect> for Region {
    fn from(rect: Rect) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CapturedFrame {
    /// Tick for a processed frame while capture output is hidden.
    Hidden,
    Frame(RgbaImage),
    /// Last event of a run that was interrupted with capture output visible.
    EndOfStream,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    Region(Region),
    Image(RgbaImage),
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureEvent {
    Failed,
    Captured(CapturedFrame),
    Detected(Detection),
}

/// Source of BGR frames. An empty `Mat` means the device produced nothing.
pub trait FrameSource: Send {
    fn read_frame(&mut self) -> opencv::Result<Mat>;
}

/// Opens the collaborators a run needs.
pub trait CaptureBackend: Send + Sync {
    fn open_device(&self, index: i32) -> Result<Box<dyn FrameSource>, CaptureError>;
    fn load_classifier(&self, path: &Path) -> Result<Box<dyn RegionDetector>, CaptureError>;
}

pub struct OpenCvBackend;

impl FrameSource for Capture {
    fn read_frame(&mut self) -> opencv::Result<Mat> {
        self.grab_frame()
    }
}

impl CaptureBackend for OpenCvBackend {
    fn open_device(&self, index: i32) -> Result<Box<dyn FrameSource>, CaptureError> {
        let capture = Capture::create(index).map_err(|_| CaptureError::DeviceOpen { index })?;
        if !capture.is_opened()? {
            return Err(CaptureError::DeviceOpen { index });
        }
        Ok(Box::new(capture))
    }

    fn load_classifier(&self, path: &Path) -> Result<Box<dyn RegionDetector>, CaptureError> {
        Ok(Box::new(CascadeDetector::load(path)?))
    }
}

/// Cooperative stop flag, checked once per loop iteration.
#[derive(Debug, Clone, Default)]
pub struct InterruptHandle(Arc<AtomicBool>);

impl InterruptHandle {
    pub fn interrupt(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_interrupted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

pub struct CaptureWorker {
    settings: SharedSettings,
    backend: Arc<dyn CaptureBackend>,
    interrupt: InterruptHandle,
    events_tx: Sender<CaptureEvent>,
    events_rx: Receiver<CaptureEvent>,
    handle: Option<JoinHandle<()>>,
}

impl Default for CaptureWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureWorker {
    pub fn new() -> Self {
        Self::with_backend(Arc::new(OpenCvBackend))
    }

    pub fn with_backend(backend: Arc<dyn CaptureBackend>) -> Self {
        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        Self {
            settings: SharedSettings::default(),
            backend,
            interrupt: InterruptHandle::default(),
            events_tx,
            events_rx,
            handle: None,
        }
    }

    pub fn device_index(&self) -> i32 {
        self.settings.read(|s| s.device_index)
    }

    pub fn detector_classifier(&self) -> PathBuf {
        self.settings.read(|s| s.classifier_path.clone())
    }

    pub fn detector_min_size(&self) -> i32 {
        self.settings.read(|s| s.detector_min_size)
    }

    pub fn detector_max_size(&self) -> i32 {
        self.settings.read(|s| s.detector_max_size)
    }

    pub fn is_hidden_capture(&self) -> bool {
        self.settings.read(|s| s.hidden_capture)
    }

    pub fn is_hidden_detect(&self) -> bool {
        self.settings.read(|s| s.hidden_detect)
    }

    pub fn set_device_index(&self, index: i32) {
        self.settings.update(|s| s.device_index = index);
    }

    pub fn set_detector_classifier(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.settings.update(|s| s.classifier_path = path);
    }

    pub fn set_detector_min_size(&self, percent: i32) {
        self.settings
            .update(|s| s.detector_min_size = clamp_percent(percent));
    }

    pub fn set_detector_max_size(&self, percent: i32) {
        self.settings
            .update(|s| s.detector_max_size = clamp_percent(percent));
    }

    pub fn set_capture_hidden(&self, hidden: bool) {
        self.settings.update(|s| s.hidden_capture = hidden);
    }

    pub fn set_detect_hidden(&self, hidden: bool) {
        self.settings.update(|s| s.hidden_detect = hidden);
    }

    pub fn settings(&self) -> WorkerSettings {
        self.settings.snapshot()
    }

    /// Handle to the live settings; updates apply from the next frame on.
    pub fn shared_settings(&self) -> SharedSettings {
        self.settings.clone()
    }

    /// Queue of notifications produced by the worker thread, in emission order.
    pub fn events(&self) -> Receiver<CaptureEvent> {
        self.events_rx.clone()
    }

    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map_or(false, |handle| !handle.is_finished())
    }

    /// Spawns the worker thread. Returns `false` without touching the active
    /// run when one is still going, or when the thread could not be spawned.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            debug!("Capture worker already running");
            return false;
        }
        self.wait();
        self.interrupt.reset();

        let run = Run {
            settings: self.settings.clone(),
            backend: Arc::clone(&self.backend),
            interrupt: self.interrupt.clone(),
            events: self.events_tx.clone(),
        };

        match thread::Builder::new()
            .name("capture-worker".to_string())
            .spawn(move || run.execute())
        {
            Ok(handle) => {
                self.handle = Some(handle);
                true
            }
            Err(err) => {
                warn!("Can not spawn capture thread: {}", err);
                let _ = self.events_tx.send(CaptureEvent::Failed);
                false
            }
        }
    }

    pub fn request_interruption(&self) {
        self.interrupt.interrupt();
    }

    /// Blocks until the worker thread has finished.
    pub fn wait(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Capture worker thread panicked");
            }
        }
    }
}

impl Drop for CaptureWorker {
    fn drop(&mut self) {
        self.request_interruption();
        self.wait();
    }
}

struct Run {
    settings: SharedSettings,
    backend: Arc<dyn CaptureBackend>,
    interrupt: InterruptHandle,
    events: Sender<CaptureEvent>,
}

impl Run {
    fn execute(self) {
        match self.capture_loop() {
            Ok(()) => {
                if !self.settings.read(|s| s.hidden_capture) {
                    self.emit(CaptureEvent::Captured(CapturedFrame::EndOfStream));
                }
                info!("Capture worker stopped");
            }
            Err(err) => {
                warn!("{}", err);
                self.emit(CaptureEvent::Failed);
            }
        }
    }

    fn emit(&self, event: CaptureEvent) {
        let _ = self.events.send(event);
    }

    fn capture_loop(&self) -> Result<(), CaptureError> {
        let device_index = self.settings.read(|s| s.device_index);
        let mut source = self.backend.open_device(device_index)?;

        let classifier_path = self.settings.read(|s| s.classifier_path.clone());
        let materialized = materialize_classifier(&classifier_path)?;
        let loaded = self.backend.load_classifier(materialized.path());
        if let Err(err) = materialized.close() {
            debug!("Removing temporary classifier failed: {}", err);
        }
        let mut detector = loaded?;
        info!(
            "Capturing with device {} using classifier {}",
            device_index,
            classifier_path.display()
        );

        let mut accumulator = MotionAccumulator::new();

        while !self.interrupt.is_interrupted() {
            let frame = source.read_frame()?;
            if frame.rows() <= 0 || frame.cols() <= 0 {
                return Err(CaptureError::FrameRead {
                    index: device_index,
                });
            }

            let gray = convert_to_grayscale(&frame)?;
            let smoothed = accumulator.update(&gray)?;

            let (min_percent, max_percent) = self
                .settings
                .read(|s| (s.detector_min_size, s.detector_max_size));
            let (min_size, max_size) = detection_window(
                Size::new(smoothed.cols(), smoothed.rows()),
                min_percent,
                max_percent,
            );
            let regions = detector.detect(&smoothed, min_size, max_size)?;

            let captured = if self.settings.read(|s| s.hidden_capture) {
                CapturedFrame::Hidden
            } else {
                CapturedFrame::Frame(to_display_image(&frame)?)
            };
            self.emit(CaptureEvent::Captured(captured));

            if let Some(region) = regions.first().copied() {
                let detection = if self.settings.read(|s| s.hidden_detect) {
                    Detection::Region(region.into())
                } else {
                    Detection::Image(crop_display_image(&frame, region)?)
                };
                self.emit(CaptureEvent::Detected(detection));
            }
        }

        Ok(())
    }
}
