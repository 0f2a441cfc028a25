use opencv::core::Mat;
use opencv::{prelude::*, videoio};

type Result<T> = opencv::Result<T>;

/// Thin wrapper over an OpenCV capture device.
pub(crate) struct Capture {
    device: videoio::VideoCapture,
}

impl Capture {
    pub fn create(index: i32) -> Result<Self> {
        let device = videoio::VideoCapture::new(index, videoio::CAP_ANY)?;
        Ok(Self { device })
    }

    pub fn is_opened(&self) -> Result<bool> {
        videoio::VideoCapture::is_opened(&self.device)
    }

    /// Reads the next frame; an empty `Mat` means the device produced nothing.
    pub fn grab_frame(&mut self) -> Result<Mat> {
        let mut frame = Mat::default();
        if !self.device.read(&mut frame)? {
            return Ok(Mat::default());
        }
        Ok(frame)
    }
}

impl Drop for Capture {
    fn drop(&mut self) {
        let _ = self.device.release();
    }
}
