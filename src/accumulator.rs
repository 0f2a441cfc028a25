//! Motion-weighted grayscale accumulation.

use opencv::core::{self, Mat, Scalar, Size, CV_64F, CV_64FC1};
use opencv::{imgproc, prelude::*};

use crate::constants::{ACCUMULATOR_DECAY, ACCUMULATOR_FRAME_WEIGHT};

type Result<T> = opencv::Result<T>;

/// Exponentially weighted running average of grayscale frames.
///
/// The buffer is stored as `CV_64F` and is reset to zeros whenever an incoming
/// frame has different dimensions than the buffer.
#[derive(Default)]
pub struct MotionAccumulator {
    buffer: Option<Mat>,
}

impl MotionAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dimensions of the current buffer, if one has been allocated.
    pub fn size(&self) -> Option<Size> {
        self.buffer
            .as_ref()
            .map(|buffer| Size::new(buffer.cols(), buffer.rows()))
    }

    pub fn buffer(&self) -> Option<&Mat> {
        self.buffer.as_ref()
    }

    /// Folds a single-channel 8-bit frame into the running average and returns
    /// the saturated 8-bit view of the result.
    pub fn update(&mut self, gray: &Mat) -> Result<Mat> {
        let size = Size::new(gray.cols(), gray.rows());
        if self.size() != Some(size) {
            self.buffer = Some(Mat::new_rows_cols_with_default(
                size.height,
                size.width,
                CV_64FC1,
                Scalar::all(0f64),
            )?);
        }

        let mut current = Mat::default();
        gray.convert_to(&mut current, CV_64F, 1f64, 0f64)?;

        let mut blended = Mat::default();
        if let Some(buffer) = self.buffer.as_ref() {
            core::add_weighted(
                buffer,
                ACCUMULATOR_DECAY,
                &current,
                ACCUMULATOR_FRAME_WEIGHT,
                0f64,
                &mut blended,
                CV_64F,
            )?;
        }

        let mut smoothed = Mat::default();
        core::convert_scale_abs(&blended, &mut smoothed, 1f64, 0f64)?;
        self.buffer = Some(blended);
        Ok(smoothed)
    }
}

pub fn convert_to_grayscale(frame: &Mat) -> Result<Mat> {
    let mut gray = Mat::default();
    imgproc::cvt_color(frame, &mut gray, imgproc::COLOR_BGR2GRAY, 0)?;
    Ok(gray)
}
