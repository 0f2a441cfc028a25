//! Conversion of captured BGR frames into images a UI can paint directly.

use image::RgbaImage;
use opencv::core::{Mat, Rect};
use opencv::{imgproc, prelude::*};

use crate::detector::clamp_rect_to_frame;

/// Converts a BGR frame to interleaved RGBA.
///
/// Every pixel is fully opaque, so the result is already in premultiplied
/// form.
pub fn to_display_image(frame: &Mat) -> opencv::Result<RgbaImage> {
    let mut rgba = Mat::default();
    imgproc::cvt_color(frame, &mut rgba, imgproc::COLOR_BGR2RGBA, 0)?;

    let width = rgba.cols().max(0) as u32;
    let height = rgba.rows().max(0) as u32;
    let data = rgba.data_bytes()?.to_vec();
    RgbaImage::from_raw(width, height, data).ok_or_else(|| {
        opencv::Error::new(
            opencv::core::StsUnmatchedSizes,
            format!("RGBA buffer does not match {width}x{height}"),
        )
    })
}

/// Crops `region` out of a BGR frame and converts it like [`to_display_image`].
pub fn crop_display_image(frame: &Mat, region: Rect) -> opencv::Result<RgbaImage> {
    let clamped = clamp_rect_to_frame(region, frame.size()?);
    let roi = Mat::roi(frame, clamped)?;
    to_display_image(&roi)
}
