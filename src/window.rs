use image::RgbaImage;
use opencv::core::{Mat, Point, Rect, Scalar};
use opencv::imgproc;
use opencv::{highgui, prelude::*};

use crate::worker::Region;

type Result<T> = opencv::Result<T>;

/// Preview window for captured frames.
pub struct Window {
    name: String,
}

impl Window {
    pub fn create(name: &'_ str) -> Result<Self> {
        highgui::named_window(name, highgui::WINDOW_GUI_NORMAL | highgui::WINDOW_KEEPRATIO)?;
        Ok(Self {
            name: name.to_owned(),
        })
    }

    pub fn show_image(&self, image: &RgbaImage, region: Option<Region>, status: &str) -> Result<()> {
        let flat = Mat::from_slice(image.as_raw().as_slice())?;
        let rgba = flat.reshape(4, image.height() as i32)?;
        let mut frame = Mat::default();
        imgproc::cvt_color(&rgba, &mut frame, imgproc::COLOR_RGBA2BGR, 0)?;

        if let Some(region) = region {
            let color_red = Scalar::new(0f64, 0f64, 255f64, -1f64);
            imgproc::rectangle(
                &mut frame,
                Rect::new(region.x, region.y, region.width, region.height),
                color_red,
                2,
                imgproc::LINE_8,
                0,
            )?;
        }

        imgproc::put_text(
            &mut frame,
            status,
            Point::new(10, 20),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.5,
            Scalar::new(0., 0., 255., 0.),
            1,
            imgproc::LINE_8,
            false,
        )?;

        highgui::imshow(&self.name, &frame)
    }

    /// Pumps window events; returns the pressed key code, or -1.
    pub fn poll_key(&self) -> Result<i32> {
        highgui::wait_key(1)
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        let _ = highgui::destroy_window(&self.name);
    }
}
