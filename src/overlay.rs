use image::RgbImage;
use plotters::prelude::*;

use crate::error::CounterError;
use crate::labels::dish_label;
use crate::plate_image::PlateImage;
use crate::report::CountReport;

fn label_color(index: usize) -> RGBColor {
    let c = dish_label(index).color;
    RGBColor(c.red, c.green, c.blue)
}

fn render_error(e: impl std::fmt::Display) -> CounterError {
    CounterError::Render(e.to_string())
}

/// Draws the scan in gray with every dish outline and every colony circle in
/// the dish's label color.
pub fn render_overlay(image: &PlateImage, report: &CountReport) -> Result<RgbImage, CounterError> {
    let width = image.width() as u32;
    let height = image.height() as u32;

    let mut rgb: Vec<u8> = image
        .to_luma8()
        .into_raw()
        .into_iter()
        .flat_map(|g| [g, g, g])
        .collect();

    {
        let root = BitMapBackend::with_buffer(&mut rgb, (width, height)).into_drawing_area();

        for plate in &report.plates {
            let color = label_color(plate.index);
            let center = (plate.center_x.round() as i32, plate.center_y.round() as i32);
            root.draw(&Circle::new(center, plate.radius.round() as i32, color.stroke_width(3)))
                .map_err(render_error)?;

            for blob in &plate.colonies {
                let radius = (blob.radius.round() as i32).max(1);
                root.draw(&Circle::new(
                    (blob.x.round() as i32, blob.y.round() as i32),
                    radius,
                    color.stroke_width(1),
                ))
                .map_err(render_error)?;
            }
        }

        root.present().map_err(render_error)?;
    }

    RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| CounterError::Render(format!("failed to build {width}x{height} RGB image")))
}
