//! Synthetic plate scans for demos and tests.

use std::path::Path;

use image::ColorType;

use crate::error::CounterError;
use crate::plate_image::PlateImage;

/// A uniformly lit disk standing in for a dish.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticDish {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    pub level: f32,
}

/// A Gaussian intensity bump standing in for a colony.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticColony {
    pub x: f64,
    pub y: f64,
    pub sigma: f64,
    pub amplitude: f32,
}

/// Renders dishes (strict `distance < radius`) and adds colonies on top of a
/// uniform `background`.
pub fn render_scan(
    width: usize,
    height: usize,
    background: f32,
    dishes: &[SyntheticDish],
    colonies: &[SyntheticColony],
) -> Result<PlateImage, CounterError> {
    let mut pixels = vec![background; width * height];

    for dish in dishes {
        for y in 0..height {
            for x in 0..width {
                let dx = x as f64 - dish.center_x;
                let dy = y as f64 - dish.center_y;
                if (dx * dx + dy * dy).sqrt() < dish.radius {
                    pixels[y * width + x] = dish.level;
                }
            }
        }
    }

    for colony in colonies {
        let reach = (4.0 * colony.sigma).ceil();
        let x0 = (colony.x - reach).max(0.0) as usize;
        let y0 = (colony.y - reach).max(0.0) as usize;
        let x1 = ((colony.x + reach + 1.0).max(0.0) as usize).min(width);
        let y1 = ((colony.y + reach + 1.0).max(0.0) as usize).min(height);
        let two_sigma_sq = 2.0 * colony.sigma * colony.sigma;
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f64 - colony.x;
                let dy = y as f64 - colony.y;
                let value = (-(dx * dx + dy * dy) / two_sigma_sq).exp() as f32;
                pixels[y * width + x] += colony.amplitude * value;
            }
        }
    }

    PlateImage::from_pixels(width, height, pixels)
}

/// Writes a scan as an 8-bit grayscale image.
pub fn save_scan(image: &PlateImage, path: impl AsRef<Path>) -> Result<(), CounterError> {
    let gray = image.to_luma8();
    image::save_buffer(
        path.as_ref(),
        gray.as_raw(),
        gray.width(),
        gray.height(),
        ColorType::L8,
    )?;
    Ok(())
}
