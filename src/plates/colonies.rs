use std::f64::consts::SQRT_2;

use serde::{Deserialize, Serialize};

use super::locate::Dish;
use super::mask::DishMask;
use crate::detect::{BlobDetector, ScaleBlob};
use crate::error::CounterError;
use crate::plate_image::PlateImage;

/// A detected colony, in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    pub y: f64,
    pub x: f64,
    pub radius: f64,
}

impl From<ScaleBlob> for Blob {
    fn from(b: ScaleBlob) -> Self {
        Self {
            y: b.y,
            x: b.x,
            radius: sigma_to_radius(b.sigma),
        }
    }
}

/// Radius of a blob whose Laplacian-of-Gaussian response peaked at `sigma`.
pub fn sigma_to_radius(sigma: f64) -> f64 {
    SQRT_2 * sigma
}

fn check_shape(image: &PlateImage, mask: &DishMask) -> Result<(), CounterError> {
    if image.shape() != mask.shape() {
        return Err(CounterError::InvalidShape {
            expected: image.shape(),
            found: mask.shape(),
        });
    }
    Ok(())
}

/// Zeroes every pixel outside the dish.
pub fn trim_to_mask(image: &PlateImage, mask: &DishMask) -> Result<PlateImage, CounterError> {
    check_shape(image, mask)?;
    let pixels = image
        .pixels()
        .iter()
        .zip(mask.cells())
        .map(|(&v, &inside)| if inside { v } else { 0.0 })
        .collect();
    PlateImage::from_pixels(image.width(), image.height(), pixels)
}

/// Detects the colonies of one dish.
///
/// The scan is trimmed to the dish (outside pixels become 0) and handed to
/// `detector`. When the detector reports a support radius, only the dish's
/// bounding box grown by that radius is evaluated; the trimmed image is zero
/// beyond it, so the blobs are the same as for the whole image.
pub fn detect_colonies(
    image: &PlateImage,
    mask: &DishMask,
    detector: &dyn BlobDetector,
) -> Result<Vec<Blob>, CounterError> {
    let trimmed = trim_to_mask(image, mask)?;

    let window = match (detector.support_radius(), mask.bounds()) {
        (_, None) => return Ok(Vec::new()),
        (Some(margin), Some(bounds)) => bounds.expand(margin, image.width(), image.height()),
        (None, Some(_)) => {
            return Ok(detector.detect_blobs(&trimmed).into_iter().map(Blob::from).collect());
        }
    };

    let local = trimmed.crop(window.x0, window.y0, window.width(), window.height())?;
    let blobs = detector
        .detect_blobs(&local)
        .into_iter()
        .map(|b| {
            Blob::from(ScaleBlob {
                y: b.y + window.y0 as f64,
                x: b.x + window.x0 as f64,
                sigma: b.sigma,
            })
        })
        .collect();
    Ok(blobs)
}

/// Mean intensity of the dish pixels in the band `radius - band <= distance < radius`,
/// or `None` when no dish pixel falls in the band.
///
/// Trimming fills everything outside the dish with 0, so a bright rim turns
/// into a step edge and the blob detector answers it with spurious colonies
/// along the dish border.
pub fn rim_level(image: &PlateImage, dish: &Dish, mask: &DishMask, band: f64) -> Result<Option<f32>, CounterError> {
    check_shape(image, mask)?;
    let Some(bounds) = mask.bounds() else {
        return Ok(None);
    };

    let inner = dish.radius - band;
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for y in bounds.y0..bounds.y1 {
        for x in bounds.x0..bounds.x1 {
            if mask.contains(x, y) && dish.center_distance(x as f64, y as f64) >= inner {
                sum += image.get(x, y) as f64;
                count += 1;
            }
        }
    }
    Ok((count > 0).then(|| (sum / count as f64) as f32))
}
