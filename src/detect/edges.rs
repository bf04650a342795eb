use image::GrayImage;

use crate::plate_image::PlateImage;

/// Produces a binary edge map: nonzero pixels are edges.
pub trait EdgeDetector {
    fn detect_edges(&self, image: &PlateImage) -> GrayImage;
}

/// Canny edge detection on the 8-bit quantised scan.
#[derive(Debug, Clone, Copy)]
pub struct CannyEdges {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl CannyEdges {
    pub fn new(low_threshold: f32, high_threshold: f32) -> Self {
        Self {
            low_threshold,
            high_threshold,
        }
    }
}

impl EdgeDetector for CannyEdges {
    fn detect_edges(&self, image: &PlateImage) -> GrayImage {
        imageproc::edges::canny(&image.to_luma8(), self.low_threshold, self.high_threshold)
    }
}
