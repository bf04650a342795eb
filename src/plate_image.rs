//! Grayscale scan representation shared by every pipeline stage.

use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use kornia::{
    image::{Image, ImageSize, allocator::CpuAllocator},
    imgproc,
};

use crate::error::CounterError;

type CpuImage<T, const C: usize> = Image<T, C, CpuAllocator>;

/// Immutable grayscale image with real-valued intensities, stored row-major.
///
/// Images converted from 8-bit sources hold intensities in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateImage {
    width: usize,
    height: usize,
    pixels: Vec<f32>,
}

impl PlateImage {
    /// Wraps an in-memory grayscale grid.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<f32>) -> Result<Self, CounterError> {
        if width == 0 || height == 0 {
            return Err(CounterError::EmptyImage);
        }
        if pixels.len() != width * height {
            return Err(CounterError::PixelCount {
                expected: width * height,
                found: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Converts a decoded color (or gray) image to grayscale intensities in `[0, 1]`.
    pub fn from_dynamic(source: &DynamicImage) -> Result<Self, CounterError> {
        let rgb = source.to_rgb8();
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(CounterError::EmptyImage);
        }

        let image = CpuImage::<u8, 3>::new(
            ImageSize {
                width: width as usize,
                height: height as usize,
            },
            rgb.into_raw(),
            CpuAllocator,
        )?;
        let mut gray = CpuImage::<u8, 1>::from_size_val(image.size(), 0u8, CpuAllocator)?;
        imgproc::color::gray_from_rgb_u8(&image, &mut gray)?;

        let pixels = gray.as_slice().iter().map(|&v| v as f32 / 255.0).collect();
        Self::from_pixels(width as usize, height as usize, pixels)
    }

    /// Whether the file extension names a format that [`open`](Self::open) can decode.
    pub fn is_decodable_path(path: impl AsRef<Path>) -> bool {
        ImageFormat::from_path(path).is_ok_and(|format| format.reading_enabled())
    }

    /// Decodes an image file and converts it to grayscale.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CounterError> {
        let decoded = image::open(path)?;
        Self::from_dynamic(&decoded)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.pixels[y * self.width + x]
    }

    /// Quantises to 8 bits, clamping intensities to `[0, 1]` first.
    pub fn to_luma8(&self) -> GrayImage {
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let v = self.get(x as usize, y as usize).clamp(0.0, 1.0);
            Luma([(v * 255.0).round() as u8])
        })
    }

    /// Copies the window starting at `(x0, y0)`; the window is clipped to the image.
    pub fn crop(&self, x0: usize, y0: usize, width: usize, height: usize) -> Result<Self, CounterError> {
        let x1 = (x0 + width).min(self.width);
        let y1 = (y0 + height).min(self.height);
        if x0 >= x1 || y0 >= y1 {
            return Err(CounterError::EmptyImage);
        }
        let mut pixels = Vec::with_capacity((x1 - x0) * (y1 - y0));
        for y in y0..y1 {
            pixels.extend_from_slice(&self.pixels[y * self.width + x0..y * self.width + x1]);
        }
        Self::from_pixels(x1 - x0, y1 - y0, pixels)
    }
}
