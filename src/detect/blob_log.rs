//! Scale-space blob detection with the Laplacian of Gaussian.
//!
//! For every scale `sigma` the image is filtered with the scale-normalised,
//! sign-flipped Laplacian of Gaussian `-sigma^2 * LoG`, so bright blobs give
//! positive responses that peak near `sigma = blob_sigma`. Image borders are
//! extended by continuity. Local maxima of the resulting (y, x, scale) cube
//! above a threshold become blobs, and blobs whose disks overlap too much are
//! merged into the larger one.

use std::f64::consts::{PI, SQRT_2};

use image::{ImageBuffer, Luma};
use imageproc::filter::separable_filter;

use crate::plate_image::PlateImage;

type GrayF32 = ImageBuffer<Luma<f32>, Vec<f32>>;

/// A blob as reported by the detector: position and the scale at which its
/// response peaked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleBlob {
    pub y: f64,
    pub x: f64,
    pub sigma: f64,
}

/// Finds blob-like intensity peaks in an image.
pub trait BlobDetector {
    fn detect_blobs(&self, image: &PlateImage) -> Vec<ScaleBlob>;

    /// How far (in pixels) a pixel influences the detector's output.
    ///
    /// When reported, evaluating the detector over a window that extends this
    /// far beyond every nonzero pixel gives the same blobs as the full image.
    fn support_radius(&self) -> Option<usize> {
        None
    }
}

/// Laplacian-of-Gaussian detector over an evenly spaced range of scales.
#[derive(Debug, Clone, Copy)]
pub struct LogBlobDetector {
    pub min_sigma: f64,
    pub max_sigma: f64,
    pub num_sigma: usize,
    /// Responses must be strictly above this value.
    pub threshold: f32,
    /// Overlap fraction above which the smaller of two blobs is discarded.
    pub overlap: f64,
}

impl Default for LogBlobDetector {
    fn default() -> Self {
        Self {
            min_sigma: 2.0,
            max_sigma: 15.0,
            num_sigma: 10,
            threshold: 0.1,
            overlap: 0.5,
        }
    }
}

impl LogBlobDetector {
    /// The scales searched, from `min_sigma` to `max_sigma` inclusive.
    pub fn sigma_list(&self) -> Vec<f64> {
        match self.num_sigma {
            0 => Vec::new(),
            1 => vec![self.min_sigma],
            n => {
                let step = (self.max_sigma - self.min_sigma) / (n - 1) as f64;
                (0..n).map(|i| self.min_sigma + step * i as f64).collect()
            }
        }
    }
}

impl BlobDetector for LogBlobDetector {
    fn detect_blobs(&self, image: &PlateImage) -> Vec<ScaleBlob> {
        let sigmas = self.sigma_list();
        if sigmas.is_empty() {
            return Vec::new();
        }

        let (width, height) = image.shape();
        let buffer = GrayF32::from_fn(width as u32, height as u32, |x, y| Luma([image.get(x as usize, y as usize)]));
        let cube: Vec<Vec<f32>> = sigmas.iter().map(|&sigma| normalized_log(&buffer, sigma)).collect();

        let blobs = cube_peaks(&cube, width, height, self.threshold)
            .into_iter()
            .map(|p| ScaleBlob {
                y: p.y as f64,
                x: p.x as f64,
                sigma: sigmas[p.scale],
            })
            .collect();

        prune_blobs(blobs, self.overlap)
    }

    fn support_radius(&self) -> Option<usize> {
        // Kernel reach of the largest scale plus one pixel for the peak neighbourhood.
        Some(kernel_radius(self.max_sigma) + 1)
    }
}

fn kernel_radius(sigma: f64) -> usize {
    (4.0 * sigma + 0.5) as usize
}

/// Sampled Gaussian (order 0) or its second derivative (order 2), both built
/// from the unit-sum Gaussian.
fn gaussian_kernel(sigma: f64, radius: usize, second_derivative: bool) -> Vec<f32> {
    let sigma2 = sigma * sigma;
    let xs: Vec<f64> = (0..=2 * radius).map(|i| i as f64 - radius as f64).collect();
    let phi: Vec<f64> = xs.iter().map(|x| (-0.5 * x * x / sigma2).exp()).collect();
    let sum: f64 = phi.iter().sum();

    xs.iter()
        .zip(&phi)
        .map(|(x, p)| {
            let p = p / sum;
            if second_derivative {
                (p * (x * x - sigma2) / (sigma2 * sigma2)) as f32
            } else {
                p as f32
            }
        })
        .collect()
}

/// `-sigma^2 * (d2/dx2 + d2/dy2)(G_sigma * image)`, computed separably.
fn normalized_log(image: &GrayF32, sigma: f64) -> Vec<f32> {
    let radius = kernel_radius(sigma);
    let smooth = gaussian_kernel(sigma, radius, false);
    let second = gaussian_kernel(sigma, radius, true);

    let dxx = separable_filter(image, &second, &smooth);
    let dyy = separable_filter(image, &smooth, &second);

    let scale = (sigma * sigma) as f32;
    dxx.as_raw()
        .iter()
        .zip(dyy.as_raw())
        .map(|(xx, yy)| -(xx + yy) * scale)
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct CubePeak {
    y: usize,
    x: usize,
    scale: usize,
    value: f32,
}

/// Points strictly above `threshold` that equal the maximum of their 3x3x3
/// neighbourhood (borders clamped), strongest first.
fn cube_peaks(cube: &[Vec<f32>], width: usize, height: usize, threshold: f32) -> Vec<CubePeak> {
    let depth = cube.len();
    let first = cube[0][0];
    if cube.iter().all(|layer| layer.iter().all(|&v| v == first)) {
        return Vec::new();
    }

    let mut peaks = Vec::new();
    for y in 0..height {
        let (y0, y1) = (y.saturating_sub(1), (y + 1).min(height - 1));
        for x in 0..width {
            let (x0, x1) = (x.saturating_sub(1), (x + 1).min(width - 1));
            for scale in 0..depth {
                let value = cube[scale][y * width + x];
                if !(value > threshold) {
                    continue;
                }
                let (s0, s1) = (scale.saturating_sub(1), (scale + 1).min(depth - 1));
                let is_max = (s0..=s1).all(|s| {
                    (y0..=y1).all(|ny| (x0..=x1).all(|nx| cube[s][ny * width + nx] <= value))
                });
                if is_max {
                    peaks.push(CubePeak { y, x, scale, value });
                }
            }
        }
    }

    // Stable: equal responses keep (y, x, scale) order.
    peaks.sort_by(|a, b| b.value.total_cmp(&a.value));
    peaks
}

/// Area of intersection of two disks at distance `d` with radii `r1`, `r2`,
/// relative to the area of the smaller disk.
fn disk_overlap(d: f64, r1: f64, r2: f64) -> f64 {
    let ratio1 = ((d * d + r1 * r1 - r2 * r2) / (2.0 * d * r1)).clamp(-1.0, 1.0);
    let ratio2 = ((d * d + r2 * r2 - r1 * r1) / (2.0 * d * r2)).clamp(-1.0, 1.0);
    let a = -d + r2 + r1;
    let b = d - r2 + r1;
    let c = d + r2 - r1;
    let e = d + r2 + r1;
    let area = r1 * r1 * ratio1.acos() + r2 * r2 * ratio2.acos() - 0.5 * (a * b * c * e).abs().sqrt();
    area / (PI * r1.min(r2).powi(2))
}

/// Overlap of two blobs treated as disks of radius `sqrt(2) * sigma`.
fn blob_overlap(a: &ScaleBlob, b: &ScaleBlob) -> f64 {
    if a.sigma == 0.0 || b.sigma == 0.0 {
        return 0.0;
    }
    let (max_sigma, r1, r2) = if a.sigma > b.sigma {
        (a.sigma, 1.0, b.sigma / a.sigma)
    } else {
        (b.sigma, a.sigma / b.sigma, 1.0)
    };
    let scale = max_sigma * SQRT_2;
    let d = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt() / scale;

    if d > r1 + r2 {
        return 0.0;
    }
    if d <= (r1 - r2).abs() {
        return 1.0;
    }
    disk_overlap(d, r1, r2)
}

/// Drops the smaller blob of every pair overlapping by more than `overlap`.
fn prune_blobs(mut blobs: Vec<ScaleBlob>, overlap: f64) -> Vec<ScaleBlob> {
    let Some(max_sigma) = blobs.iter().map(|b| b.sigma).reduce(f64::max) else {
        return blobs;
    };
    let reach = 2.0 * max_sigma * SQRT_2;

    for i in 0..blobs.len() {
        for j in i + 1..blobs.len() {
            let (a, b) = (blobs[i], blobs[j]);
            if ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt() > reach {
                continue;
            }
            if blob_overlap(&a, &b) > overlap {
                if a.sigma > b.sigma {
                    blobs[j].sigma = 0.0;
                } else {
                    blobs[i].sigma = 0.0;
                }
            }
        }
    }

    blobs.retain(|b| b.sigma > 0.0);
    blobs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothing_kernel_sums_to_one_and_second_derivative_to_zero() {
        let smooth = gaussian_kernel(3.0, kernel_radius(3.0), false);
        let second = gaussian_kernel(3.0, kernel_radius(3.0), true);
        assert_eq!(smooth.len(), 2 * 12 + 1);
        assert!((smooth.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!(second.iter().sum::<f32>().abs() < 1e-3);
        assert!(second[12] < 0.0);
    }

    #[test]
    fn disk_overlap_limits() {
        let same = ScaleBlob { y: 5.0, x: 5.0, sigma: 2.0 };
        assert_eq!(blob_overlap(&same, &same), 1.0);

        let far = ScaleBlob { y: 5.0, x: 50.0, sigma: 2.0 };
        assert_eq!(blob_overlap(&same, &far), 0.0);

        // Equal unit disks one radius apart share about 39% of their area.
        let near = ScaleBlob { y: 5.0, x: 5.0 + 2.0 * SQRT_2, sigma: 2.0 };
        let overlap = blob_overlap(&same, &near);
        assert!((overlap - 0.391).abs() < 1e-3, "overlap {overlap}");
    }

    #[test]
    fn prune_keeps_larger_of_overlapping_pair() {
        let small = ScaleBlob { y: 10.0, x: 10.0, sigma: 2.0 };
        let large = ScaleBlob { y: 10.0, x: 11.0, sigma: 4.0 };
        let lone = ScaleBlob { y: 80.0, x: 80.0, sigma: 2.0 };
        let kept = prune_blobs(vec![small, large, lone], 0.5);
        assert_eq!(kept, vec![large, lone]);
    }

    #[test]
    fn flat_image_has_no_blobs() {
        let image = PlateImage::from_pixels(24, 24, vec![0.7; 24 * 24]).expect("image");
        assert!(LogBlobDetector::default().detect_blobs(&image).is_empty());
    }
}
