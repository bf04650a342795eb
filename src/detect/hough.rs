//! Circular Hough transform for a single expected radius.

use image::GrayImage;
use serde::Serialize;

/// A circle proposed by the circle search, with its accumulator score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CircleCandidate {
    pub score: f64,
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
}

/// Proposes circles of roughly `radius` in an edge map, strongest first.
pub trait CircleFinder {
    fn find_circles(&self, edges: &GrayImage, radius: f64, max_candidates: usize) -> Vec<CircleCandidate>;
}

/// Accumulator voting over a rasterised circle, followed by peak extraction.
#[derive(Debug, Clone, Copy)]
pub struct HoughCircles {
    /// Peaks below `threshold_ratio * max(accumulator)` are ignored.
    pub threshold_ratio: f64,
    /// Chebyshev distance suppressed around every accepted peak.
    pub min_peak_distance: usize,
}

impl Default for HoughCircles {
    fn default() -> Self {
        Self {
            threshold_ratio: 0.5,
            min_peak_distance: 1,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Peak {
    x: usize,
    y: usize,
    votes: u32,
}

impl CircleFinder for HoughCircles {
    fn find_circles(&self, edges: &GrayImage, radius: f64, max_candidates: usize) -> Vec<CircleCandidate> {
        let (width, height) = (edges.width() as usize, edges.height() as usize);
        if width == 0 || height == 0 || max_candidates == 0 {
            return Vec::new();
        }

        let offsets = circle_offsets(radius.round().max(0.0) as i32);
        let accumulator = accumulate(edges, &offsets);
        let Some(&max_votes) = accumulator.iter().max() else {
            return Vec::new();
        };
        if max_votes == 0 {
            return Vec::new();
        }

        let threshold = self.threshold_ratio * max_votes as f64;
        let mut peaks = local_peaks(&accumulator, width, height, self.min_peak_distance, threshold);
        // Stable: equal scores keep row-major scan order.
        peaks.sort_by(|a, b| b.votes.cmp(&a.votes));

        let reach = self.min_peak_distance as isize;
        let mut accepted: Vec<Peak> = Vec::new();
        for peak in peaks {
            if accepted.len() == max_candidates {
                break;
            }
            let suppressed = accepted.iter().any(|a| {
                (a.x as isize - peak.x as isize).abs() <= reach && (a.y as isize - peak.y as isize).abs() <= reach
            });
            if !suppressed {
                accepted.push(peak);
            }
        }

        let points = offsets.len() as f64;
        accepted
            .into_iter()
            .map(|p| CircleCandidate {
                score: p.votes as f64 / points,
                center_x: p.x as f64,
                center_y: p.y as f64,
                radius,
            })
            .collect()
    }
}

/// Every edge pixel votes for all centers lying `radius` away from it.
/// Votes for centers outside the image are dropped.
fn accumulate(edges: &GrayImage, offsets: &[(i32, i32)]) -> Vec<u32> {
    let width = edges.width() as i32;
    let height = edges.height() as i32;
    let mut accumulator = vec![0u32; (width * height) as usize];

    for (x, y, px) in edges.enumerate_pixels() {
        if px[0] == 0 {
            continue;
        }
        for &(dx, dy) in offsets {
            let cx = x as i32 + dx;
            let cy = y as i32 + dy;
            if cx < 0 || cy < 0 || cx >= width || cy >= height {
                continue;
            }
            accumulator[(cy * width + cx) as usize] += 1;
        }
    }

    accumulator
}

/// Cells above `threshold` that equal the maximum of their
/// `(2 * reach + 1)^2` neighbourhood, in row-major order.
fn local_peaks(accumulator: &[u32], width: usize, height: usize, reach: usize, threshold: f64) -> Vec<Peak> {
    let mut peaks = Vec::new();
    for y in 0..height {
        let y0 = y.saturating_sub(reach);
        let y1 = (y + reach).min(height - 1);
        for x in 0..width {
            let votes = accumulator[y * width + x];
            if votes as f64 <= threshold {
                continue;
            }
            let x0 = x.saturating_sub(reach);
            let x1 = (x + reach).min(width - 1);
            let is_max = (y0..=y1).all(|ny| (x0..=x1).all(|nx| accumulator[ny * width + nx] <= votes));
            if is_max {
                peaks.push(Peak { x, y, votes });
            }
        }
    }
    peaks
}

/// Midpoint (Bresenham) circle of integer radius centred on the origin,
/// without repeated points.
fn circle_offsets(radius: i32) -> Vec<(i32, i32)> {
    let mut points = Vec::new();
    let mut x = 0;
    let mut y = radius;
    let mut d = 3 - 2 * radius;

    while y >= x {
        points.extend_from_slice(&[
            (x, y),
            (y, x),
            (-x, y),
            (-y, x),
            (x, -y),
            (y, -x),
            (-x, -y),
            (-y, -x),
        ]);
        if d < 0 {
            d += 4 * x + 6;
        } else {
            d += 4 * (x - y) + 10;
            y -= 1;
        }
        x += 1;
    }

    points.sort_unstable();
    points.dedup();
    points
}
