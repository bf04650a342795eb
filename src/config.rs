//! Tunable parameters for dish location and colony detection.

use serde::{Deserialize, Serialize};

use crate::error::CounterError;

const EXPECTED_DISH_RADIUS: f64 = 480.0;
const CANDIDATE_CAP: usize = 12;
const DEDUP_DISTANCE: f64 = 490.0;
const CANNY_LOW: f32 = 25.0;
const CANNY_HIGH: f32 = 50.0;
const PEAK_THRESHOLD_RATIO: f64 = 0.5;
const MIN_PEAK_DISTANCE: usize = 1;
const MIN_SIGMA: f64 = 2.0;
const MAX_SIGMA: f64 = 15.0;
const NUM_SIGMA: usize = 10;
const DETECTION_THRESHOLD: f32 = 0.1;
const BLOB_OVERLAP: f64 = 0.5;
const RIM_WARNING_LEVEL: f32 = 0.2;
const RIM_BAND_WIDTH: f64 = 5.0;

/// Configuration for the whole counting pipeline.
///
/// The defaults reproduce the reference setup: six-dish scans at a resolution
/// where a dish is about 480 pixels in radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterConfig {
    /// Radius prior used by the circle search.
    pub expected_dish_radius: f64,
    /// Maximum number of circle candidates requested from the circle search.
    pub candidate_cap: usize,
    /// Candidates whose centers are closer than this to an accepted dish are duplicates.
    pub dedup_distance: f64,
    pub canny_low: f32,
    pub canny_high: f32,
    /// Accumulator peaks below `ratio * max` are ignored.
    pub peak_threshold_ratio: f64,
    /// Chebyshev radius suppressed around each accepted accumulator peak.
    pub min_peak_distance: usize,
    pub min_sigma: f64,
    pub max_sigma: f64,
    pub num_sigma: usize,
    /// Minimum scale-normalised response for a blob to be reported.
    pub detection_threshold: f32,
    /// Blobs overlapping more than this fraction are merged into the larger one.
    pub blob_overlap: f64,
    /// Mean intensity of a dish rim band above which a warning is logged.
    pub rim_warning_level: f32,
    /// Width in pixels of the band just inside each dish edge measured for the rim level.
    pub rim_band_width: f64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            expected_dish_radius: EXPECTED_DISH_RADIUS,
            candidate_cap: CANDIDATE_CAP,
            dedup_distance: DEDUP_DISTANCE,
            canny_low: CANNY_LOW,
            canny_high: CANNY_HIGH,
            peak_threshold_ratio: PEAK_THRESHOLD_RATIO,
            min_peak_distance: MIN_PEAK_DISTANCE,
            min_sigma: MIN_SIGMA,
            max_sigma: MAX_SIGMA,
            num_sigma: NUM_SIGMA,
            detection_threshold: DETECTION_THRESHOLD,
            blob_overlap: BLOB_OVERLAP,
            rim_warning_level: RIM_WARNING_LEVEL,
            rim_band_width: RIM_BAND_WIDTH,
        }
    }
}

impl CounterConfig {
    /// Rejects parameter combinations the detectors cannot work with.
    pub fn validate(&self) -> Result<(), CounterError> {
        let invalid = |msg: String| Err(CounterError::InvalidConfig(msg));

        if !(self.expected_dish_radius >= 1.0) {
            return invalid(format!(
                "expected_dish_radius must be at least 1, got {}",
                self.expected_dish_radius
            ));
        }
        if self.candidate_cap == 0 {
            return invalid("candidate_cap must be positive".to_string());
        }
        if !(self.dedup_distance > 0.0) {
            return invalid(format!(
                "dedup_distance must be positive, got {}",
                self.dedup_distance
            ));
        }
        if !(self.canny_low >= 0.0 && self.canny_low <= self.canny_high) {
            return invalid(format!(
                "canny thresholds must satisfy 0 <= low <= high, got {} / {}",
                self.canny_low, self.canny_high
            ));
        }
        if !(self.peak_threshold_ratio >= 0.0 && self.peak_threshold_ratio <= 1.0) {
            return invalid(format!(
                "peak_threshold_ratio must lie in [0, 1], got {}",
                self.peak_threshold_ratio
            ));
        }
        if !(self.min_sigma > 0.0 && self.min_sigma <= self.max_sigma) {
            return invalid(format!(
                "sigma range must satisfy 0 < min <= max, got {}..{}",
                self.min_sigma, self.max_sigma
            ));
        }
        if self.num_sigma == 0 {
            return invalid("num_sigma must be positive".to_string());
        }
        if !(self.blob_overlap >= 0.0 && self.blob_overlap <= 1.0) {
            return invalid(format!(
                "blob_overlap must lie in [0, 1], got {}",
                self.blob_overlap
            ));
        }
        if !(self.rim_band_width > 0.0) {
            return invalid(format!(
                "rim_band_width must be positive, got {}",
                self.rim_band_width
            ));
        }
        Ok(())
    }
}
