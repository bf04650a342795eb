//! Image-analysis services the counting pipeline delegates to.
//!
//! Each service sits behind a trait so the pipeline can be driven with
//! alternative implementations (or canned results in tests).

pub mod blob_log;
pub mod edges;
pub mod hough;

pub use blob_log::{BlobDetector, LogBlobDetector, ScaleBlob};
pub use edges::{CannyEdges, EdgeDetector};
pub use hough::{CircleCandidate, CircleFinder, HoughCircles};
