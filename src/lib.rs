//! Locates circular specimen dishes on a scanned image and counts the
//! colonies inside each one.
//!
//! ```rust,ignore
//! use colony_counter::{ColonyCounter, CounterConfig, PlateImage};
//!
//! let image = PlateImage::open("plates.png")?;
//! let mut counter = ColonyCounter::new(image, CounterConfig::default())?;
//! for line in counter.report()?.summary_lines() {
//!     println!("{line}");
//! }
//! ```

pub mod config;
pub mod counter;
pub mod detect;
pub mod error;
pub mod labels;
pub mod overlay;
pub mod plate_image;
pub mod plates;
pub mod report;
pub mod synthetic;

pub use config::CounterConfig;
pub use counter::{ColonyCounter, PipelineStage, Plates};
pub use error::CounterError;
pub use plate_image::PlateImage;
pub use plates::{Blob, Dish, DishMask};
pub use report::{CountReport, PlateSummary};
