//! Dish location, per-dish masks and per-dish colony detection.

pub mod colonies;
pub mod locate;
pub mod mask;

pub use colonies::{Blob, detect_colonies, rim_level, sigma_to_radius, trim_to_mask};
pub use locate::{Dish, locate_dishes};
pub use mask::{DishMask, MaskBounds, build_masks};
