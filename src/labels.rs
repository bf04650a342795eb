//! Display labels for dishes.

use palette::{Srgb, named};

const DISH_PALETTE: [(&str, Srgb<u8>); 6] = [
    ("red", named::RED),
    ("blue", named::BLUE),
    ("green", named::GREEN),
    ("magenta", named::MAGENTA),
    ("cyan", named::CYAN),
    ("yellow", named::YELLOW),
];

/// Name and drawing color used for a dish in reports and overlays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DishLabel {
    pub name: &'static str,
    pub color: Srgb<u8>,
}

/// Number of distinct labels before they repeat.
pub const PALETTE_SIZE: usize = DISH_PALETTE.len();

/// Label of the dish at `index`; labels cycle once the palette is exhausted.
pub fn dish_label(index: usize) -> DishLabel {
    let (name, color) = DISH_PALETTE[index % PALETTE_SIZE];
    DishLabel { name, color }
}
