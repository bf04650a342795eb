use bytesize::ByteSize;

use super::locate::Dish;

/// Inclusive-exclusive pixel window `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskBounds {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl MaskBounds {
    /// Grows the window by `margin` on every side, clipped to `width x height`.
    pub fn expand(&self, margin: usize, width: usize, height: usize) -> Self {
        Self {
            x0: self.x0.saturating_sub(margin),
            y0: self.y0.saturating_sub(margin),
            x1: (self.x1 + margin).min(width),
            y1: (self.y1 + margin).min(height),
        }
    }

    pub fn width(&self) -> usize {
        self.x1 - self.x0
    }

    pub fn height(&self) -> usize {
        self.y1 - self.y0
    }
}

/// Boolean occupancy grid of one dish, the same shape as the scan.
///
/// A pixel is set exactly when its distance to the dish center is strictly
/// less than the dish radius.
#[derive(Debug, Clone, PartialEq)]
pub struct DishMask {
    width: usize,
    height: usize,
    cells: Vec<bool>,
    bounds: Option<MaskBounds>,
}

impl DishMask {
    pub fn for_dish(dish: &Dish, width: usize, height: usize) -> Self {
        let mut cells = vec![false; width * height];
        let mut bounds: Option<MaskBounds> = None;

        // Pixels outside the circle's bounding square can never be inside.
        let x_start = (dish.center_x - dish.radius).floor().max(0.0) as usize;
        let y_start = (dish.center_y - dish.radius).floor().max(0.0) as usize;
        let x_end = ((dish.center_x + dish.radius).ceil().max(-1.0) + 1.0).min(width as f64) as usize;
        let y_end = ((dish.center_y + dish.radius).ceil().max(-1.0) + 1.0).min(height as f64) as usize;

        for y in y_start..y_end {
            for x in x_start..x_end {
                if dish.center_distance(x as f64, y as f64) < dish.radius {
                    cells[y * width + x] = true;
                    bounds = Some(match bounds {
                        None => MaskBounds {
                            x0: x,
                            y0: y,
                            x1: x + 1,
                            y1: y + 1,
                        },
                        Some(b) => MaskBounds {
                            x0: b.x0.min(x),
                            y0: b.y0.min(y),
                            x1: b.x1.max(x + 1),
                            y1: b.y1.max(y + 1),
                        },
                    });
                }
            }
        }

        Self {
            width,
            height,
            cells,
            bounds,
        }
    }

    /// `(width, height)`
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.width + x]
    }

    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Number of pixels inside the dish.
    pub fn area(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Tightest window holding every set pixel; `None` for an empty mask.
    pub fn bounds(&self) -> Option<MaskBounds> {
        self.bounds
    }
}

/// One full-size mask per dish, in dish order.
pub fn build_masks(dishes: &[Dish], width: usize, height: usize) -> Vec<DishMask> {
    let masks: Vec<DishMask> = dishes.iter().map(|d| DishMask::for_dish(d, width, height)).collect();
    log::debug!(
        "built {} dish masks of {}x{} ({})",
        masks.len(),
        width,
        height,
        ByteSize::b((masks.len() * width * height) as u64)
    );
    masks
}
