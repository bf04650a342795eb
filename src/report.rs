//! Per-dish results in a form suitable for printing and serialisation.

use serde::Serialize;

use crate::labels::dish_label;
use crate::plates::{Blob, Dish};

/// Results for one dish.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlateSummary {
    pub index: usize,
    pub label: &'static str,
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    pub colony_count: usize,
    pub colonies: Vec<Blob>,
}

/// Results for a whole scan, dishes in detection order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountReport {
    pub plates: Vec<PlateSummary>,
}

impl CountReport {
    /// Pairs dish `i` with colony list `i`.
    pub fn new(dishes: &[Dish], colonies: &[Vec<Blob>]) -> Self {
        let plates = dishes
            .iter()
            .zip(colonies)
            .enumerate()
            .map(|(index, (dish, blobs))| PlateSummary {
                index,
                label: dish_label(index).name,
                center_x: dish.center_x,
                center_y: dish.center_y,
                radius: dish.radius,
                colony_count: blobs.len(),
                colonies: blobs.clone(),
            })
            .collect();
        Self { plates }
    }

    pub fn total_colonies(&self) -> usize {
        self.plates.iter().map(|p| p.colony_count).sum()
    }

    /// `"<N> Plates Detected"` followed by one line per dish.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("{} Plates Detected", self.plates.len())];
        lines.extend(
            self.plates
                .iter()
                .map(|p| format!("{} Colonies Detected. Shown in {}", p.colony_count, p.label)),
        );
        lines
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
