use serde::{Deserialize, Serialize};

use crate::detect::CircleCandidate;
use crate::error::CounterError;

/// One physical dish located on the scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dish {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
}

impl Dish {
    pub fn center_distance(&self, x: f64, y: f64) -> f64 {
        ((x - self.center_x).powi(2) + (y - self.center_y).powi(2)).sqrt()
    }
}

impl From<&CircleCandidate> for Dish {
    fn from(c: &CircleCandidate) -> Self {
        Self {
            center_x: c.center_x,
            center_y: c.center_y,
            radius: c.radius,
        }
    }
}

/// Collapses circle candidates into distinct dishes.
///
/// Candidates are ranked by descending score first (ties keep their input
/// order). The best candidate is always accepted; every later one is accepted
/// only if its center is at least `dedup_distance` away from all dishes
/// accepted so far, otherwise it is a duplicate of a stronger detection.
pub fn locate_dishes(candidates: &[CircleCandidate], dedup_distance: f64) -> Result<Vec<Dish>, CounterError> {
    let mut ranked = candidates.to_vec();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    let Some((seed, rest)) = ranked.split_first() else {
        return Err(CounterError::EmptyCandidates);
    };

    let mut dishes = vec![Dish::from(seed)];
    for candidate in rest {
        let nearest = dishes
            .iter()
            .map(|d| d.center_distance(candidate.center_x, candidate.center_y))
            .fold(f64::INFINITY, f64::min);
        if nearest < dedup_distance {
            log::debug!(
                "dropping duplicate circle at ({:.1}, {:.1}) score {:.3}, {:.1} px from an accepted dish",
                candidate.center_x,
                candidate.center_y,
                candidate.score,
                nearest
            );
            continue;
        }
        dishes.push(Dish::from(candidate));
    }

    Ok(dishes)
}
