//! Weighted random choice by cumulative subtraction.
//!
//! Shared by chef rule selection and disaster selection. A roll `r` is drawn
//! uniformly in `[0, total)`; each candidate's weight is subtracted in order
//! and the first candidate that brings `r` to `<= 0` is chosen.

use rand::Rng;

/// Pick from `(item, weight)` pairs using a caller-supplied roll in `[0, total)`.
///
/// Returns `None` for an empty list. If rounding leaves `r` positive after the
/// last candidate, the last positive-weight candidate is returned.
pub fn pick_with_roll<T: Copy>(candidates: &[(T, f64)], roll: f64) -> Option<T> {
    let mut remaining = roll;
    let mut last = None;
    for &(item, weight) in candidates {
        if weight <= 0.0 {
            continue;
        }
        remaining -= weight;
        last = Some(item);
        if remaining <= 0.0 {
            return Some(item);
        }
    }
    last
}

pub fn total_weight<T>(candidates: &[(T, f64)]) -> f64 {
    candidates.iter().map(|(_, w)| w.max(0.0)).sum()
}

/// Draw a roll from `rng` and pick from `candidates`.
pub fn pick<T: Copy, R: Rng + ?Sized>(candidates: &[(T, f64)], rng: &mut R) -> Option<T> {
    let total = total_weight(candidates);
    if total <= 0.0 {
        return None;
    }
    let roll = rng.gen::<f64>() * total;
    pick_with_roll(candidates, roll)
}
