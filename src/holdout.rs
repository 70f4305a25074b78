use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Pcg64;

use crate::ratings::{Rating, RatingMatrix};

/// An observed rating hidden from the training matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeldOutRating {
    pub user_idx: usize,
    pub item_idx: usize,
    pub rating: Rating,
}

/// Hides `round(fraction * observed)` randomly chosen observed ratings.
///
/// Returns the training matrix with those cells masked and the hidden ratings
/// in row-major order. The same seed always selects the same cells.
pub fn split(matrix: &RatingMatrix, fraction: f64, seed: u64) -> (RatingMatrix, Vec<HeldOutRating>) {
    let mut observed: Vec<HeldOutRating> = (0..matrix.qty_users())
        .flat_map(|user_idx| {
            matrix
                .user_row(user_idx)
                .iter()
                .enumerate()
                .filter_map(move |(item_idx, rating)| {
                    rating.map(|rating| HeldOutRating {
                        user_idx,
                        item_idx,
                        rating,
                    })
                })
        })
        .collect();

    let qty_test = ((observed.len() as f64) * fraction.clamp(0.0, 1.0)).round() as usize;
    let mut rng = Pcg64::seed_from_u64(seed);
    observed.shuffle(&mut rng);
    observed.truncate(qty_test);
    observed.sort_unstable_by_key(|held_out| (held_out.user_idx, held_out.item_idx));

    let cells: Vec<(usize, usize)> = observed
        .iter()
        .map(|held_out| (held_out.user_idx, held_out.item_idx))
        .collect();
    tracing::debug!(
        qty_observed = matrix.qty_observed(),
        qty_held_out = cells.len(),
        seed,
        "split ratings"
    );

    (matrix.with_masked(&cells), observed)
}
