use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use crate::error::{CfError, Result};
use crate::itemknn::similarity::{round2, SimilarityMatrix};
use crate::ratings::{ItemId, Rating, RatingMatrix, UserId};

/// Outcome of filling one cell of the rating matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Prediction {
    /// The user rated the item; the rating is passed through untouched.
    Observed(Rating),
    /// Similarity-weighted estimate, rounded to two decimals.
    Estimated(Rating),
    /// The user rated nothing with a non-zero similarity to the item.
    Unpredictable,
}

impl Prediction {
    pub fn value(&self) -> Option<Rating> {
        match self {
            Prediction::Observed(rating) | Prediction::Estimated(rating) => Some(*rating),
            Prediction::Unpredictable => None,
        }
    }

    pub fn is_estimate(&self) -> bool {
        matches!(self, Prediction::Estimated(_))
    }
}

/// Predicts the rating of `user_idx` for `item_idx`.
///
/// Observed ratings are returned as is. Otherwise every other item the user
/// rated contributes its rating weighted by its similarity to `item_idx`, and
/// the sum is normalised by the total absolute weight.
pub fn predict(
    user_idx: usize,
    item_idx: usize,
    matrix: &RatingMatrix,
    similarities: &SimilarityMatrix,
) -> Prediction {
    if let Some(rating) = matrix.rating(user_idx, item_idx) {
        return Prediction::Observed(rating);
    }

    let similar_items = similarities.row(item_idx);
    let mut weighted_sum = 0.0;
    let mut sum_of_weights = 0.0;
    for (other_idx, rating) in matrix.user_row(user_idx).iter().enumerate() {
        if other_idx == item_idx {
            continue;
        }
        if let Some(rating) = rating {
            let similarity = similar_items[other_idx];
            weighted_sum += similarity * rating;
            sum_of_weights += similarity.abs();
        }
    }

    if sum_of_weights > 0.0 {
        Prediction::Estimated(round2(weighted_sum / sum_of_weights))
    } else {
        Prediction::Unpredictable
    }
}

/// Like [`predict`], addressed by user and item id.
pub fn predict_for(
    user: &str,
    item: &str,
    matrix: &RatingMatrix,
    similarities: &SimilarityMatrix,
) -> Result<Prediction> {
    ensure_same_items(matrix, similarities)?;
    let user_idx = matrix.user_index(user)?;
    let item_idx = matrix.item_index(item)?;
    Ok(predict(user_idx, item_idx, matrix, similarities))
}

fn ensure_same_items(matrix: &RatingMatrix, similarities: &SimilarityMatrix) -> Result<()> {
    if matrix.items() != similarities.items() {
        return Err(CfError::InvalidMatrix(format!(
            "similarity matrix covers {} items that do not match the {} rated items",
            similarities.items().len(),
            matrix.qty_items()
        )));
    }
    Ok(())
}

/// The rating matrix with every cell filled by [`predict`].
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedMatrix {
    users: Vec<UserId>,
    items: Vec<ItemId>,
    cells: Vec<Vec<Prediction>>,
}

impl PredictedMatrix {
    pub fn build(matrix: &RatingMatrix, similarities: &SimilarityMatrix) -> Result<Self> {
        ensure_same_items(matrix, similarities)?;
        let start_time = Instant::now();

        let cells: Vec<Vec<Prediction>> = (0..matrix.qty_users())
            .into_par_iter()
            .map(|user_idx| {
                (0..matrix.qty_items())
                    .map(|item_idx| predict(user_idx, item_idx, matrix, similarities))
                    .collect()
            })
            .collect();

        let qty_unpredictable = cells
            .iter()
            .flatten()
            .filter(|cell| **cell == Prediction::Unpredictable)
            .count();
        tracing::debug!(
            qty_users = matrix.qty_users(),
            qty_items = matrix.qty_items(),
            qty_unpredictable,
            micros = start_time.elapsed().as_micros() as u64,
            "built predicted matrix"
        );

        Ok(PredictedMatrix {
            users: matrix.users().to_vec(),
            items: matrix.items().to_vec(),
            cells,
        })
    }

    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn get(&self, user_idx: usize, item_idx: usize) -> Prediction {
        self.cells[user_idx][item_idx]
    }

    pub fn user_row(&self, user_idx: usize) -> &[Prediction] {
        &self.cells[user_idx]
    }
}

#[cfg(test)]
mod prediction_test {
    use float_cmp::approx_eq;

    use super::*;
    use crate::itemknn::similarity::Metric;
    use crate::ratings::RatingBounds;

    fn matrix(rows: Vec<Vec<Option<f64>>>) -> RatingMatrix {
        let users = (1..=rows.len()).map(|i| format!("U{}", i)).collect();
        let items = (1..=rows[0].len()).map(|i| format!("M{}", i)).collect();
        RatingMatrix::new(users, items, rows, RatingBounds::default()).unwrap()
    }

    #[test]
    fn should_follow_hand_trace() {
        let ratings = matrix(vec![
            vec![Some(5.0), None],
            vec![Some(4.0), Some(4.0)],
            vec![None, Some(5.0)],
        ]);
        let similarities = SimilarityMatrix::build(&ratings, Metric::Cosine);

        // only M1 contributes: 0.39 * 5 / 0.39
        let prediction = predict(0, 1, &ratings, &similarities);
        assert!(prediction.is_estimate());
        assert!(approx_eq!(f64, 5.0, prediction.value().unwrap(), epsilon = 1e-9));

        let prediction = predict_for("U3", "M1", &ratings, &similarities).unwrap();
        assert!(approx_eq!(f64, 5.0, prediction.value().unwrap(), epsilon = 1e-9));
    }

    #[test]
    fn should_weight_by_similarity() {
        let ratings = matrix(vec![
            vec![Some(5.0), Some(5.0), Some(1.0)],
            vec![Some(4.0), Some(4.0), Some(2.0)],
            vec![None, Some(2.0), Some(4.0)],
        ]);
        let similarities = SimilarityMatrix::build(&ratings, Metric::Cosine);
        let sim_12 = similarities.get(0, 1);
        let sim_13 = similarities.get(0, 2);
        let expected = round2((sim_12 * 2.0 + sim_13 * 4.0) / (sim_12.abs() + sim_13.abs()));

        assert_eq!(Prediction::Estimated(expected), predict(2, 0, &ratings, &similarities));
    }

    #[test]
    fn should_round_estimate_ties_to_even() {
        let ratings = matrix(vec![
            vec![Some(2.0), None, Some(4.0)],
            vec![Some(5.0), None, None],
            vec![Some(2.0), Some(5.0), Some(2.0)],
        ]);
        let similarities = SimilarityMatrix::build(&ratings, Metric::Cosine);
        assert_eq!(&[0.35, 1.0, 0.45], similarities.row(1));

        // (0.35 * 2 + 0.45 * 4) / 0.8 lands exactly on 3.125
        assert_eq!(Prediction::Estimated(3.12), predict(0, 1, &ratings, &similarities));
    }

    #[test]
    fn negative_similarity_pulls_estimate_down() {
        let ratings = matrix(vec![
            vec![Some(1.0), Some(5.0), Some(5.0)],
            vec![Some(5.0), Some(1.0), Some(1.0)],
            vec![Some(4.0), Some(2.0), None],
        ]);
        let similarities = SimilarityMatrix::build(&ratings, Metric::Pearson);
        assert_eq!(-1.0, similarities.get(2, 0));
        assert_eq!(1.0, similarities.get(2, 1));

        // (-1 * 4 + 1 * 2) / (|-1| + |1|)
        assert_eq!(Prediction::Estimated(-1.0), predict(2, 2, &ratings, &similarities));
    }

    #[test]
    fn should_pass_observed_ratings_through() {
        let ratings = matrix(vec![vec![Some(3.33), None], vec![Some(1.0), Some(2.0)]]);
        let similarities = SimilarityMatrix::build(&ratings, Metric::Pearson);
        let predicted = PredictedMatrix::build(&ratings, &similarities).unwrap();

        for user_idx in 0..2 {
            for item_idx in 0..2 {
                if let Some(rating) = ratings.rating(user_idx, item_idx) {
                    assert_eq!(Prediction::Observed(rating), predicted.get(user_idx, item_idx));
                }
            }
        }
    }

    #[test]
    fn user_without_ratings_is_unpredictable() {
        let ratings = matrix(vec![vec![Some(5.0), Some(4.0)], vec![None, None]]);
        let similarities = SimilarityMatrix::build(&ratings, Metric::Cosine);
        let predicted = PredictedMatrix::build(&ratings, &similarities).unwrap();

        assert!(predicted
            .user_row(1)
            .iter()
            .all(|cell| *cell == Prediction::Unpredictable));
    }

    #[test]
    fn zero_similarity_is_unpredictable_not_zero() {
        // pearson over a single co-rating is zero
        let ratings = matrix(vec![vec![Some(5.0), None], vec![Some(4.0), Some(4.0)]]);
        let similarities = SimilarityMatrix::build(&ratings, Metric::Pearson);

        assert_eq!(Prediction::Unpredictable, predict(0, 1, &ratings, &similarities));
        assert_eq!(None, Prediction::Unpredictable.value());
    }

    #[test]
    fn should_be_idempotent() {
        let ratings = matrix(vec![
            vec![Some(5.0), None, Some(2.0)],
            vec![None, Some(3.0), Some(1.0)],
            vec![Some(4.0), Some(4.0), None],
        ]);
        let similarities = SimilarityMatrix::build(&ratings, Metric::Pearson);
        let first = PredictedMatrix::build(&ratings, &similarities).unwrap();
        let second = PredictedMatrix::build(
            &ratings,
            &SimilarityMatrix::build(&ratings, Metric::Pearson),
        )
        .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn should_reject_mismatched_similarity_matrix() {
        let ratings = matrix(vec![vec![Some(5.0), None]]);
        let other = matrix(vec![vec![Some(5.0), None, Some(1.0)]]);
        let similarities = SimilarityMatrix::build(&other, Metric::Cosine);

        assert!(matches!(
            PredictedMatrix::build(&ratings, &similarities),
            Err(CfError::InvalidMatrix(_))
        ));
    }
}
