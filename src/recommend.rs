use std::time::Instant;

use serde::Serialize;

use crate::error::Result;
use crate::itemknn;
use crate::itemknn::prediction::{PredictedMatrix, Prediction};
use crate::itemknn::similarity::{Metric, SimilarityMatrix};
use crate::ratings::{ItemId, Rating, RatingMatrix, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Yes,
    /// A numeric prediction below the threshold.
    No,
    /// No prediction could be made, so nothing is recommended.
    Unknown,
}

impl Verdict {
    pub fn is_recommended(&self) -> bool {
        *self == Verdict::Yes
    }
}

/// Thresholds a predicted rating into a recommendation.
///
/// One uniform policy: `Yes` iff the prediction is at least `threshold`,
/// whether or not the user already rated the item. `original` is the observed
/// rating of the cell, which the prediction always equals when present.
pub fn decide(original: Option<Rating>, predicted: Option<Rating>, threshold: Rating) -> Verdict {
    debug_assert!(original.is_none() || original == predicted);
    match predicted {
        Some(predicted) if predicted >= threshold => Verdict::Yes,
        Some(_) => Verdict::No,
        None => Verdict::Unknown,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub original_rating: Option<Rating>,
    pub predicted_rating: Option<Rating>,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredItem {
    pub item_id: ItemId,
    pub score: f64,
}

/// Similarity and prediction tables computed once from one rating snapshot.
pub struct Recommender {
    ratings: RatingMatrix,
    similarities: SimilarityMatrix,
    predictions: PredictedMatrix,
    threshold: Rating,
}

impl Recommender {
    pub fn new(ratings: RatingMatrix, metric: Metric, threshold: Rating) -> Result<Self> {
        let start_time = Instant::now();
        let similarities = SimilarityMatrix::build(&ratings, metric);
        let predictions = PredictedMatrix::build(&ratings, &similarities)?;
        tracing::info!(
            metric = metric.name(),
            qty_users = ratings.qty_users(),
            qty_items = ratings.qty_items(),
            qty_observed = ratings.qty_observed(),
            millis = start_time.elapsed().as_millis() as u64,
            "recommender ready"
        );

        Ok(Recommender {
            ratings,
            similarities,
            predictions,
            threshold,
        })
    }

    pub fn ratings(&self) -> &RatingMatrix {
        &self.ratings
    }

    pub fn similarities(&self) -> &SimilarityMatrix {
        &self.similarities
    }

    pub fn predictions(&self) -> &PredictedMatrix {
        &self.predictions
    }

    pub fn threshold(&self) -> Rating {
        self.threshold
    }

    pub fn recommend(&self, user: &str, item: &str) -> Result<RecommendationResult> {
        let user_idx = self.ratings.user_index(user)?;
        let item_idx = self.ratings.item_index(item)?;

        let original_rating = self.ratings.rating(user_idx, item_idx);
        let prediction: Prediction = self.predictions.get(user_idx, item_idx);
        let predicted_rating = prediction.value();

        Ok(RecommendationResult {
            user_id: user.to_string(),
            item_id: item.to_string(),
            original_rating,
            predicted_rating,
            verdict: decide(original_rating, predicted_rating, self.threshold),
        })
    }

    /// The `how_many` unrated items with the highest estimates for `user`.
    pub fn top_n(&self, user: &str, how_many: usize) -> Result<Vec<ScoredItem>> {
        let user_idx = self.ratings.user_index(user)?;
        let items = self.ratings.items();
        Ok(itemknn::top_n(self.predictions.user_row(user_idx), how_many)
            .into_iter()
            .map(|scored| ScoredItem {
                item_id: items[scored.item_idx].clone(),
                score: scored.score,
            })
            .collect())
    }
}

#[cfg(test)]
mod recommend_test {
    use super::*;
    use crate::error::CfError;
    use crate::ratings::RatingBounds;

    fn recommender(threshold: Rating) -> Recommender {
        let ratings = RatingMatrix::new(
            vec!["U1".into(), "U2".into(), "U3".into(), "U4".into()],
            vec!["M1".into(), "M2".into(), "M3".into()],
            vec![
                vec![Some(5.0), None, None],
                vec![Some(4.0), Some(4.0), Some(1.0)],
                vec![None, Some(5.0), Some(2.0)],
                vec![None, None, None],
            ],
            RatingBounds::default(),
        )
        .unwrap();
        Recommender::new(ratings, Metric::Cosine, threshold).unwrap()
    }

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(Verdict::Yes, decide(None, Some(3.0), 3.0));
        assert_eq!(Verdict::No, decide(None, Some(2.0), 3.0));
        assert_eq!(Verdict::No, decide(None, Some(2.99), 3.0));
        assert_eq!(Verdict::Yes, decide(Some(4.0), Some(4.0), 3.0));
        assert_eq!(Verdict::No, decide(Some(1.0), Some(1.0), 3.0));
    }

    #[test]
    fn unpredictable_is_unknown_not_no() {
        let verdict = decide(None, None, 3.0);
        assert_eq!(Verdict::Unknown, verdict);
        assert!(!verdict.is_recommended());
    }

    #[test]
    fn should_recommend_estimated_item() {
        let recommender = recommender(3.0);
        let result = recommender.recommend("U1", "M2").unwrap();

        assert_eq!(None, result.original_rating);
        assert!(result.predicted_rating.is_some());
        assert_eq!(Verdict::Yes, result.verdict);
    }

    #[test]
    fn should_pass_observed_rating_into_result() {
        let recommender = recommender(3.0);
        let result = recommender.recommend("U2", "M3").unwrap();

        assert_eq!(Some(1.0), result.original_rating);
        assert_eq!(Some(1.0), result.predicted_rating);
        assert_eq!(Verdict::No, result.verdict);
    }

    #[test]
    fn user_without_ratings_gets_unknown() {
        let recommender = recommender(3.0);
        let result = recommender.recommend("U4", "M1").unwrap();

        assert_eq!(None, result.predicted_rating);
        assert_eq!(Verdict::Unknown, result.verdict);
        assert!(recommender.top_n("U4", 3).unwrap().is_empty());
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let recommender = recommender(3.0);
        assert!(matches!(
            recommender.recommend("U9", "M1"),
            Err(CfError::NotFound { .. })
        ));
        assert!(matches!(
            recommender.recommend("U1", "M9"),
            Err(CfError::NotFound { .. })
        ));
        assert!(recommender.top_n("U9", 1).is_err());
    }

    #[test]
    fn top_n_skips_rated_items() {
        let recommender = recommender(3.0);
        let top = recommender.top_n("U1", 5).unwrap();

        assert_eq!(2, top.len());
        assert!(top.iter().all(|scored| scored.item_id != "M1"));
        assert!(top[0].score >= top[1].score);
    }
}
