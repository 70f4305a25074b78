use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::itemknn::prediction::Prediction;

pub mod prediction;
pub mod similarity;

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct ItemScore {
    pub item_idx: usize,
    pub score: f64,
}

impl ItemScore {
    pub fn new(item_idx: usize, score: f64) -> Self {
        ItemScore { item_idx, score }
    }
}

impl Eq for ItemScore {}

impl Ord for ItemScore {
    fn cmp(&self, other: &Self) -> Ordering {
        // reverse order by score, ties go to the lower item index
        match self.score.partial_cmp(&other.score) {
            Some(Ordering::Less) => Ordering::Greater,
            Some(Ordering::Greater) => Ordering::Less,
            _ => self.item_idx.cmp(&other.item_idx),
        }
    }
}

impl PartialOrd for ItemScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Picks the `how_many` best estimated items from one row of predictions.
///
/// Observed ratings and unpredictable cells are never recommended. The result
/// is ordered by descending score.
pub fn top_n(predictions: &[Prediction], how_many: usize) -> Vec<ItemScore> {
    if how_many == 0 {
        return Vec::new();
    }

    // The heap top is the worst of the current candidates.
    let mut top_items: BinaryHeap<ItemScore> = BinaryHeap::with_capacity(how_many);
    for (item_idx, prediction) in predictions.iter().enumerate() {
        let score = match prediction {
            Prediction::Estimated(score) => *score,
            _ => continue,
        };
        let scored_item = ItemScore::new(item_idx, score);

        if top_items.len() < how_many {
            top_items.push(scored_item);
        } else if let Some(mut bottom) = top_items.peek_mut() {
            if scored_item < *bottom {
                *bottom = scored_item;
            }
        }
    }

    top_items.into_sorted_vec()
}

#[cfg(test)]
mod itemscore_test {
    use super::*;

    #[test]
    fn should_sort_best_score_first() {
        let mut scored = vec![
            ItemScore::new(3, 1.0),
            ItemScore::new(2, 4.5),
            ItemScore::new(0, 3.0),
            ItemScore::new(1, 4.5),
        ];
        scored.sort();

        let order: Vec<usize> = scored.iter().map(|scored| scored.item_idx).collect();
        assert_eq!(vec![1, 2, 0, 3], order);
        assert!(ItemScore::new(5, 2.0) < ItemScore::new(4, 1.0));
        assert!(ItemScore::new(4, 2.0) < ItemScore::new(5, 2.0));
    }

    #[test]
    fn should_pick_best_estimates_only() {
        let predictions = vec![
            Prediction::Estimated(2.5),
            Prediction::Observed(5.0),
            Prediction::Unpredictable,
            Prediction::Estimated(4.1),
            Prediction::Estimated(3.7),
        ];

        let recommended: Vec<usize> = top_n(&predictions, 2)
            .iter()
            .map(|scored| scored.item_idx)
            .collect();
        assert_eq!(vec![3, 4], recommended);

        assert_eq!(3, top_n(&predictions, 10).len());
        assert!(top_n(&predictions, 0).is_empty());
    }

    #[test]
    fn ties_keep_item_order() {
        let predictions = vec![
            Prediction::Estimated(4.0),
            Prediction::Estimated(4.0),
            Prediction::Estimated(4.0),
        ];

        let recommended: Vec<usize> = top_n(&predictions, 2)
            .iter()
            .map(|scored| scored.item_idx)
            .collect();
        assert_eq!(vec![0, 1], recommended);
    }
}
