use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use hashbrown::HashMap;
use rayon::prelude::*;

use crate::error::{CfError, Result};
use crate::ratings::{ItemId, Rating, RatingMatrix};

/// Item-item similarity between two rating vectors that share the user ordering.
///
/// Implementations must be total: degenerate input (no overlap, zero norm,
/// zero variance) yields `0.0`, never NaN or a panic.
pub trait SimilarityMeasure {
    fn similarity(&self, ratings_a: &[Option<Rating>], ratings_b: &[Option<Rating>]) -> f64;
}

/// Dot product over co-rated users, each norm over that item's own ratings.
pub struct Cosine;

impl SimilarityMeasure for Cosine {
    fn similarity(&self, ratings_a: &[Option<Rating>], ratings_b: &[Option<Rating>]) -> f64 {
        let dot_product: f64 = ratings_a
            .iter()
            .zip(ratings_b.iter())
            .filter_map(|pair| match pair {
                (Some(a), Some(b)) => Some(a * b),
                _ => None,
            })
            .sum();
        let norm_a = ratings_a.iter().flatten().map(|a| a * a).sum::<f64>().sqrt();
        let norm_b = ratings_b.iter().flatten().map(|b| b * b).sum::<f64>().sqrt();

        let denominator = norm_a * norm_b;
        if denominator != 0.0 {
            dot_product / denominator
        } else {
            0.0
        }
    }
}

/// Correlation restricted to the users that rated both items.
pub struct Pearson;

impl SimilarityMeasure for Pearson {
    fn similarity(&self, ratings_a: &[Option<Rating>], ratings_b: &[Option<Rating>]) -> f64 {
        let common_ratings: Vec<(f64, f64)> = ratings_a
            .iter()
            .zip(ratings_b.iter())
            .filter_map(|pair| match pair {
                (Some(a), Some(b)) => Some((*a, *b)),
                _ => None,
            })
            .collect();
        if common_ratings.is_empty() {
            return 0.0;
        }

        let qty = common_ratings.len() as f64;
        let mean_a = common_ratings.iter().map(|(a, _)| a).sum::<f64>() / qty;
        let mean_b = common_ratings.iter().map(|(_, b)| b).sum::<f64>() / qty;

        let covariance: f64 = common_ratings
            .iter()
            .map(|(a, b)| (a - mean_a) * (b - mean_b))
            .sum();
        let std_a = common_ratings
            .iter()
            .map(|(a, _)| (a - mean_a).powi(2))
            .sum::<f64>()
            .sqrt();
        let std_b = common_ratings
            .iter()
            .map(|(_, b)| (b - mean_b).powi(2))
            .sum::<f64>()
            .sqrt();

        let denominator = std_a * std_b;
        if denominator != 0.0 {
            covariance / denominator
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Cosine,
    Pearson,
}

impl Metric {
    pub fn measure(&self) -> &'static (dyn SimilarityMeasure + Sync) {
        match self {
            Metric::Cosine => &Cosine,
            Metric::Pearson => &Pearson,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Cosine => "cosine",
            Metric::Pearson => "pearson",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = CfError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cosine" => Ok(Metric::Cosine),
            "pearson" => Ok(Metric::Pearson),
            other => Err(CfError::Config(format!(
                "unknown similarity metric '{}', expected 'cosine' or 'pearson'",
                other
            ))),
        }
    }
}

/// Rounds to the two decimals similarities and predictions are reported with.
///
/// Rounds the exact binary value, with ties going to the even digit, so
/// `2.675` (stored as 2.67499..) becomes `2.67` and `3.125` becomes `3.12`.
pub fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Full-precision similarity between two items of `matrix`, looked up by id.
pub fn compute_similarity(
    matrix: &RatingMatrix,
    metric: Metric,
    item_a: &str,
    item_b: &str,
) -> Result<f64> {
    let index_a = matrix.item_index(item_a)?;
    let index_b = matrix.item_index(item_b)?;
    Ok(metric
        .measure()
        .similarity(&matrix.item_vector(index_a), &matrix.item_vector(index_b)))
}

/// Full item x item table, every ordered pair including the diagonal, rounded
/// to two decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    metric: Metric,
    items: Vec<ItemId>,
    item_to_index: HashMap<ItemId, usize>,
    values: Vec<Vec<f64>>,
}

impl SimilarityMatrix {
    pub fn build(matrix: &RatingMatrix, metric: Metric) -> Self {
        let start_time = Instant::now();
        let measure = metric.measure();
        let item_vectors: Vec<Vec<Option<Rating>>> = (0..matrix.qty_items())
            .map(|item_idx| matrix.item_vector(item_idx))
            .collect();

        let values: Vec<Vec<f64>> = item_vectors
            .par_iter()
            .map(|ratings_a| {
                item_vectors
                    .iter()
                    .map(|ratings_b| round2(measure.similarity(ratings_a, ratings_b)))
                    .collect()
            })
            .collect();

        tracing::debug!(
            metric = metric.name(),
            qty_items = matrix.qty_items(),
            qty_users = matrix.qty_users(),
            micros = start_time.elapsed().as_micros() as u64,
            "built similarity matrix"
        );

        let items = matrix.items().to_vec();
        let item_to_index = items
            .iter()
            .enumerate()
            .map(|(index, item)| (item.clone(), index))
            .collect();

        SimilarityMatrix {
            metric,
            items,
            item_to_index,
            values,
        }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn get(&self, item_idx_a: usize, item_idx_b: usize) -> f64 {
        self.values[item_idx_a][item_idx_b]
    }

    pub fn row(&self, item_idx: usize) -> &[f64] {
        &self.values[item_idx]
    }

    pub fn lookup(&self, item_a: &str, item_b: &str) -> Result<f64> {
        let index_a = self.index_of(item_a)?;
        let index_b = self.index_of(item_b)?;
        Ok(self.get(index_a, index_b))
    }

    fn index_of(&self, item: &str) -> Result<usize> {
        self.item_to_index
            .get(item)
            .copied()
            .ok_or_else(|| CfError::unknown_item(item))
    }
}
