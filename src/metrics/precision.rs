use crate::metrics::RatingMetric;
use crate::ratings::Rating;
use crate::recommend::{decide, Verdict};

pub struct Precision {
    qty_true_positives: usize,
    qty_recommended: usize,
    threshold: Rating,
}

impl Precision {
    /// Returns a Precision evaluation metric.
    /// Precision quantifies the share of "yes" verdicts for held-out ratings
    /// that the user actually rated at or above the threshold.
    ///
    /// # Arguments
    ///
    /// * `threshold` - the recommendation cutoff used for both the verdict and the actual rating.
    ///
    pub fn new(threshold: Rating) -> Precision {
        Precision {
            qty_true_positives: 0,
            qty_recommended: 0,
            threshold,
        }
    }
}

impl RatingMetric for Precision {
    fn add(&mut self, predicted: Option<Rating>, actual: Rating) {
        if decide(None, predicted, self.threshold) == Verdict::Yes {
            self.qty_recommended += 1;
            if actual >= self.threshold {
                self.qty_true_positives += 1;
            }
        }
    }

    fn result(&self) -> f64 {
        if self.qty_recommended > 0 {
            self.qty_true_positives as f64 / self.qty_recommended as f64
        } else {
            0.0
        }
    }

    fn get_name(&self) -> String {
        format!("Precision@{}", self.threshold)
    }
}
