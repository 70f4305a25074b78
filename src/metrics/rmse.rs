use crate::metrics::RatingMetric;
use crate::ratings::Rating;

/// Root mean squared error over the predictable held-out ratings.
pub struct Rmse {
    sum_of_squared_errors: f64,
    qty: usize,
}

impl Rmse {
    pub fn new() -> Rmse {
        Rmse {
            sum_of_squared_errors: 0_f64,
            qty: 0,
        }
    }
}

impl Default for Rmse {
    fn default() -> Self {
        Self::new()
    }
}

impl RatingMetric for Rmse {
    fn add(&mut self, predicted: Option<Rating>, actual: Rating) {
        if let Some(predicted) = predicted {
            self.qty += 1;
            self.sum_of_squared_errors += (predicted - actual).powi(2);
        }
    }

    fn result(&self) -> f64 {
        if self.qty > 0 {
            (self.sum_of_squared_errors / self.qty as f64).sqrt()
        } else {
            0.0
        }
    }

    fn get_name(&self) -> String {
        "Rmse".to_string()
    }
}
