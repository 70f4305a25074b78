use crate::metrics::RatingMetric;
use crate::ratings::Rating;

pub struct Mae {
    sum_of_errors: f64,
    qty: usize,
}

impl Mae {
    pub fn new() -> Mae {
        Mae {
            sum_of_errors: 0_f64,
            qty: 0,
        }
    }
}

impl Default for Mae {
    fn default() -> Self {
        Self::new()
    }
}

impl RatingMetric for Mae {
    fn add(&mut self, predicted: Option<Rating>, actual: Rating) {
        if let Some(predicted) = predicted {
            self.qty += 1;
            self.sum_of_errors += (predicted - actual).abs();
        }
    }

    fn result(&self) -> f64 {
        if self.qty > 0 {
            self.sum_of_errors / self.qty as f64
        } else {
            0.0
        }
    }

    fn get_name(&self) -> String {
        "Mae".to_string()
    }
}
