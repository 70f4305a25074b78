use crate::metrics::RatingMetric;
use crate::ratings::Rating;

/// Share of held-out ratings the engine could predict at all.
pub struct Coverage {
    qty_predictable: usize,
    qty: usize,
}

impl Coverage {
    pub fn new() -> Coverage {
        Coverage {
            qty_predictable: 0,
            qty: 0,
        }
    }
}

impl Default for Coverage {
    fn default() -> Self {
        Self::new()
    }
}

impl RatingMetric for Coverage {
    fn add(&mut self, predicted: Option<Rating>, _actual: Rating) {
        self.qty += 1;
        if predicted.is_some() {
            self.qty_predictable += 1;
        }
    }

    fn result(&self) -> f64 {
        if self.qty > 0 {
            self.qty_predictable as f64 / self.qty as f64
        } else {
            0.0
        }
    }

    fn get_name(&self) -> String {
        "Coverage".to_string()
    }
}
