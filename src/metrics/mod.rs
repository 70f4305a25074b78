use crate::ratings::Rating;

pub mod coverage;
pub mod evaluation_reporter;
pub mod mae;
pub mod precision;
pub mod rmse;

pub trait RatingMetric {
    /// Records one held-out rating and what was predicted for it.
    fn add(&mut self, predicted: Option<Rating>, actual: Rating);
    fn result(&self) -> f64;
    fn get_name(&self) -> String;
}
