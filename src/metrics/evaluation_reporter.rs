use crate::metrics::coverage::Coverage;
use crate::metrics::mae::Mae;
use crate::metrics::precision::Precision;
use crate::metrics::rmse::Rmse;
use crate::metrics::RatingMetric;
use crate::ratings::Rating;

pub struct EvaluationReporter {
    rmse: Rmse,
    mae: Mae,
    coverage: Coverage,
    precision: Precision,
}

impl EvaluationReporter {
    pub fn new(threshold: Rating) -> EvaluationReporter {
        EvaluationReporter {
            rmse: Rmse::new(),
            mae: Mae::new(),
            coverage: Coverage::new(),
            precision: Precision::new(threshold),
        }
    }

    fn metrics(&self) -> [&dyn RatingMetric; 4] {
        [&self.rmse, &self.mae, &self.coverage, &self.precision]
    }

    pub fn add(&mut self, predicted: Option<Rating>, actual: Rating) {
        self.rmse.add(predicted, actual);
        self.mae.add(predicted, actual);
        self.coverage.add(predicted, actual);
        self.precision.add(predicted, actual);
    }

    pub fn result(&self) -> String {
        self.metrics()
            .iter()
            .map(|metric| format!("{:.4}", metric.result()))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn get_name(&self) -> String {
        self.metrics()
            .iter()
            .map(|metric| metric.get_name())
            .collect::<Vec<_>>()
            .join(",")
    }
}
