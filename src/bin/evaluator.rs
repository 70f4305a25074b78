use indicatif::ProgressBar;
use itertools::Itertools;

use collabrec::config::AppConfig;
use collabrec::holdout;
use collabrec::io::read_ratings;
use collabrec::itemknn::prediction::predict;
use collabrec::itemknn::similarity::SimilarityMatrix;
use collabrec::logging::init_logging;
use collabrec::metrics::evaluation_reporter::EvaluationReporter;
use collabrec::stopwatch::Stopwatch;

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_default();
    let config = AppConfig::new(config_path)?;
    init_logging(&config.log.level)?;

    let threshold = config.model.threshold;
    let ratings = read_ratings(&config.data.ratings_path, config.model.bounds)?;
    let (train, test) = holdout::split(
        &ratings,
        config.evaluation.holdout_fraction,
        config.evaluation.seed,
    );
    tracing::info!(
        qty_observed = ratings.qty_observed(),
        qty_held_out = test.len(),
        "evaluating {} on {}",
        config.model.metric,
        config.data.ratings_path
    );

    let similarities = SimilarityMatrix::build(&train, config.model.metric);

    let mut reporter = EvaluationReporter::new(threshold);
    let mut stopwatch = Stopwatch::new();

    let held_out_per_user = test
        .iter()
        .map(|held_out| (held_out.user_idx, held_out))
        .into_group_map();
    let progress_bar = ProgressBar::new(held_out_per_user.len() as u64);
    for (user_idx, held_out_ratings) in held_out_per_user
        .into_iter()
        .sorted_by_key(|(user_idx, _)| *user_idx)
    {
        progress_bar.inc(1);
        stopwatch.start();
        let predictions = held_out_ratings
            .iter()
            .map(|held_out| predict(user_idx, held_out.item_idx, &train, &similarities))
            .collect_vec();
        stopwatch.stop();

        for (held_out, prediction) in held_out_ratings.iter().zip(predictions) {
            reporter.add(prediction.value(), held_out.rating);
        }
    }
    progress_bar.finish_and_clear();

    println!("===============================================================");
    println!("===              START EVALUATING HELD-OUT RATINGS         ====");
    println!("===============================================================");
    println!("{}", reporter.get_name());
    println!("{}", reporter.result());
    println!("Qty users evaluated: {}", stopwatch.get_n());
    println!("Prediction latency per user");
    println!("p90 (microseconds): {}", stopwatch.get_percentile_in_micros(0.90));
    println!("p95 (microseconds): {}", stopwatch.get_percentile_in_micros(0.95));
    println!("p99.5 (microseconds): {}", stopwatch.get_percentile_in_micros(0.995));

    Ok(())
}
