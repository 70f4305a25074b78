use std::io::{self, Write};

use anyhow::Context;

use collabrec::config::AppConfig;
use collabrec::io::{read_ratings, write_predictions, write_ratings, write_similarities};
use collabrec::logging::init_logging;
use collabrec::recommend::{Recommender, Verdict};

fn main() -> anyhow::Result<()> {
    // usage: recommend <config file> <user id> <item id>
    let config_path = std::env::args().nth(1).unwrap_or_default();
    let user = std::env::args().nth(2).context("User id not specified!")?;
    let item = std::env::args().nth(3).context("Item id not specified!")?;

    let config = AppConfig::new(config_path)?;
    init_logging(&config.log.level)?;

    let ratings = read_ratings(&config.data.ratings_path, config.model.bounds)
        .with_context(|| format!("reading {}", config.data.ratings_path))?;
    let recommender = Recommender::new(ratings, config.model.metric, config.model.threshold)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "Ratings matrix:")?;
    write_ratings(&mut out, recommender.ratings())?;
    writeln!(out)?;
    writeln!(out, "{} similarity matrix:", config.model.metric)?;
    write_similarities(&mut out, recommender.similarities())?;
    writeln!(out)?;
    writeln!(out, "Predicted ratings matrix:")?;
    write_predictions(&mut out, recommender.predictions())?;
    writeln!(out)?;

    let result = recommender.recommend(&user, &item)?;
    let original = match result.original_rating {
        Some(rating) => rating.to_string(),
        None => "Not rated".to_string(),
    };
    let predicted = match result.predicted_rating {
        Some(rating) => rating.to_string(),
        None => "Not rated".to_string(),
    };
    writeln!(out, "Original rating for {} by {}: {}", item, user, original)?;
    writeln!(out, "Predicted rating for {} by {}: {}", item, user, predicted)?;
    match result.verdict {
        Verdict::Yes => writeln!(out, "Recommendation: Yes, we recommend {} to {}.", item, user)?,
        Verdict::No => writeln!(
            out,
            "Recommendation: No, we do not recommend {} to {}.",
            item, user
        )?,
        Verdict::Unknown => writeln!(
            out,
            "Recommendation: No, we do not recommend {} to {} (no similar rated items).",
            item, user
        )?,
    }

    let top = recommender.top_n(&user, config.model.num_items_to_recommend)?;
    writeln!(out)?;
    writeln!(out, "Top-{} for {}:", config.model.num_items_to_recommend, user)?;
    for (rank, scored) in top.iter().enumerate() {
        writeln!(out, "{}. {} ({:.2})", rank + 1, scored.item_id, scored.score)?;
    }

    Ok(())
}
