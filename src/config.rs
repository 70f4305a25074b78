use std::error::Error;
use std::ffi::OsStr;
use std::fs::File;
use std::str::FromStr;

use justconfig::item::ValueExtractor;
use justconfig::processors::Trim;
use justconfig::sources::env::Env;
use justconfig::sources::text::ConfigText;
use justconfig::ConfPath;
use justconfig::Config;

use crate::config_processors::Unquote;
use crate::error::{CfError, Result};
use crate::itemknn::similarity::Metric;
use crate::ratings::{Rating, RatingBounds};

// Set some default values
const DEFAULT_THRESHOLD: Rating = 3.0;
const DEFAULT_MIN_RATING: Rating = 0.0;
const DEFAULT_MAX_RATING: Rating = 5.0;
const DEFAULT_NUM_ITEMS_TO_RECOMMEND: usize = 3;
const DEFAULT_HOLDOUT_FRACTION: f64 = 0.2;
const DEFAULT_SEED: u64 = 42;

pub struct AppConfig {
    pub server: ServerConfig,
    pub log: LogConfig,
    pub data: DataConfig,
    pub model: ModelConfig,
    pub evaluation: EvaluationConfig,
}

pub struct ServerConfig {
    pub host: String,
    pub port: usize,
    pub num_workers: usize,
}

pub struct LogConfig {
    pub level: String,
}

pub struct DataConfig {
    pub ratings_path: String,
}

pub struct ModelConfig {
    pub metric: Metric,
    pub threshold: Rating,
    pub bounds: RatingBounds,
    pub num_items_to_recommend: usize,
}

pub struct EvaluationConfig {
    pub holdout_fraction: f64,
    pub seed: u64,
}

impl AppConfig {
    pub fn new(config_path: String) -> Result<AppConfig> {
        // Initialize config object
        let mut conf = Config::default();

        // Check if there is a config file
        if let Ok(config_file) = File::open(&config_path) {
            let config_text = ConfigText::new(config_file, &config_path).map_err(|e| {
                CfError::Config(format!("loading {} failed: {}", config_path, e))
            })?;
            conf.add_source(config_text);
        }

        // Define config params from environment variables
        let config_env = Env::new(&[
            (
                ConfPath::from(&["data", "ratings_path"]),
                OsStr::new("RATINGS_DATA"),
            ),
            (
                ConfPath::from(&["model", "metric"]),
                OsStr::new("SIMILARITY_METRIC"),
            ),
            (
                ConfPath::from(&["model", "threshold"]),
                OsStr::new("RECOMMEND_THRESHOLD"),
            ),
            (
                ConfPath::from(&["server", "num_workers"]),
                OsStr::new("NUM_WORKERS"),
            ),
        ]);
        conf.add_source(config_env);

        // Parse into custom config struct
        AppConfig::parse(conf)
    }

    pub fn parse(conf: Config) -> Result<AppConfig> {
        Ok(AppConfig {
            server: ServerConfig::parse(&conf, ConfPath::from(&["server"]))?,
            log: LogConfig::parse(&conf, ConfPath::from(&["log"])),
            data: DataConfig::parse(&conf, ConfPath::from(&["data"]))?,
            model: ModelConfig::parse(&conf, ConfPath::from(&["model"]))?,
            evaluation: EvaluationConfig::parse(&conf, ConfPath::from(&["evaluation"]))?,
        })
    }
}

/// Reads an optional scalar. A missing key is `None`; a present value that
/// does not parse is an error rather than a silent default.
fn optional<T>(conf: &Config, path: &ConfPath, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Error + 'static,
{
    let key = path.push(key);
    conf.get(key.clone())
        .trim()
        .try_value()
        .map_err(|e| CfError::Config(format!("{}: {}", key, e)))
}

impl ServerConfig {
    fn parse(conf: &Config, path: ConfPath) -> Result<ServerConfig> {
        Ok(ServerConfig {
            host: conf
                .get(path.push("host"))
                .unquote()
                .value()
                .unwrap_or_else(|_| String::from("0.0.0.0")),
            port: optional(conf, &path, "port")?.unwrap_or(8080),
            num_workers: optional(conf, &path, "num_workers")?
                // Detect number of CPUs
                .unwrap_or_else(|| sys_info::cpu_num().unwrap_or(1) as usize),
        })
    }
}

impl LogConfig {
    fn parse(conf: &Config, path: ConfPath) -> LogConfig {
        LogConfig {
            level: conf
                .get(path.push("level"))
                .unquote()
                .value()
                .unwrap_or_default(),
        }
    }
}

impl DataConfig {
    fn parse(conf: &Config, path: ConfPath) -> Result<DataConfig> {
        Ok(DataConfig {
            ratings_path: conf
                .get(path.push("ratings_path"))
                .unquote()
                .value()
                .map_err(|e| CfError::Config(format!("data.ratings_path: {}", e)))?,
        })
    }
}

impl ModelConfig {
    fn parse(conf: &Config, path: ConfPath) -> Result<ModelConfig> {
        let metric_name: std::result::Result<String, _> =
            conf.get(path.push("metric")).unquote().value();
        let metric = match metric_name {
            Ok(name) => name.parse::<Metric>()?,
            Err(_) => Metric::Cosine,
        };
        let min_rating = optional(conf, &path, "min_rating")?.unwrap_or(DEFAULT_MIN_RATING);
        let max_rating = optional(conf, &path, "max_rating")?.unwrap_or(DEFAULT_MAX_RATING);

        Ok(ModelConfig {
            metric,
            threshold: optional(conf, &path, "threshold")?.unwrap_or(DEFAULT_THRESHOLD),
            bounds: RatingBounds::new(min_rating, max_rating)
                .map_err(|e| CfError::Config(e.to_string()))?,
            num_items_to_recommend: optional(conf, &path, "num_items_to_recommend")?
                .unwrap_or(DEFAULT_NUM_ITEMS_TO_RECOMMEND),
        })
    }
}

impl EvaluationConfig {
    fn parse(conf: &Config, path: ConfPath) -> Result<EvaluationConfig> {
        let holdout_fraction: f64 =
            optional(conf, &path, "holdout_fraction")?.unwrap_or(DEFAULT_HOLDOUT_FRACTION);
        if !(0.0..=1.0).contains(&holdout_fraction) {
            return Err(CfError::Config(format!(
                "evaluation.holdout_fraction must lie in [0, 1], got {}",
                holdout_fraction
            )));
        }

        Ok(EvaluationConfig {
            holdout_fraction,
            seed: optional(conf, &path, "seed")?.unwrap_or(DEFAULT_SEED),
        })
    }
}

#[cfg(test)]
mod config_test {
    use justconfig::sources::defaults::Defaults;

    use super::*;

    fn config_with(values: &[(&[&str], &str)]) -> Config {
        let mut conf = Config::default();
        let mut defaults = Defaults::default();
        for (path, value) in values {
            defaults.set(conf.root().push_all(*path), value, "unittest");
        }
        conf.add_source(defaults);
        conf
    }

    #[test]
    fn should_apply_defaults() {
        let conf = config_with(&[(&["data", "ratings_path"], "\"ratings.csv\"")]);
        let config = AppConfig::parse(conf).unwrap();

        assert_eq!("ratings.csv", config.data.ratings_path);
        assert_eq!(Metric::Cosine, config.model.metric);
        assert_eq!(DEFAULT_THRESHOLD, config.model.threshold);
        assert_eq!(RatingBounds::default(), config.model.bounds);
        assert_eq!(DEFAULT_NUM_ITEMS_TO_RECOMMEND, config.model.num_items_to_recommend);
        assert_eq!("", config.log.level);
        assert_eq!(8080, config.server.port);
        assert_eq!(DEFAULT_SEED, config.evaluation.seed);
    }

    #[test]
    fn should_read_model_section() {
        let conf = config_with(&[
            (&["data", "ratings_path"], "ratings.csv"),
            (&["model", "metric"], "\"pearson\""),
            (&["model", "threshold"], " 4 "),
            (&["model", "max_rating"], "10"),
            (&["evaluation", "holdout_fraction"], "0.5"),
        ]);
        let config = AppConfig::parse(conf).unwrap();

        assert_eq!(Metric::Pearson, config.model.metric);
        assert_eq!(4.0, config.model.threshold);
        assert_eq!(10.0, config.model.bounds.max);
        assert_eq!(0.5, config.evaluation.holdout_fraction);
    }

    #[test]
    fn should_require_ratings_path() {
        let conf = config_with(&[]);
        assert!(matches!(AppConfig::parse(conf), Err(CfError::Config(_))));
    }

    #[test]
    fn should_reject_unknown_metric() {
        let conf = config_with(&[
            (&["data", "ratings_path"], "ratings.csv"),
            (&["model", "metric"], "jaccard"),
        ]);
        assert!(AppConfig::parse(conf).is_err());
    }

    #[test]
    fn should_reject_malformed_numbers() {
        let conf = config_with(&[
            (&["data", "ratings_path"], "ratings.csv"),
            (&["model", "threshold"], "four"),
        ]);
        assert!(matches!(AppConfig::parse(conf), Err(CfError::Config(_))));

        let conf = config_with(&[
            (&["data", "ratings_path"], "ratings.csv"),
            (&["model", "max_rating"], "ten"),
        ]);
        assert!(matches!(AppConfig::parse(conf), Err(CfError::Config(_))));

        let conf = config_with(&[
            (&["data", "ratings_path"], "ratings.csv"),
            (&["server", "port"], "80a"),
        ]);
        assert!(matches!(AppConfig::parse(conf), Err(CfError::Config(_))));
    }
}
