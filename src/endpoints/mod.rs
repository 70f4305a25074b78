use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::recommend::Recommender;

pub mod index_resource;
pub mod recommend_resource;

pub struct SharedHandlesAndConfig {
    pub recommender: Arc<Recommender>,
    pub ratings_path: String,
    pub loaded_at: DateTime<Utc>,
    pub num_items_to_recommend: usize,
    pub qty_workers: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
