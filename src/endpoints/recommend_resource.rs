use actix_web::{get, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::endpoints::{ErrorBody, SharedHandlesAndConfig};
use crate::error::CfError;

#[derive(Debug, Deserialize)]
pub struct V1RecommendParams {
    user_id: String,
    item_id: String,
}

#[derive(Debug, Deserialize)]
pub struct V1TopParams {
    user_id: String,
    how_many: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SimilarityTable<'a> {
    metric: &'static str,
    items: &'a [String],
    values: Vec<&'a [f64]>,
}

fn error_response(error: CfError) -> HttpResponse {
    let body = ErrorBody {
        error: error.to_string(),
    };
    match error {
        CfError::NotFound { .. } => HttpResponse::NotFound().json(body),
        _ => {
            tracing::error!(error = %body.error, "request failed");
            HttpResponse::InternalServerError().json(body)
        }
    }
}

// Verdict for one (user, item) cell of the predicted matrix.
#[get("/v1/recommend")]
pub async fn v1_recommend(
    data: web::Data<SharedHandlesAndConfig>,
    query: web::Query<V1RecommendParams>,
) -> HttpResponse {
    match data.recommender.recommend(&query.user_id, &query.item_id) {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(error) => error_response(error),
    }
}

#[get("/v1/top")]
pub async fn v1_top(
    data: web::Data<SharedHandlesAndConfig>,
    query: web::Query<V1TopParams>,
) -> HttpResponse {
    let how_many = query.how_many.unwrap_or(data.num_items_to_recommend);
    match data.recommender.top_n(&query.user_id, how_many) {
        Ok(recommended_items) => HttpResponse::Ok().json(recommended_items),
        Err(error) => error_response(error),
    }
}

#[get("/v1/similarities")]
pub async fn v1_similarities(data: web::Data<SharedHandlesAndConfig>) -> HttpResponse {
    let similarities = data.recommender.similarities();
    let table = SimilarityTable {
        metric: similarities.metric().name(),
        items: similarities.items(),
        values: (0..similarities.items().len())
            .map(|item_idx| similarities.row(item_idx))
            .collect(),
    };
    HttpResponse::Ok().json(table)
}
