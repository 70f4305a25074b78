extern crate sys_info;

use actix_web::{get, web, HttpResponse};
use chrono::Utc;

use crate::endpoints::SharedHandlesAndConfig;
use web::Data;

#[get("/internal")]
pub async fn internal(config: Data<SharedHandlesAndConfig>) -> HttpResponse {
    let recommender = config.recommender.as_ref();
    let ratings = recommender.ratings();
    let mut html = "<html>collabrec: item-item collaborative filtering.<br />".to_string();

    html.push_str("<h3>Ratings</h3>");
    html.push_str("Loaded: ");
    html.push_str(&config.ratings_path);
    html.push_str("<br />Loaded at: ");
    html.push_str(&config.loaded_at.to_rfc3339());
    html.push_str("<br />Age (minutes): ");
    html.push_str(&(Utc::now() - config.loaded_at).num_minutes().to_string());
    html.push_str("<br />Qty users: ");
    html.push_str(&ratings.qty_users().to_string());
    html.push_str("<br />Qty items: ");
    html.push_str(&ratings.qty_items().to_string());
    html.push_str("<br />Qty observed ratings: ");
    html.push_str(&ratings.qty_observed().to_string());
    html.push_str("<br />Rating range: ");
    html.push_str(&format!("[{}, {}]", ratings.bounds().min, ratings.bounds().max));

    html.push_str("<h3>Model</h3>");
    html.push_str("Similarity metric: ");
    html.push_str(recommender.similarities().metric().name());
    html.push_str("<br />Recommendation threshold: ");
    html.push_str(&recommender.threshold().to_string());
    html.push_str(" (inclusive, applied to the predicted rating)");
    html.push_str("<br />Qty items to recommend: ");
    html.push_str(&config.num_items_to_recommend.to_string());
    if let (Some(user), Some(item)) = (ratings.users().first(), ratings.items().first()) {
        html.push_str("<br /><a href=\"");
        html.push_str(&recommend_link(user, item));
        html.push_str("\">v1 endpoint of our model</a>");
    }
    html.push_str("<br /><a href=\"/v1/similarities\">similarity matrix</a>");
    html.push_str("<h3>Machine instance</h3>");
    html.push_str("<br />Qty CPU's detected: ");
    html.push_str(&sys_info::cpu_num().unwrap_or(0).to_string());
    html.push_str("<br />Qty actix workers set: ");
    html.push_str(&config.qty_workers.to_string());
    html.push_str("<br />CPU speed: ");
    html.push_str(&sys_info::cpu_speed().unwrap_or(0).to_string());
    html.push_str("MHz");
    html.push_str("<h3>Metrics</h3>");
    html.push_str("<a href=\"/internal/prometheus\">prometheus</a>");
    html.push_str("</html>");

    HttpResponse::Ok().body(html)
}

fn recommend_link(user: &str, item: &str) -> String {
    format!(
        "/v1/recommend?user_id={}&amp;item_id={}",
        urlencoding::encode(user),
        urlencoding::encode(item)
    )
}
