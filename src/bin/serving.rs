use actix_web::{
    http::ContentEncoding, middleware, web, App, HttpRequest, HttpResponse, HttpServer,
};
use actix_web_prom::PrometheusMetrics;

use actix_web::http::header;
use chrono::Utc;
use std::sync::Arc;

use collabrec::config::AppConfig;
use collabrec::endpoints::index_resource::internal;
use collabrec::endpoints::recommend_resource::{v1_recommend, v1_similarities, v1_top};
use collabrec::endpoints::SharedHandlesAndConfig;
use collabrec::io::read_ratings;
use collabrec::logging::init_logging;
use collabrec::recommend::Recommender;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_default();
    let config = AppConfig::new(config_path)?;
    init_logging(&config.log.level)?;

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    let num_items_to_recommend = config.model.num_items_to_recommend;
    let qty_workers = config.server.num_workers;
    let ratings_path = config.data.ratings_path.clone();

    // The snapshot is immutable for the lifetime of the process.
    let ratings = read_ratings(&ratings_path, config.model.bounds)?;
    let recommender = Arc::new(Recommender::new(
        ratings,
        config.model.metric,
        config.model.threshold,
    )?);
    let loaded_at = Utc::now();

    tracing::info!("start metrics");
    let prometheus = PrometheusMetrics::new("api", Some("/internal/prometheus"), None);

    tracing::info!("Done. start httpd at http://{}", &bind_address);
    HttpServer::new(move || {
        let handles_and_config = SharedHandlesAndConfig {
            recommender: recommender.clone(),
            ratings_path: ratings_path.clone(),
            loaded_at,
            num_items_to_recommend,
            qty_workers,
        };

        App::new()
            .wrap(middleware::Compress::new(ContentEncoding::Identity))
            .wrap(prometheus.clone())
            .wrap(
                middleware::DefaultHeaders::new()
                    .header("Cache-Control", "no-cache, no-store, must-revalidate")
                    .header("Pragma", "no-cache")
                    .header("Expires", "0"),
            )
            .data(handles_and_config)
            .service(v1_recommend)
            .service(v1_top)
            .service(v1_similarities)
            .service(internal)
            .service(web::resource("/").route(web::get().to(|_req: HttpRequest| {
                HttpResponse::Found()
                    .header(header::LOCATION, "/internal")
                    .finish()
            })))
    })
    .workers(qty_workers)
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}
