mod classifier;
mod config;
mod db;
mod dispatch;
mod error;
mod poller;
mod routes;
mod service;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};

use classifier::agent::ClassifierAgent;
use config::load_settings;
use db::message_repository::MessageRepository;
use poller::DbPoller;
use routes::configure_routes;
use service::MessageService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    if let Ok(current_dir) = std::env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    }

    let frontend_dir = if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        format!("{}/../frontend/dist", manifest_dir)
    } else {
        "/usr/src/app/frontend/dist".to_string()
    };

    let settings = Arc::new(load_settings());

    let repo = MessageRepository::connect(&settings.database_url)
        .await
        .map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Database setup failed: {}", e),
            )
        })?;

    let agent = Arc::new(ClassifierAgent::new(settings.google_api_key.clone()));
    if agent.online_enabled() {
        log::info!("Online LLM classifier enabled");
    } else {
        log::warn!("Online LLM classifier disabled; offline heuristics only");
    }

    let service = MessageService::new(repo.clone(), agent, settings.clone());

    if settings.poller_enabled {
        let sweeper = DbPoller::new(service.clone(), settings.poll_interval_secs);
        actix_web::rt::spawn(sweeper.run());
    } else {
        log::info!("DB poller disabled");
    }

    log::info!("Starting server on {}", settings.bind_addr);

    let bind_addr = settings.bind_addr.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(web::Data::new(service.clone()))
            .app_data(web::Data::new(repo.clone()))
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone()))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
