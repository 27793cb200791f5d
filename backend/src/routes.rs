use std::collections::HashMap;

use actix_files::Files;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use log::{error, info};
use serde::Serialize;
use shared::{HealthResponse, MessageRequest};
use uuid::Uuid;

use crate::db::message_repository::MessageRepository;
use crate::service::MessageService;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl ErrorResponse {
    fn new(msg: &str) -> Self {
        Self { error: msg.into() }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: String) {
    cfg.service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/api/message").route(web::post().to(receive_message)))
        .service(web::resource("/api/app/message").route(web::post().to(app_message)))
        .service(web::resource("/api/app/process").route(web::get().to(app_process)))
        .service(web::resource("/api/result/{id}").route(web::get().to(get_result)))
        .service(web::resource("/api/app/result/{id}").route(web::get().to(get_result)))
        .service(Files::new("/", frontend_dir).index_file("index.html"));
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".into(),
        time: Utc::now().timestamp(),
    })
}

async fn receive_message(
    service: web::Data<MessageService>,
    body: web::Json<MessageRequest>,
) -> HttpResponse {
    let MessageRequest { source, message } = body.into_inner();
    if message.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse::new("message is required"));
    }
    let payload = service.process(&source, &message).await;
    HttpResponse::Ok().json(payload)
}

async fn app_message(
    service: web::Data<MessageService>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    match extract_text(&req, &body) {
        Some(text) => {
            let payload = service.process("app", &text).await;
            HttpResponse::Ok().json(payload)
        }
        None => {
            HttpResponse::BadRequest().json(ErrorResponse::new("text or message is required"))
        }
    }
}

async fn app_process(
    service: web::Data<MessageService>,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    let text = query
        .get("text")
        .or_else(|| query.get("message"))
        .cloned()
        .unwrap_or_default();
    if text.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse::new("text query param is required"));
    }
    let payload = service.process("app", &text).await;
    HttpResponse::Ok().json(payload)
}

async fn get_result(repo: web::Data<MessageRepository>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();
    if Uuid::parse_str(&id).is_err() {
        return HttpResponse::BadRequest().json(ErrorResponse::new("invalid id format"));
    }
    match repo.get_message(&id).await {
        Ok(Some(doc)) => {
            info!("Retrieved message {}", id);
            HttpResponse::Ok().json(doc)
        }
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::new("not found")),
        Err(e) => {
            error!("Error retrieving message {}: {}", id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::new("failed to load message"))
        }
    }
}

/// Text extraction for the app-facing endpoint: JSON body (`text` or
/// `message`), then the query string, then the raw body.
fn extract_text(req: &HttpRequest, body: &[u8]) -> Option<String> {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        for key in ["text", "message"] {
            if let Some(t) = value.get(key).and_then(|v| v.as_str()) {
                if !t.is_empty() {
                    return Some(t.to_string());
                }
            }
        }
    }

    if let Ok(query) = web::Query::<HashMap<String, String>>::from_query(req.query_string()) {
        for key in ["text", "message"] {
            if let Some(t) = query.get(key) {
                if !t.is_empty() {
                    return Some(t.clone());
                }
            }
        }
    }

    let raw = String::from_utf8_lossy(body).trim().to_string();
    if raw.is_empty() { None } else { Some(raw) }
}
