use gloo_net::http::Request;
use serde::Deserialize;
use serde_json::Value;
use shared::{HealthResponse, MessageRequest};

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

pub async fn check_health() -> Result<HealthResponse, gloo_net::Error> {
    Request::get("/health")
        .send()
        .await?
        .json::<HealthResponse>()
        .await
}

/// Submits one message. Returns the raw payload on success; the error
/// variant carries the user-facing message (server-supplied when the error
/// body parses, `Server error (<status>)` otherwise).
pub async fn submit_message(message: String) -> Result<Value, String> {
    let body = MessageRequest {
        source: "website".into(),
        message,
    };
    let request = Request::post("/api/message")
        .json(&body)
        .map_err(|e| e.to_string())?;
    let response = request.send().await.map_err(|e| e.to_string())?;

    if !response.ok() {
        let status = response.status();
        let msg = match response.json::<ErrorBody>().await {
            Ok(ErrorBody { error: Some(error) }) if !error.is_empty() => error,
            _ => format!("Server error ({})", status),
        };
        return Err(msg);
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}
