use shared::ClassificationResponse;

/// Delivers a finished verdict back to the submitting channel. Website and
/// app clients receive the payload in the HTTP response and poll the result
/// endpoint, so delivery here is log-only; database-sourced rows need no
/// delivery at all.
pub fn deliver(source: &str, payload: &ClassificationResponse) {
    let body = serde_json::to_string(payload).unwrap_or_default();
    match source {
        "app" => log::info!("Sending to app: {}", body),
        "website" => log::info!("Sending to website: {}", body),
        "database" => {}
        other => log::warn!("No delivery channel for source {:?}", other),
    }
}
