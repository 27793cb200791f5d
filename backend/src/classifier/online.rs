use serde::{Deserialize, Serialize};
use shared::Verdict;

use crate::error::AppError;

const GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

const CLASSIFY_PROMPT: &str = "You are an expert fraud classifier. Classify the given text as \
exactly one of: Fraud, Not Fraud, Mediate. Reply with ONLY one of these EXACT labels.";

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Hosted-LLM fallback classifier. Disabled entirely when no API key is
/// configured; every failure degrades to None so the pipeline never stalls
/// on the upstream.
pub struct OnlineClassifier {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl OnlineClassifier {
    pub fn new(api_key: Option<String>) -> Self {
        if api_key.is_none() {
            log::warn!("GOOGLE_API_KEY not set; online classifier disabled.");
        }
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }

    pub fn enabled(&self) -> bool {
        self.api_key.is_some()
    }

    async fn classify(&self, api_key: &str, text: &str) -> Result<String, AppError> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: format!("{}\n\nText: {}\n\nAnswer:", CLASSIFY_PROMPT, text),
                }],
            }],
        };
        let response = self
            .client
            .post(GEMINI_ENDPOINT)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        let body: GenerateResponse = response.json().await?;
        let raw = body
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();
        Ok(raw)
    }

    pub async fn predict(&self, text: &str) -> Option<Verdict> {
        let api_key = self.api_key.as_deref()?;
        let raw = match self.classify(api_key, text).await {
            Ok(raw) => raw,
            Err(e) => {
                log::error!("Online classifier error: {}", e);
                return None;
            }
        };

        let mut label = Verdict::normalize(&raw);
        if label.is_none() {
            let stricter =
                format!("{}\nReturn only 'Fraud' or 'Not Fraud' or 'Mediate'.", text);
            match self.classify(api_key, &stricter).await {
                Ok(raw2) => label = Verdict::normalize(&raw2),
                Err(e) => log::error!("Online classifier retry error: {}", e),
            }
        }
        log::info!("Online raw: {:?} => {:?}", raw, label);
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_without_api_key() {
        let classifier = OnlineClassifier::new(None);
        assert!(!classifier.enabled());
        assert_eq!(classifier.predict("anything at all").await, None);
    }

    #[test]
    fn response_text_extraction_tolerates_empty_parts() {
        let body: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"Not "},{"text":"Fraud"},{}]}}]}"#,
        )
        .unwrap();
        let raw = body
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();
        assert_eq!(raw, "Not Fraud");
    }

    #[test]
    fn empty_candidates_yield_empty_text() {
        let body: GenerateResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(body.candidates.is_empty());
    }
}
