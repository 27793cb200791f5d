use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumString};

/// Placeholder shown for absent optional fields.
pub const PLACEHOLDER: &str = "\u{2014}";

#[derive(Serialize, Deserialize, Clone)]
pub struct MessageRequest {
    #[serde(default = "default_source")]
    pub source: String,
    pub message: String,
}

fn default_source() -> String {
    "website".to_string()
}

#[derive(Serialize, Deserialize, Clone, Default)]
pub struct ClassificationMeta {
    pub origin: Option<String>,
    pub after_hours: Option<bool>,
    pub offline_label: Option<String>,
    pub online_label: Option<String>,
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct ClassificationResponse {
    pub id: Option<String>,
    pub source: String,
    pub message: String,
    pub result: String,
    pub after_hours: bool,
    pub meta: ClassificationMeta,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct HealthResponse {
    pub status: String,
    pub time: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum Verdict {
    Fraud,
    #[serde(rename = "Not Fraud")]
    #[strum(serialize = "Not Fraud")]
    NotFraud,
    Mediate,
}

impl Verdict {
    pub fn css_class(self) -> &'static str {
        match self {
            Verdict::Fraud => "fraud",
            Verdict::NotFraud => "notfraud",
            Verdict::Mediate => "mediate",
        }
    }

    /// Canonicalises a free-text label emitted by a model. Exact matches are
    /// tried after trimming, lowercasing and stripping periods/apostrophes;
    /// substring fallbacks follow, "not fraud" before "fraud".
    pub fn normalize(raw: &str) -> Option<Verdict> {
        if raw.trim().is_empty() {
            return None;
        }
        let l = raw.trim().to_lowercase().replace(['.', '\''], "");
        match l.as_str() {
            "fraud" => return Some(Verdict::Fraud),
            "not fraud" => return Some(Verdict::NotFraud),
            "mediate" => return Some(Verdict::Mediate),
            _ => {}
        }
        if l.contains("not") && l.contains("fraud") {
            Some(Verdict::NotFraud)
        } else if l.contains("mediate") {
            Some(Verdict::Mediate)
        } else if l.contains("fraud") || l.contains("scam") || l.contains("spam") {
            Some(Verdict::Fraud)
        } else {
            None
        }
    }

    /// Three-way badge bucket over a display string. Intentional substring
    /// heuristic, first match wins: "fraud" without "not" is Fraud, any
    /// "not" is NotFraud, everything else is Mediate.
    pub fn bucket(text: &str) -> Verdict {
        let lower = text.to_lowercase();
        if lower.contains("fraud") && !lower.contains("not") {
            Verdict::Fraud
        } else if lower.contains("not") {
            Verdict::NotFraud
        } else {
            Verdict::Mediate
        }
    }
}

/// Pure projection of a classification payload into the fields the result
/// panel renders. The payload stays raw JSON so unknown fields survive for
/// the inspection view.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub result: String,
    pub doc_id: String,
    pub after_hours: bool,
    pub origin: String,
    pub verdict: Verdict,
}

impl ResultView {
    pub fn from_value(payload: &Value) -> Self {
        let result = payload
            .get("result")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let doc_id = payload
            .get("id")
            .and_then(Value::as_str)
            .or_else(|| payload.get("_id").and_then(Value::as_str))
            .unwrap_or(PLACEHOLDER)
            .to_string();
        let meta = payload.get("meta");
        let after_hours = payload
            .get("after_hours")
            .and_then(Value::as_bool)
            .or_else(|| meta.and_then(|m| m.get("after_hours")).and_then(Value::as_bool))
            .unwrap_or(false);
        let origin = meta
            .and_then(|m| m.get("origin"))
            .and_then(Value::as_str)
            .unwrap_or(PLACEHOLDER)
            .to_string();
        let verdict = Verdict::bucket(&result);
        Self {
            result,
            doc_id,
            after_hours,
            origin,
            verdict,
        }
    }

    pub fn badge_text(&self) -> &str {
        if self.result.is_empty() {
            PLACEHOLDER
        } else {
            &self.result
        }
    }
}
