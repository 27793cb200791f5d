use shared::{ClassificationMeta, Verdict};

use super::offline::OfflineClassifier;
use super::online::OnlineClassifier;

pub struct Classification {
    pub verdict: Verdict,
    pub meta: ClassificationMeta,
}

/// Two-stage classification: the offline scorer answers first, the online
/// model is consulted only when the offline stage is indecisive, and an
/// undecided verdict submitted after-hours is escalated to Fraud.
pub struct ClassifierAgent {
    offline: OfflineClassifier,
    online: OnlineClassifier,
}

impl ClassifierAgent {
    pub fn new(google_api_key: Option<String>) -> Self {
        Self {
            offline: OfflineClassifier,
            online: OnlineClassifier::new(google_api_key),
        }
    }

    pub fn online_enabled(&self) -> bool {
        self.online.enabled()
    }

    pub async fn classify(&self, text: &str, after_hours: bool) -> Classification {
        let offline_label = self.offline.predict(text);
        log::info!("Offline label: {:?}", offline_label);

        let mut online_label = None;
        let (mut verdict, origin) = match offline_label {
            Some(label) if label != Verdict::Mediate => (label, "offline"),
            _ => {
                online_label = self.online.predict(text).await;
                match online_label {
                    Some(label) => (label, "online"),
                    None => (Verdict::Mediate, "default"),
                }
            }
        };

        // Past the evening cutoff an undecided verdict is escalated.
        if after_hours && verdict == Verdict::Mediate {
            verdict = Verdict::Fraud;
        }

        log::info!(
            "Final label: {} (origin={}, after_hours={})",
            verdict,
            origin,
            after_hours
        );

        Classification {
            verdict,
            meta: ClassificationMeta {
                origin: Some(origin.to_string()),
                after_hours: Some(after_hours),
                offline_label: offline_label.map(|v| v.to_string()),
                online_label: online_label.map(|v| v.to_string()),
                error: None,
            },
        }
    }
}
