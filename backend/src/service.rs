use std::sync::Arc;

use chrono::Local;
use shared::ClassificationResponse;

use crate::classifier::agent::ClassifierAgent;
use crate::config::Settings;
use crate::db::message_repository::{MessageRepository, StoredMessage};
use crate::dispatch;

/// Orchestrates one submission: persist, classify, record the verdict,
/// deliver. Degrades instead of failing; a submission always yields a
/// payload even when persistence is unavailable.
#[derive(Clone)]
pub struct MessageService {
    repo: MessageRepository,
    agent: Arc<ClassifierAgent>,
    settings: Arc<Settings>,
}

impl MessageService {
    pub fn new(repo: MessageRepository, agent: Arc<ClassifierAgent>, settings: Arc<Settings>) -> Self {
        Self {
            repo,
            agent,
            settings,
        }
    }

    pub async fn process(&self, source: &str, message: &str) -> ClassificationResponse {
        let after_hours = self.settings.is_after_hours(&Local::now());

        let id = match self.repo.insert_message(source, message, after_hours).await {
            Ok(id) => Some(id),
            Err(e) => {
                log::error!("Insert failed, continuing without persistence: {}", e);
                None
            }
        };

        let classification = self.agent.classify(message, after_hours).await;
        let payload = ClassificationResponse {
            id: id.clone(),
            source: source.to_string(),
            message: message.to_string(),
            result: classification.verdict.to_string(),
            after_hours,
            meta: classification.meta,
        };

        if let Some(msg_id) = &id {
            self.persist_verdict(msg_id, &payload).await;
        }

        dispatch::deliver(source, &payload);
        payload
    }

    /// Re-classifies a stored row in place. Used by the poller for rows that
    /// never received a verdict.
    pub async fn process_stored(&self, stored: &StoredMessage) -> Option<ClassificationResponse> {
        if stored.message.is_empty() {
            return None;
        }

        let classification = self
            .agent
            .classify(&stored.message, stored.after_hours)
            .await;
        let payload = ClassificationResponse {
            id: Some(stored.id.clone()),
            source: "database".to_string(),
            message: stored.message.clone(),
            result: classification.verdict.to_string(),
            after_hours: stored.after_hours,
            meta: classification.meta,
        };

        self.persist_verdict(&stored.id, &payload).await;
        dispatch::deliver("database", &payload);
        Some(payload)
    }

    /// Pushes every verdict-less row through the classifier. Returns how
    /// many rows were processed.
    pub async fn process_pending(&self, limit: i64) -> usize {
        let rows = match self.repo.find_unprocessed(limit).await {
            Ok(rows) => rows,
            Err(e) => {
                log::error!("Query unprocessed failed: {}", e);
                return 0;
            }
        };

        let mut processed = 0;
        for row in rows {
            if self.process_stored(&row).await.is_some() {
                processed += 1;
            }
        }
        processed
    }

    async fn persist_verdict(&self, id: &str, payload: &ClassificationResponse) {
        if let Err(update_err) = self
            .repo
            .update_result(id, &payload.result, &payload.meta)
            .await
        {
            log::error!("DB update error: {}", update_err);
            if let Err(mark_err) = self.repo.mark_error(id, &update_err.to_string()).await {
                log::error!("Mark error failed: {}", mark_err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    async fn temp_service() -> MessageService {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let db_path = std::env::temp_dir()
            .join(format!("upay_service_test_{suffix}"))
            .join("messages.db");
        let url = format!("sqlite://{}", db_path.to_string_lossy());
        let repo = MessageRepository::connect(&url).await.expect("connect");
        MessageService::new(
            repo,
            Arc::new(ClassifierAgent::new(None)),
            Arc::new(Settings::default()),
        )
    }

    #[tokio::test]
    async fn process_persists_a_decisive_verdict() {
        let service = temp_service().await;
        let payload = service
            .process(
                "website",
                "URGENT your account is blocked, verify OTP at http://bit.ly/secure-pay",
            )
            .await;

        assert_eq!(payload.result, "Fraud");
        assert_eq!(payload.source, "website");
        let id = payload.id.expect("persisted id");

        let stored = service
            .repo
            .get_message(&id)
            .await
            .expect("get")
            .expect("found");
        assert_eq!(stored.status, "processed");
        assert_eq!(stored.result.as_deref(), Some("Fraud"));
        assert_eq!(stored.meta.expect("meta")["origin"], "offline");
    }

    #[tokio::test]
    async fn process_pending_clears_the_backlog() {
        let service = temp_service().await;
        service
            .repo
            .insert_message("database", "Hey, are we still meeting at the cafe tonight?", false)
            .await
            .expect("insert");
        service
            .repo
            .insert_message("database", "", false)
            .await
            .expect("insert");

        // The empty row is skipped, the real one gets a verdict.
        assert_eq!(service.process_pending(100).await, 1);

        let remaining = service.repo.find_unprocessed(100).await.expect("query");
        assert_eq!(remaining.len(), 1);
        assert!(remaining[0].message.is_empty());
    }

    #[tokio::test]
    async fn process_stored_keeps_the_rows_after_hours_flag() {
        let service = temp_service().await;
        let id = service
            .repo
            .insert_message("database", "an unknown person messaged me", true)
            .await
            .expect("insert");
        let stored = service
            .repo
            .get_message(&id)
            .await
            .expect("get")
            .expect("found");

        let payload = service.process_stored(&stored).await.expect("processed");
        // Mediate escalates because the row was submitted after-hours.
        assert_eq!(payload.result, "Fraud");
        assert_eq!(payload.meta.offline_label.as_deref(), Some("Mediate"));
    }
}
