use std::time::Duration;

use crate::service::MessageService;

const BATCH_LIMIT: i64 = 100;

/// Background loop that sweeps verdict-less rows through the classifier.
/// Runs for the life of the process; individual failures are logged and the
/// loop keeps going.
pub struct DbPoller {
    service: MessageService,
    interval: Duration,
}

impl DbPoller {
    pub fn new(service: MessageService, interval_secs: u64) -> Self {
        Self {
            service,
            interval: Duration::from_secs(interval_secs.max(1)),
        }
    }

    pub async fn run(self) {
        log::info!("DB poller started (interval={}s)", self.interval.as_secs());
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let processed = self.service.process_pending(BATCH_LIMIT).await;
            if processed > 0 {
                log::info!("Poller processed {} stored messages", processed);
            }
        }
    }
}
