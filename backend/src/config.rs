use chrono::Timelike;

/// Runtime settings, collected once at startup. Every field has a default
/// and an environment override so the binary runs with no configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub database_url: String,
    pub google_api_key: Option<String>,
    /// Local hour (0-23) from which submissions count as after-hours.
    pub after_hours_start: u32,
    pub poll_interval_secs: u64,
    pub poller_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".into(),
            database_url: "sqlite://./data/upay.db".into(),
            google_api_key: None,
            after_hours_start: 21,
            poll_interval_secs: 60,
            poller_enabled: true,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(v) = std::env::var("PORT") {
        settings.bind_addr = format!("0.0.0.0:{}", v);
    }
    if let Ok(v) = std::env::var("BIND_ADDR") {
        settings.bind_addr = v;
    }
    if let Ok(v) = std::env::var("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Ok(v) = std::env::var("GOOGLE_API_KEY") {
        if !v.trim().is_empty() {
            settings.google_api_key = Some(v);
        }
    }
    if let Ok(v) = std::env::var("AFTER_HOURS_START") {
        if let Ok(hour) = v.parse::<u32>() {
            if hour < 24 {
                settings.after_hours_start = hour;
            }
        }
    }
    if let Ok(v) = std::env::var("POLL_INTERVAL_SECS") {
        if let Ok(secs) = v.parse::<u64>() {
            settings.poll_interval_secs = secs;
        }
    }
    if let Ok(v) = std::env::var("DISABLE_POLLER") {
        let v = v.to_lowercase();
        if v == "1" || v == "true" || v == "yes" {
            settings.poller_enabled = false;
        }
    }

    settings
}

impl Settings {
    pub fn is_after_hours<T: Timelike>(&self, now: &T) -> bool {
        now.hour() >= self.after_hours_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn after_hours_uses_configured_threshold() {
        let settings = Settings::default();
        let evening = NaiveTime::from_hms_opt(21, 0, 0).unwrap();
        let afternoon = NaiveTime::from_hms_opt(14, 30, 0).unwrap();
        assert!(settings.is_after_hours(&evening));
        assert!(!settings.is_after_hours(&afternoon));

        let strict = Settings {
            after_hours_start: 18,
            ..Settings::default()
        };
        assert!(strict.is_after_hours(&NaiveTime::from_hms_opt(18, 0, 0).unwrap()));
    }

    #[test]
    fn defaults_are_self_contained() {
        let settings = Settings::default();
        assert_eq!(settings.bind_addr, "0.0.0.0:8000");
        assert!(settings.poller_enabled);
        assert!(settings.google_api_key.is_none());
    }
}
