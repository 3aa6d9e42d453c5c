//! Periodic liveness beacon, lifted in shape from the teacher's
//! `polymarket::utils::heartbeat::Heartbeat` and repurposed to post a
//! last-seen timestamp to the cloud config store instead of logging.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::warn;

pub struct Heartbeat {
    interval: Duration,
    last_beat: DateTime<Utc>,
}

impl Heartbeat {
    pub fn new(interval_secs: u64) -> Self {
        Self { interval: Duration::from_secs(interval_secs), last_beat: Utc::now() }
    }

    pub fn should_beat(&self) -> bool {
        let elapsed = Utc::now().signed_duration_since(self.last_beat);
        elapsed.to_std().unwrap_or_default() >= self.interval
    }

    pub fn beat(&mut self) {
        self.last_beat = Utc::now();
    }

    /// Posts the last-seen timestamp to the cloud endpoint. Failure is
    /// isolated here — the caller's main loop must never stall on it.
    pub async fn post_last_seen(&mut self, client: &reqwest::Client, url: &str, device_id: &str) {
        let body = serde_json::json!({ "device_id": device_id, "last_seen": Utc::now().to_rfc3339() });
        match client.post(url).json(&body).send().await {
            Ok(resp) if resp.status().is_success() => self.beat(),
            Ok(resp) => warn!(status = %resp.status(), "heartbeat post rejected"),
            Err(e) => warn!(error = %e, "heartbeat post failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_beat_immediately_after_construction() {
        let hb = Heartbeat::new(300);
        assert!(!hb.should_beat());
    }

    #[test]
    fn beat_resets_the_window() {
        let mut hb = Heartbeat::new(0);
        assert!(hb.should_beat());
        hb.beat();
        assert!(hb.should_beat()); // interval of 0 always elapses
    }
}
