use chrono::{DateTime, Duration, Utc};
use sports::{Game, GameState};

const INTERMISSION_LEXICON: &[&str] = &[
    "halftime",
    "break",
    "timeout",
    "commercial",
    "review",
    "intermission",
    "end",
];

/// Network condition bucket, driving a multiplicative slowdown when the
/// upstream has been flaky recently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkCondition {
    Excellent,
    Good,
    Poor,
    Critical,
}

impl NetworkCondition {
    fn multiplier(self) -> f64 {
        match self {
            NetworkCondition::Excellent => 1.0,
            NetworkCondition::Good => 1.2,
            NetworkCondition::Poor => 1.5,
            NetworkCondition::Critical => 2.0,
        }
    }
}

/// Base polling cadence per game state, before adaptive adjustments.
#[derive(Debug, Clone, Copy)]
pub struct RefreshConfig {
    pub pregame_sec: u32,
    pub live_sec: u32,
    pub final_sec: u32,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self { pregame_sec: 30, live_sec: 5, final_sec: 60 }
    }
}

/// Adaptive refresh controller: tracks network health and game-state
/// transitions across ticks, and computes the next poll interval. Ported
/// field-for-field from the original `AdaptiveRefreshManager`.
pub struct AdaptiveRefreshController {
    base: RefreshConfig,
    request_count: u32,
    failure_count: u32,
    last_failure_at: Option<DateTime<Utc>>,
    last_score_change_at: Option<DateTime<Utc>>,
    stable_tick_run: u32,
    last_seen_snapshot: Option<Game>,
}

impl AdaptiveRefreshController {
    pub fn new(base: RefreshConfig) -> Self {
        Self {
            base,
            request_count: 0,
            failure_count: 0,
            last_failure_at: None,
            last_score_change_at: None,
            stable_tick_run: 0,
            last_seen_snapshot: None,
        }
    }

    pub fn record_success(&mut self) {
        self.request_count += 1;
    }

    pub fn record_failure(&mut self, now: DateTime<Utc>) {
        self.request_count += 1;
        self.failure_count += 1;
        self.last_failure_at = Some(now);
    }

    fn network_condition(&self, now: DateTime<Utc>) -> NetworkCondition {
        if self.request_count < 3 {
            return NetworkCondition::Excellent;
        }
        let failure_rate = self.failure_count as f64 / self.request_count as f64;
        let recent_failure = self
            .last_failure_at
            .is_some_and(|t| now - t < Duration::minutes(5));

        let mut condition = if failure_rate == 0.0 {
            NetworkCondition::Excellent
        } else if failure_rate < 0.1 {
            NetworkCondition::Good
        } else if failure_rate < 0.3 {
            NetworkCondition::Poor
        } else {
            NetworkCondition::Critical
        };

        if recent_failure {
            condition = match condition {
                NetworkCondition::Excellent => NetworkCondition::Good,
                NetworkCondition::Good => NetworkCondition::Poor,
                other => other,
            };
        }
        condition
    }

    fn base_interval(&self, snapshot: Option<&Game>) -> u32 {
        match snapshot {
            None => self.base.final_sec.max(30),
            Some(g) => match g.state {
                GameState::Pre => self.base.pregame_sec,
                GameState::Live => self.base.live_sec,
                GameState::Final => self.base.final_sec,
            },
        }
    }

    fn game_state_multiplier(&self, snapshot: &Game, now: DateTime<Utc>) -> f64 {
        match snapshot.state {
            GameState::Pre => {
                let s = snapshot.seconds_to_start;
                if (0..=300).contains(&s) {
                    0.5
                } else if (0..=600).contains(&s) {
                    0.7
                } else if s > 3600 {
                    2.0
                } else {
                    1.0
                }
            }
            GameState::Live => {
                if self.is_intermission(snapshot) {
                    1.5
                } else if self.has_recent_score_change(now) {
                    0.8
                } else if self.stable_tick_run >= 5 {
                    1.3
                } else {
                    1.0
                }
            }
            GameState::Final => {
                let hours_since_end = self.estimate_hours_since_end(snapshot, now);
                if hours_since_end > 2.0 {
                    2.0
                } else {
                    1.0
                }
            }
        }
    }

    fn is_intermission(&self, snapshot: &Game) -> bool {
        if let Some(flag) = snapshot.is_intermission {
            return flag;
        }
        let clock = snapshot.display_clock.to_lowercase();
        INTERMISSION_LEXICON.iter().any(|w| clock.contains(w))
    }

    fn has_recent_score_change(&self, now: DateTime<Utc>) -> bool {
        self.last_score_change_at
            .is_some_and(|t| now - t < Duration::seconds(120))
    }

    fn estimate_hours_since_end(&self, snapshot: &Game, now: DateTime<Utc>) -> f64 {
        let estimated_end = snapshot.start_time + Duration::minutes(150);
        let delta = now - estimated_end;
        (delta.num_seconds() as f64 / 3600.0).max(0.0)
    }

    fn update_game_tracking(&mut self, snapshot: &Game, now: DateTime<Utc>) {
        if let Some(last) = &self.last_seen_snapshot {
            let last_total = last.home.score + last.away.score;
            let current_total = snapshot.home.score + snapshot.away.score;
            if current_total != last_total {
                self.last_score_change_at = Some(now);
                self.stable_tick_run = 0;
            } else {
                self.stable_tick_run += 1;
            }
        }
        self.last_seen_snapshot = Some(snapshot.clone());
    }

    /// Computes the next poll interval in seconds, clamped to [5, 300].
    pub fn next_interval(&mut self, snapshot: Option<&Game>, now: DateTime<Utc>) -> u32 {
        let base = self.base_interval(snapshot);
        let network_multiplier = self.network_condition(now).multiplier();
        let mut interval = base as f64 * network_multiplier;

        if let Some(snapshot) = snapshot {
            interval *= self.game_state_multiplier(snapshot, now);
            self.update_game_tracking(snapshot, now);
        }

        interval.round().clamp(5.0, 300.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sports::{definitions, Team};
    use std::collections::HashMap;

    fn live_game(home: u32, away: u32, clock: &str) -> Game {
        Game {
            league: "nhl".into(),
            sport: definitions::hockey(),
            event_id: "1".into(),
            start_time: Utc::now() - Duration::hours(1),
            state: GameState::Live,
            home: Team { score: home, ..Team::new("1", "Home", "HOM") },
            away: Team { score: away, ..Team::new("2", "Away", "AWY") },
            period: 2,
            period_name: "P2".into(),
            display_clock: clock.into(),
            seconds_to_start: -1,
            status_detail: String::new(),
            is_intermission: None,
            sport_specific: HashMap::new(),
        }
    }

    #[test]
    fn interval_is_always_within_bounds() {
        let mut controller = AdaptiveRefreshController::new(RefreshConfig::default());
        for _ in 0..20 {
            controller.record_failure(Utc::now());
        }
        let interval = controller.next_interval(None, Utc::now());
        assert!((5..=300).contains(&interval));
    }

    #[test]
    fn no_snapshot_uses_final_sec_floor() {
        let mut controller = AdaptiveRefreshController::new(RefreshConfig { final_sec: 10, ..Default::default() });
        let interval = controller.next_interval(None, Utc::now());
        assert_eq!(interval, 30); // max(30, 10)
    }

    #[test]
    fn intermission_clock_text_slows_refresh() {
        let mut controller = AdaptiveRefreshController::new(RefreshConfig::default());
        let g = live_game(1, 1, "Halftime");
        let interval = controller.next_interval(Some(&g), Utc::now());
        // live_sec(5) * 1.5 = 7.5 -> rounds to 8
        assert_eq!(interval, 8);
    }

    #[test]
    fn stable_ticks_eventually_slow_refresh() {
        let mut controller = AdaptiveRefreshController::new(RefreshConfig::default());
        let g = live_game(1, 1, "12:00");
        let now = Utc::now();
        for _ in 0..6 {
            controller.next_interval(Some(&g), now);
        }
        let interval = controller.next_interval(Some(&g), now);
        assert_eq!(interval, 7); // live_sec(5) * 1.3 = 6.5 -> rounds to 7
    }

    #[test]
    fn critical_network_doubles_interval() {
        let mut controller = AdaptiveRefreshController::new(RefreshConfig::default());
        let now = Utc::now();
        for _ in 0..10 {
            controller.record_failure(now);
        }
        let interval = controller.next_interval(None, now);
        // final_sec(60) * 2.0 = 120
        assert_eq!(interval, 120);
    }
}
