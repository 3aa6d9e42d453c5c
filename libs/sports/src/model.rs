use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One of the three observable phases of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GameState {
    Pre,
    Live,
    Final,
}

/// How a sport names and counts its periods of play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodType {
    Quarter,
    Period,
    Inning,
}

/// Static per-sport rules needed to normalize a league's raw feed: how many
/// regulation periods it has, whether it supports overtime/shootouts, and
/// how to name a period and phrase the pregame "start" verb.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sport {
    pub code: String,
    pub name: String,
    pub period_type: PeriodType,
    pub regulation_periods: u32,
    pub has_overtime: bool,
    pub has_shootout: bool,
    /// "Drop" for hockey, "Tip" for basketball, "Start" as a generic fallback.
    pub start_verb: String,
}

impl Sport {
    /// Formats a period number into the sport's native notation, e.g. `Q3`,
    /// `P2`, `OT`, `SO`, `Inn 7`.
    pub fn period_name(&self, period: u32, is_overtime: bool, is_shootout: bool) -> String {
        if is_shootout && self.has_shootout {
            return "SO".to_string();
        }
        if is_overtime || period > self.regulation_periods {
            let ot_index = period.saturating_sub(self.regulation_periods);
            return if ot_index > 1 {
                format!("OT{ot_index}")
            } else {
                "OT".to_string()
            };
        }
        match self.period_type {
            PeriodType::Quarter => format!("Q{period}"),
            PeriodType::Period => format!("P{period}"),
            PeriodType::Inning => format!("{period}"),
        }
    }
}

pub mod definitions {
    use super::{PeriodType, Sport};

    pub fn basketball() -> Sport {
        Sport {
            code: "basketball".into(),
            name: "Basketball".into(),
            period_type: PeriodType::Quarter,
            regulation_periods: 4,
            has_overtime: true,
            has_shootout: false,
            start_verb: "Tip".into(),
        }
    }

    pub fn hockey() -> Sport {
        Sport {
            code: "hockey".into(),
            name: "Hockey".into(),
            period_type: PeriodType::Period,
            regulation_periods: 3,
            has_overtime: true,
            has_shootout: true,
            start_verb: "Drop".into(),
        }
    }

    pub fn baseball() -> Sport {
        Sport {
            code: "baseball".into(),
            name: "Baseball".into(),
            period_type: PeriodType::Inning,
            regulation_periods: 9,
            has_overtime: true,
            has_shootout: false,
            start_verb: "Start".into(),
        }
    }

    pub fn football() -> Sport {
        Sport {
            code: "football".into(),
            name: "Football".into(),
            period_type: PeriodType::Quarter,
            regulation_periods: 4,
            has_overtime: true,
            has_shootout: false,
            start_verb: "Start".into(),
        }
    }

    pub fn by_code(code: &str) -> Option<Sport> {
        match code {
            "basketball" => Some(basketball()),
            "hockey" => Some(hockey()),
            "baseball" => Some(baseball()),
            "football" => Some(football()),
            _ => None,
        }
    }
}

/// One side of a matchup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub abbr: String,
    pub score: u32,
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub logo_ref: Option<String>,
}

impl Team {
    pub fn new(id: impl Into<String>, name: impl Into<String>, abbr: impl Into<String>) -> Self {
        let abbr = abbr.into();
        let abbr = if abbr.trim().is_empty() {
            "UNK".to_string()
        } else {
            abbr.to_uppercase().chars().take(4).collect()
        };
        Self {
            id: id.into(),
            name: name.into(),
            abbr,
            score: 0,
            primary_color: None,
            secondary_color: None,
            logo_ref: None,
        }
    }

    /// Case-insensitive match against id, display name, or abbreviation —
    /// used by the priority engine's favorite-team bonus.
    pub fn matches_identifier(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.id.to_lowercase() == needle
            || self.name.to_lowercase() == needle
            || self.abbr.to_lowercase() == needle
    }
}

/// The unit the whole pipeline moves around: one league's game at a point in
/// time, normalized into a league-agnostic shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub league: String,
    pub sport: Sport,
    pub event_id: String,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub state: GameState,
    pub home: Team,
    pub away: Team,
    pub period: u32,
    pub period_name: String,
    pub display_clock: String,
    pub seconds_to_start: i64,
    pub status_detail: String,
    /// Explicit intermission flag, populated per-league where upstream data
    /// supports it. `adaptive_refresh` falls back to string-matching
    /// `display_clock` only when this is `None`.
    pub is_intermission: Option<bool>,
    pub sport_specific: HashMap<String, Value>,
}

impl Game {
    /// Checks the invariants from the data model section. Returns the first
    /// violation found, if any.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.state == GameState::Pre
            && (self.home.score != 0
                || self.away.score != 0
                || self.seconds_to_start < 0
                || self.period != 0)
        {
            return Err("PRE game must have zero scores, period=0, seconds_to_start>=0".into());
        }
        if self.state == GameState::Final {
            if self.period < self.sport.regulation_periods {
                return Err("FINAL game must have period >= regulation_periods".into());
            }
            if self.seconds_to_start != -1 {
                return Err("FINAL game must have seconds_to_start = -1".into());
            }
        }
        if self.home.abbr.is_empty() || self.away.abbr.is_empty() {
            return Err("abbr must never be empty".into());
        }
        Ok(())
    }

    pub fn is_overtime(&self) -> bool {
        self.sport_specific
            .get("is_overtime")
            .and_then(Value::as_bool)
            .unwrap_or(self.period > self.sport.regulation_periods)
    }

    pub fn is_shootout(&self) -> bool {
        self.sport_specific
            .get("is_shootout")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn score_diff(&self) -> i64 {
        (self.home.score as i64 - self.away.score as i64).abs()
    }
}

/// Minimal team record returned by `fetch_teams`, used for offline fallback
/// rosters and the asset/logo registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRecord {
    pub id: String,
    pub name: String,
    pub abbr: String,
    pub logo_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn base_game(state: GameState) -> Game {
        Game {
            league: "nhl".into(),
            sport: definitions::hockey(),
            event_id: "1".into(),
            start_time: Utc::now(),
            state,
            home: Team::new("1", "Seattle Kraken", "SEA"),
            away: Team::new("2", "Boston Bruins", "BOS"),
            period: 0,
            period_name: "P1".into(),
            display_clock: "20:00".into(),
            seconds_to_start: if state == GameState::Pre { 120 } else { -1 },
            status_detail: String::new(),
            is_intermission: None,
            sport_specific: HashMap::new(),
        }
    }

    #[test]
    fn pre_game_invariants_hold() {
        let game = base_game(GameState::Pre);
        assert!(game.check_invariants().is_ok());
    }

    #[test]
    fn pre_game_with_nonzero_score_is_rejected() {
        let mut game = base_game(GameState::Pre);
        game.home.score = 1;
        assert!(game.check_invariants().is_err());
    }

    #[test]
    fn final_game_requires_full_regulation_periods() {
        let mut game = base_game(GameState::Final);
        game.period = 2; // hockey regulation is 3
        assert!(game.check_invariants().is_err());
        game.period = 3;
        assert!(game.check_invariants().is_ok());
    }

    #[test]
    fn abbr_defaults_to_unk_when_blank() {
        let team = Team::new("1", "Mystery Team", "");
        assert_eq!(team.abbr, "UNK");
    }

    #[test]
    fn abbr_is_capped_at_four_chars_uppercase() {
        let team = Team::new("1", "Some Team", "abcdef");
        assert_eq!(team.abbr, "ABCD");
    }

    #[test]
    fn favorite_matching_is_case_insensitive_across_fields() {
        let team = Team::new("42", "Seattle Kraken", "SEA");
        assert!(team.matches_identifier("sea"));
        assert!(team.matches_identifier("Seattle Kraken"));
        assert!(team.matches_identifier("42"));
        assert!(!team.matches_identifier("BOS"));
    }

    #[test]
    fn period_naming_matches_sport_conventions() {
        let hockey = definitions::hockey();
        assert_eq!(hockey.period_name(2, false, false), "P2");
        assert_eq!(hockey.period_name(4, true, false), "OT");
        assert_eq!(hockey.period_name(0, false, true), "SO");

        let basketball = definitions::basketball();
        assert_eq!(basketball.period_name(3, false, false), "Q3");
        assert_eq!(basketball.period_name(5, true, false), "OT");

        let baseball = definitions::baseball();
        assert_eq!(baseball.period_name(7, false, false), "7");
    }
}
