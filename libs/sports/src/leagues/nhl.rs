use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use fetcher::{ttl_for_date, ResilientFetcher};
use serde_json::Value;
use tracing::warn;

use crate::leagues::{parse_state, LeagueClient, LeagueFetchResult};
use crate::model::{definitions, Game, Team, TeamRecord};

const LOGO_URL_TEMPLATE: &str = "https://assets.nhle.com/logos/nhl/svg/{abbr}_light.svg";

/// NHL league client, hitting the public `api-web.nhle.com` score feed —
/// mirrors `NHLClient` field-for-field.
pub struct NhlClient {
    fetcher: ResilientFetcher,
    static_roster: Vec<TeamRecord>,
}

impl NhlClient {
    pub fn new(fetcher: ResilientFetcher) -> Self {
        Self {
            fetcher,
            static_roster: vec![
                TeamRecord {
                    id: "55".into(),
                    name: "Seattle Kraken".into(),
                    abbr: "SEA".into(),
                    logo_url: Some(LOGO_URL_TEMPLATE.replace("{abbr}", "SEA")),
                },
                TeamRecord {
                    id: "6".into(),
                    name: "Boston Bruins".into(),
                    abbr: "BOS".into(),
                    logo_url: Some(LOGO_URL_TEMPLATE.replace("{abbr}", "BOS")),
                },
            ],
        }
    }

    fn parse_game(&self, game: &Value, now: DateTime<Utc>) -> Option<Game> {
        let event_id = game.get("id")?.as_i64()?.to_string();

        let home_team = game.get("homeTeam")?;
        let away_team = game.get("awayTeam")?;

        let home = Team {
            score: home_team.get("score").and_then(Value::as_u64).unwrap_or(0) as u32,
            ..Team::new(
                home_team.get("id").map(|v| v.to_string()).unwrap_or_default(),
                home_team
                    .get("name")
                    .and_then(|n| n.get("default"))
                    .and_then(Value::as_str)
                    .unwrap_or(""),
                home_team.get("abbrev").and_then(Value::as_str).unwrap_or(""),
            )
        };
        let away = Team {
            score: away_team.get("score").and_then(Value::as_u64).unwrap_or(0) as u32,
            ..Team::new(
                away_team.get("id").map(|v| v.to_string()).unwrap_or_default(),
                away_team
                    .get("name")
                    .and_then(|n| n.get("default"))
                    .and_then(Value::as_str)
                    .unwrap_or(""),
                away_team.get("abbrev").and_then(Value::as_str).unwrap_or(""),
            )
        };

        let start_time_str = game.get("startTimeUTC").and_then(Value::as_str)?;
        let start_time = DateTime::parse_from_rfc3339(start_time_str)
            .ok()?
            .with_timezone(&Utc);

        let state = parse_state(game.get("gameState").and_then(Value::as_str).unwrap_or(""));

        let period_descriptor = game.get("periodDescriptor");
        let current_period = period_descriptor
            .and_then(|p| p.get("number"))
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32;
        let period_type = period_descriptor
            .and_then(|p| p.get("periodType"))
            .and_then(Value::as_str)
            .unwrap_or("");
        let is_overtime = period_type == "OT";
        let is_shootout = period_type == "SO";

        let sport = definitions::hockey();
        let period_name = sport.period_name(current_period, is_overtime, is_shootout);

        let display_clock = game
            .get("clock")
            .and_then(|c| c.get("timeRemaining"))
            .and_then(Value::as_str)
            .unwrap_or("00:00")
            .to_string();

        let seconds_to_start = if state == crate::model::GameState::Pre {
            (start_time - now).num_seconds().max(0)
        } else {
            -1
        };

        let status_detail = game
            .get("gameScheduleState")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(&period_name)
            .to_string();

        let mut sport_specific = HashMap::new();
        sport_specific.insert("is_overtime".into(), Value::Bool(is_overtime));
        sport_specific.insert("is_shootout".into(), Value::Bool(is_shootout));
        sport_specific.insert("period_type".into(), Value::String(period_type.to_string()));

        let period = if state == crate::model::GameState::Pre { 0 } else { current_period };

        Some(Game {
            league: "nhl".into(),
            sport,
            event_id,
            start_time,
            state,
            home,
            away,
            period,
            period_name,
            display_clock,
            seconds_to_start,
            status_detail,
            is_intermission: Some(display_clock_hints_intermission(period_type)),
            sport_specific,
        })
    }
}

fn display_clock_hints_intermission(period_type: &str) -> bool {
    period_type.eq_ignore_ascii_case("INT")
}

#[async_trait::async_trait]
impl LeagueClient for NhlClient {
    fn code(&self) -> &str {
        "nhl"
    }

    async fn fetch_games(&mut self, date: NaiveDate) -> LeagueFetchResult {
        let datestr = date.format("%Y-%m-%d").to_string();
        let days_from_today = (date - Utc::now().date_naive()).num_days();
        let ttl = ttl_for_date(days_from_today);

        let body = self
            .fetcher
            .get(&format!("/score/{datestr}"), &[], Some(ttl), true)
            .await;

        let Some(body) = body else {
            // No live feed and no cache: surface the fallback flag with an
            // empty game list rather than mistaking roster data for games.
            return LeagueFetchResult { games: vec![], used_static_fallback: true };
        };

        let parsed: Value = match serde_json::from_str(&body) {
            Ok(v) => v,
            Err(e) => {
                warn!("failed to parse NHL scoreboard JSON: {}", e);
                return LeagueFetchResult { games: vec![], used_static_fallback: false };
            }
        };

        let now = Utc::now();
        let mut games = Vec::new();
        if let Some(arr) = parsed.get("games").and_then(Value::as_array) {
            for raw in arr {
                match self.parse_game(raw, now) {
                    Some(g) => games.push(g),
                    None => warn!("skipping unparseable NHL game record"),
                }
            }
        }

        LeagueFetchResult { games, used_static_fallback: false }
    }

    async fn fetch_teams(&mut self) -> Vec<TeamRecord> {
        let body = self.fetcher.get("/teams", &[], Some(86400), true).await;
        let Some(body) = body else {
            return self.static_roster.clone();
        };
        let parsed: Value = match serde_json::from_str(&body) {
            Ok(v) => v,
            Err(_) => return self.static_roster.clone(),
        };
        parsed
            .get("teams")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .map(|t| TeamRecord {
                        id: t.get("id").map(|v| v.to_string()).unwrap_or_default(),
                        name: t.get("fullName").and_then(Value::as_str).unwrap_or("").to_string(),
                        abbr: t.get("triCode").and_then(Value::as_str).unwrap_or("").to_string(),
                        logo_url: t
                            .get("triCode")
                            .and_then(Value::as_str)
                            .map(|a| LOGO_URL_TEMPLATE.replace("{abbr}", &a.to_uppercase())),
                    })
                    .collect()
            })
            .unwrap_or_else(|| self.static_roster.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fetcher::FetcherConfig;
    use serde_json::json;

    fn client() -> NhlClient {
        NhlClient::new(ResilientFetcher::new(FetcherConfig::new("https://api-web.nhle.com/v1")))
    }

    #[test]
    fn parses_live_game_with_overtime_marker() {
        let c = client();
        let raw = json!({
            "id": 2025020001_i64,
            "homeTeam": {"id": 55, "name": {"default": "Kraken"}, "abbrev": "SEA", "score": 3},
            "awayTeam": {"id": 6, "name": {"default": "Bruins"}, "abbrev": "BOS", "score": 2},
            "gameState": "LIVE",
            "startTimeUTC": "2026-01-01T00:00:00Z",
            "periodDescriptor": {"number": 4, "periodType": "OT"},
            "clock": {"timeRemaining": "03:12"},
            "gameScheduleState": "OK",
        });
        let game = c.parse_game(&raw, Utc::now()).expect("parses");
        assert_eq!(game.period_name, "OT");
        assert!(game.is_overtime());
        assert_eq!(game.home.abbr, "SEA");
        assert_eq!(game.away.score, 2);
    }

    #[test]
    fn missing_event_id_is_skipped() {
        let c = client();
        let raw = json!({"homeTeam": {}, "awayTeam": {}});
        assert!(c.parse_game(&raw, Utc::now()).is_none());
    }
}
