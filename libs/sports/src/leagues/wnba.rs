use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use fetcher::{ttl_for_date, ResilientFetcher};
use serde_json::Value;
use tracing::warn;

use crate::leagues::{parse_state, LeagueClient, LeagueFetchResult};
use crate::model::{definitions, Game, GameState, Team, TeamRecord};

/// ESPN-backed league client shared in shape by WNBA and NBA — both expose
/// the same `site.api.espn.com` scoreboard schema, differing only in sport
/// path and team-count expectations.
pub struct EspnBasketballClient {
    league_code: &'static str,
    scoreboard_path: &'static str,
    fetcher: ResilientFetcher,
    static_roster: Vec<TeamRecord>,
}

impl EspnBasketballClient {
    pub fn wnba(fetcher: ResilientFetcher) -> Self {
        Self {
            league_code: "wnba",
            scoreboard_path: "/scoreboard",
            fetcher,
            static_roster: vec![
                TeamRecord { id: "1".into(), name: "Seattle Storm".into(), abbr: "SEA".into(), logo_url: None },
                TeamRecord { id: "2".into(), name: "New York Liberty".into(), abbr: "NY".into(), logo_url: None },
            ],
        }
    }

    pub fn nba(fetcher: ResilientFetcher) -> Self {
        Self {
            league_code: "nba",
            scoreboard_path: "/scoreboard",
            fetcher,
            static_roster: vec![
                TeamRecord { id: "1".into(), name: "Boston Celtics".into(), abbr: "BOS".into(), logo_url: None },
                TeamRecord { id: "2".into(), name: "Los Angeles Lakers".into(), abbr: "LAL".into(), logo_url: None },
            ],
        }
    }

    fn parse_game(&self, event: &Value, now: DateTime<Utc>) -> Option<Game> {
        let event_id = event.get("id").and_then(Value::as_str)?.to_string();

        let competition = event.get("competitions")?.as_array()?.first()?;
        let competitors = competition.get("competitors")?.as_array()?;

        let home_raw = competitors
            .iter()
            .find(|c| c.get("homeAway").and_then(Value::as_str) == Some("home"))?;
        let away_raw = competitors
            .iter()
            .find(|c| c.get("homeAway").and_then(Value::as_str) == Some("away"))?;

        let parse_team = |competitor: &Value| -> Team {
            let team = competitor.get("team").cloned().unwrap_or(Value::Null);
            let name = team
                .get("displayName")
                .or_else(|| team.get("name"))
                .and_then(Value::as_str)
                .unwrap_or("");
            let abbr = team
                .get("abbreviation")
                .and_then(Value::as_str)
                .unwrap_or("");
            let id = team.get("id").and_then(Value::as_str).unwrap_or("").to_string();
            let score = competitor
                .get("score")
                .and_then(|v| v.as_str().map(|s| s.parse::<u32>().unwrap_or(0)).or_else(|| v.as_u64().map(|n| n as u32)))
                .unwrap_or(0);
            Team { score, ..Team::new(id, name, abbr) }
        };

        let home = parse_team(home_raw);
        let away = parse_team(away_raw);

        let status = competition.get("status")?.get("type")?;
        let state_str = status.get("state").and_then(Value::as_str).unwrap_or("");
        let state = parse_state(state_str);

        let start_time_str = event.get("date").and_then(Value::as_str)?;
        let start_time = DateTime::parse_from_rfc3339(start_time_str)
            .ok()?
            .with_timezone(&Utc);

        let status_block = competition.get("status");
        let period = status_block
            .and_then(|s| s.get("period"))
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32;
        let display_clock = status_block
            .and_then(|s| s.get("displayClock"))
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        let sport = definitions::basketball();
        let is_overtime = period > sport.regulation_periods;
        let period_name = sport.period_name(period, is_overtime, false);

        let seconds_to_start = if state == GameState::Pre {
            (start_time - now).num_seconds().max(0)
        } else {
            -1
        };

        let status_detail = status
            .get("detail")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(&period_name)
            .to_string();

        let mut sport_specific = HashMap::new();
        sport_specific.insert("is_overtime".into(), Value::Bool(is_overtime));

        let period = if state == GameState::Pre { 0 } else { period };

        Some(Game {
            league: self.league_code.into(),
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
            is_intermission: None,
            sport_specific,
        })
    }
}

#[async_trait::async_trait]
impl LeagueClient for EspnBasketballClient {
    fn code(&self) -> &str {
        self.league_code
    }

    async fn fetch_games(&mut self, date: NaiveDate) -> LeagueFetchResult {
        let datestr = date.format("%Y%m%d").to_string();
        let days_from_today = (date - Utc::now().date_naive()).num_days();
        let ttl = ttl_for_date(days_from_today);

        let body = self
            .fetcher
            .get(self.scoreboard_path, &[("dates", datestr.as_str())], Some(ttl), true)
            .await;

        let Some(body) = body else {
            return LeagueFetchResult { games: vec![], used_static_fallback: true };
        };

        let parsed: Value = match serde_json::from_str(&body) {
            Ok(v) => v,
            Err(e) => {
                warn!("failed to parse {} scoreboard JSON: {}", self.league_code, e);
                return LeagueFetchResult { games: vec![], used_static_fallback: false };
            }
        };

        let now = Utc::now();
        let mut games = Vec::new();
        if let Some(events) = parsed.get("events").and_then(Value::as_array) {
            for event in events {
                match self.parse_game(event, now) {
                    Some(g) => games.push(g),
                    None => warn!("skipping unparseable {} game record", self.league_code),
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
            .pointer("/sports/0/leagues/0/teams")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|entry| entry.get("team"))
                    .map(|t| TeamRecord {
                        id: t.get("id").and_then(Value::as_str).unwrap_or("").to_string(),
                        name: t.get("displayName").and_then(Value::as_str).unwrap_or("").to_string(),
                        abbr: t.get("abbreviation").and_then(Value::as_str).unwrap_or("").to_string(),
                        logo_url: t
                            .get("logos")
                            .and_then(Value::as_array)
                            .and_then(|a| a.first())
                            .and_then(|l| l.get("href"))
                            .and_then(Value::as_str)
                            .map(String::from),
                    })
                    .collect()
            })
            .unwrap_or_else(|| self.static_roster.clone())
    }
}
