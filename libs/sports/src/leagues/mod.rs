pub mod nba;
pub mod nhl;
pub mod wnba;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::model::{Game, GameState, TeamRecord};

/// Result of one `fetch_games` call, carrying the offline-fallback flag so
/// callers never mistake a bundled static roster for a live feed.
pub struct LeagueFetchResult {
    pub games: Vec<Game>,
    pub used_static_fallback: bool,
}

#[async_trait]
pub trait LeagueClient: Send + Sync {
    fn code(&self) -> &str;
    async fn fetch_games(&mut self, date: NaiveDate) -> LeagueFetchResult;
    async fn fetch_teams(&mut self) -> Vec<TeamRecord>;
}

/// Maps an upstream status string onto the three-state model, per C2's
/// parsing contract.
pub fn parse_state(raw: &str) -> GameState {
    let lower = raw.to_lowercase();
    match lower.as_str() {
        "pre" | "scheduled" | "pregame" | "status_scheduled" => GameState::Pre,
        "post" | "final" | "finished" | "complete" | "status_final" => GameState::Final,
        _ => GameState::Live,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_mapping_covers_documented_values() {
        assert_eq!(parse_state("pre"), GameState::Pre);
        assert_eq!(parse_state("SCHEDULED"), GameState::Pre);
        assert_eq!(parse_state("pregame"), GameState::Pre);
        assert_eq!(parse_state("post"), GameState::Final);
        assert_eq!(parse_state("Final"), GameState::Final);
        assert_eq!(parse_state("finished"), GameState::Final);
        assert_eq!(parse_state("complete"), GameState::Final);
        assert_eq!(parse_state("in"), GameState::Live);
        assert_eq!(parse_state("live"), GameState::Live);
        assert_eq!(parse_state("whatever-unknown"), GameState::Live);
    }
}
