use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::warn;

use crate::leagues::LeagueClient;
use crate::model::Game;

/// Fans a date out across every enabled league client, isolating per-league
/// failures so one dead upstream never blanks the whole board.
pub async fn all_games(
    date: NaiveDate,
    clients: &mut [Box<dyn LeagueClient>],
) -> HashMap<String, Vec<Game>> {
    let mut result = HashMap::new();
    for client in clients.iter_mut() {
        let code = client.code().to_string();
        let outcome = client.fetch_games(date).await;
        if outcome.used_static_fallback {
            warn!("league {} fell back to static roster (no live data)", code);
        }
        let games = outcome
            .games
            .into_iter()
            .filter(|game| match game.check_invariants() {
                Ok(()) => true,
                Err(reason) => {
                    warn!("league {} dropped game {} failing invariants: {}", code, game.event_id, reason);
                    false
                }
            })
            .collect();
        result.insert(code, games);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leagues::LeagueFetchResult;
    use crate::model::{GameState, TeamRecord};
    use async_trait::async_trait;

    struct StubClient {
        code: &'static str,
        games: Vec<Game>,
    }

    #[async_trait]
    impl LeagueClient for StubClient {
        fn code(&self) -> &str {
            self.code
        }
        async fn fetch_games(&mut self, _date: NaiveDate) -> LeagueFetchResult {
            LeagueFetchResult { games: self.games.clone(), used_static_fallback: false }
        }
        async fn fetch_teams(&mut self) -> Vec<TeamRecord> {
            vec![]
        }
    }

    #[tokio::test]
    async fn aggregates_each_league_independently() {
        let mut clients: Vec<Box<dyn LeagueClient>> = vec![
            Box::new(StubClient { code: "nhl", games: vec![] }),
            Box::new(StubClient { code: "wnba", games: vec![] }),
        ];
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let result = all_games(date, &mut clients).await;
        assert!(result.contains_key("nhl"));
        assert!(result.contains_key("wnba"));
    }

    fn sample_game(state: GameState) -> Game {
        Game {
            league: "nhl".into(),
            sport: crate::model::definitions::hockey(),
            event_id: "1".into(),
            start_time: chrono::Utc::now(),
            state,
            home: crate::model::Team::new("1", "Seattle Kraken", "SEA"),
            away: crate::model::Team::new("2", "Boston Bruins", "BOS"),
            period: 0,
            period_name: "P1".into(),
            display_clock: "20:00".into(),
            seconds_to_start: 120,
            status_detail: String::new(),
            is_intermission: None,
            sport_specific: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn games_failing_invariants_are_dropped_not_returned() {
        let mut bad = sample_game(GameState::Pre);
        bad.home.score = 7; // PRE games must have zero scores
        let good = sample_game(GameState::Pre);

        let mut clients: Vec<Box<dyn LeagueClient>> =
            vec![Box::new(StubClient { code: "nhl", games: vec![bad, good] })];
        let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let result = all_games(date, &mut clients).await;
        assert_eq!(result["nhl"].len(), 1);
    }
}
