//! Synthesizes games locally instead of fetching, for `--demo` mode.
//! Produces one live game per requested league code, rotating which one
//! carries a close score so the priority engine has something interesting
//! to pick between.

use std::collections::HashMap;

use chrono::Utc;
use sports::{Game, GameState, Sport, Team};

pub fn synthesize_games(league_codes: &[String], rotation_step: u64) -> HashMap<String, Vec<Game>> {
    let mut games = HashMap::new();
    for (i, code) in league_codes.iter().enumerate() {
        let sport = sport_for_league(code);
        let close = (rotation_step as usize + i) % league_codes.len().max(1) == 0;
        let (home_score, away_score) = if close { (2, 3) } else { (10, 1) };
        let game = Game {
            league: code.clone(),
            sport: sport.clone(),
            event_id: format!("demo-{code}-{rotation_step}"),
            start_time: Utc::now() - chrono::Duration::minutes(20),
            state: GameState::Live,
            home: demo_team("home", "Home", "HOM", home_score),
            away: demo_team("away", "Away", "AWY", away_score),
            period: 2,
            period_name: sport.period_name(2, false, false),
            display_clock: "08:42".to_string(),
            seconds_to_start: -1,
            status_detail: "2nd".to_string(),
            is_intermission: Some(false),
            sport_specific: Default::default(),
        };
        games.insert(code.clone(), vec![game]);
    }
    games
}

fn demo_team(id: &str, name: &str, abbr: &str, score: u32) -> Team {
    let mut team = Team::new(id, name, abbr);
    team.score = score;
    team
}

fn sport_for_league(code: &str) -> Sport {
    match code {
        "nhl" => sports::definitions::hockey(),
        "wnba" | "nba" => sports::definitions::basketball(),
        _ => sports::definitions::basketball(),
    }
}
