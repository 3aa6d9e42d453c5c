use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use sports::{Game, GameState};
use tracing::debug;

/// Knobs that affect scoring beyond the fixed table (currently just whether
/// the live-game boost applies at all).
#[derive(Debug, Clone, Copy)]
pub struct Rules {
    pub live: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Self { live: true }
    }
}

/// An active manual override: pin a specific event id until it expires.
#[derive(Debug, Clone)]
pub struct ManualOverride {
    pub event_id: String,
    pub expires_at: DateTime<Utc>,
}

/// One scored candidate, kept around for the alternatives list.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub game: Game,
    pub score: i64,
    pub rationale: Vec<String>,
}

/// The outcome of `choose_featured`: the winner plus the runner-up field for
/// observability.
#[derive(Debug, Clone)]
pub struct Decision {
    pub game: Game,
    pub rationale: Vec<String>,
    pub alternatives: Vec<ScoredCandidate>,
}

/// Picks the single game to render this tick, per the scoring table.
///
/// `league_priority_order` gives the configured league codes in priority
/// order (index 0 = highest). `favorites_by_league` maps league code to a
/// list of favorite team identifiers (id, name, or abbr — matched case
/// insensitively).
pub fn choose_featured(
    games_by_league: &HashMap<String, Vec<Game>>,
    league_priority_order: &[String],
    now_local: DateTime<Tz>,
    favorites_by_league: &HashMap<String, Vec<String>>,
    rules: Rules,
    manual_override: Option<&ManualOverride>,
) -> Option<Decision> {
    let today = now_local.date_naive();

    let mut candidates: Vec<Game> = Vec::new();
    for (league, games) in games_by_league {
        for game in games {
            if game_local_date(game, now_local.timezone()) == today {
                candidates.push(game.clone());
            }
            let _ = league;
        }
    }

    if candidates.is_empty() {
        return None;
    }

    if let Some(ovr) = manual_override {
        if ovr.expires_at > Utc::now() {
            if let Some(game) = candidates.iter().find(|g| g.event_id == ovr.event_id) {
                return Some(Decision {
                    game: game.clone(),
                    rationale: vec!["MANUAL OVERRIDE".to_string()],
                    alternatives: vec![],
                });
            }
        }
    }

    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|game| score_game(&game, league_priority_order, favorites_by_league, rules))
        .collect();

    // Highest score first; ties broken by earlier start_time.
    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.game.start_time.cmp(&b.game.start_time))
    });

    let winner = scored.remove(0);
    let alternatives: Vec<ScoredCandidate> = scored.into_iter().take(5).collect();

    debug!(
        "featured game {} ({}) score={} rationale={:?}",
        winner.game.event_id, winner.game.league, winner.score, winner.rationale
    );

    Some(Decision {
        game: winner.game,
        rationale: winner.rationale,
        alternatives,
    })
}

fn game_local_date(game: &Game, tz: Tz) -> NaiveDate {
    game.start_time.with_timezone(&tz).date_naive()
}

fn score_game(
    game: &Game,
    league_priority_order: &[String],
    favorites_by_league: &HashMap<String, Vec<String>>,
    rules: Rules,
) -> ScoredCandidate {
    let mut score: i64 = 0;
    let mut rationale = Vec::new();

    let n = league_priority_order.len() as i64;
    if let Some(i) = league_priority_order.iter().position(|l| l == &game.league) {
        let contribution = (n - i as i64) * 1000;
        score += contribution;
        rationale.push(format!("league base ({})", game.league));
    }

    if game.state == GameState::Live && rules.live {
        score += 500;
        rationale.push("LIVE game boost".to_string());
    }

    let favorites = favorites_by_league.get(&game.league);
    let is_favorite = favorites.is_some_and(|favs| {
        favs.iter()
            .any(|f| game.home.matches_identifier(f) || game.away.matches_identifier(f))
    });
    if is_favorite {
        score += 200;
        rationale.push("favorite team".to_string());
    }

    if game.state == GameState::Live {
        let diff = game.score_diff();
        if diff <= 3 {
            score += 100;
            rationale.push("close game".to_string());
        } else if diff <= 7 {
            score += 50;
            rationale.push("somewhat close game".to_string());
        }
    }

    if game.state == GameState::Pre {
        if (0..=300).contains(&game.seconds_to_start) {
            score += 150;
            rationale.push("starting soon".to_string());
        } else if game.seconds_to_start <= 900 {
            score += 75;
            rationale.push("starting within 15 minutes".to_string());
        }
    }

    if game.state == GameState::Final {
        score -= 100;
        rationale.push("final penalty".to_string());
    }

    if game.is_overtime() {
        score += 300;
        rationale.push("overtime".to_string());
    }

    if game.is_shootout() {
        score += 400;
        rationale.push("shootout".to_string());
    }

    ScoredCandidate { game: game.clone(), score, rationale }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sports::{definitions, GameState, Team};
    use std::collections::HashMap as Map;

    fn game(league: &str, event_id: &str, state: GameState, home_score: u32, away_score: u32) -> Game {
        Game {
            league: league.into(),
            sport: definitions::hockey(),
            event_id: event_id.into(),
            start_time: Utc::now(),
            state,
            home: Team { score: home_score, ..Team::new("1", "Home Team", "HOM") },
            away: Team { score: away_score, ..Team::new("2", "Away Team", "AWY") },
            period: if state == GameState::Pre { 0 } else { 2 },
            period_name: "P2".into(),
            display_clock: "12:34".into(),
            seconds_to_start: if state == GameState::Pre { 100 } else { -1 },
            status_detail: String::new(),
            is_intermission: None,
            sport_specific: Map::new(),
        }
    }

    fn chicago_now() -> DateTime<Tz> {
        chrono_tz::America::Chicago.from_utc_datetime(&Utc::now().naive_utc())
    }

    #[test]
    fn no_games_today_returns_none() {
        let mut by_league: HashMap<String, Vec<Game>> = HashMap::new();
        let mut stale = game("nhl", "1", GameState::Live, 1, 1);
        stale.start_time = Utc::now() - chrono::Duration::days(5);
        by_league.insert("nhl".into(), vec![stale]);
        let decision = choose_featured(
            &by_league,
            &["nhl".to_string()],
            chicago_now(),
            &Map::new(),
            Rules::default(),
            None,
        );
        assert!(decision.is_none());
    }

    #[test]
    fn live_preferred_over_final_even_with_lower_league_priority() {
        let mut by_league: HashMap<String, Vec<Game>> = HashMap::new();
        by_league.insert("wnba".into(), vec![game("wnba", "1", GameState::Final, 80, 78)]);
        by_league.insert("nhl".into(), vec![game("nhl", "2", GameState::Live, 1, 1)]);

        let decision = choose_featured(
            &by_league,
            &["wnba".to_string(), "nhl".to_string()],
            chicago_now(),
            &Map::new(),
            Rules::default(),
            None,
        )
        .expect("a game is chosen");

        assert_eq!(decision.game.league, "nhl");
        assert!(decision.rationale.iter().any(|r| r == "LIVE game boost"));
        assert!(decision.rationale.iter().any(|r| r == "close game"));
    }

    #[test]
    fn favorite_team_wins_tie() {
        let mut by_league: HashMap<String, Vec<Game>> = HashMap::new();
        let mut g1 = game("nhl", "1", GameState::Live, 1, 1);
        g1.home = Team::new("1", "Seattle Kraken", "SEA");
        let g2 = game("nhl", "2", GameState::Live, 1, 1);
        by_league.insert("nhl".into(), vec![g1, g2]);

        let mut favorites = Map::new();
        favorites.insert("nhl".to_string(), vec!["SEA".to_string()]);

        let decision = choose_featured(
            &by_league,
            &["nhl".to_string()],
            chicago_now(),
            &favorites,
            Rules::default(),
            None,
        )
        .expect("a game is chosen");

        assert_eq!(decision.game.event_id, "1");
        assert_eq!(decision.alternatives.len(), 1);
    }

    #[test]
    fn manual_override_bypasses_scoring() {
        let mut by_league: HashMap<String, Vec<Game>> = HashMap::new();
        by_league.insert("nhl".into(), vec![game("nhl", "underdog", GameState::Pre, 0, 0)]);

        let ovr = ManualOverride { event_id: "underdog".into(), expires_at: Utc::now() + chrono::Duration::hours(1) };
        let decision = choose_featured(
            &by_league,
            &["nhl".to_string()],
            chicago_now(),
            &Map::new(),
            Rules::default(),
            Some(&ovr),
        )
        .expect("override wins");

        assert_eq!(decision.rationale, vec!["MANUAL OVERRIDE".to_string()]);
    }

    #[test]
    fn close_game_bonus_does_not_stack_with_somewhat_close() {
        let g = game("nhl", "1", GameState::Live, 2, 1);
        let scored = score_game(&g, &["nhl".to_string()], &Map::new(), Rules::default());
        let close_hits = scored.rationale.iter().filter(|r| r.contains("close")).count();
        assert_eq!(close_hits, 1);
    }
}
