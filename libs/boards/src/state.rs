use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use sports::Game;

/// Possible board display states, driving which rotation table applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardState {
    Idle,
    Pregame,
    Live,
    Intermission,
    Postgame,
    Alert,
    Manual,
}

/// Ordered rotation of board names for a given [`BoardState`].
#[derive(Debug, Clone)]
pub struct BoardRotation {
    pub boards: Vec<String>,
    pub cycle_duration_secs: u64,
    pub enabled: bool,
}

impl BoardRotation {
    fn new(boards: &[&str], cycle_duration_secs: u64) -> Self {
        Self {
            boards: boards.iter().map(|s| s.to_string()).collect(),
            cycle_duration_secs,
            enabled: true,
        }
    }
}

/// One step in the transition history ring buffer.
#[derive(Debug, Clone)]
pub struct BoardTransition {
    pub from_board: String,
    pub to_board: String,
}

const TRANSITION_HISTORY_CAP: usize = 100;

/// Determines the current [`BoardState`] from a tick's snapshot and tracks
/// rotation progress within that state.
pub struct StateManager {
    current_state: BoardState,
    previous_state: BoardState,
    state_start: Instant,
    rotation_index: usize,
    last_rotation: Instant,
    rotations: HashMap<BoardState, BoardRotation>,
    transition_history: Vec<BoardTransition>,
}

impl Default for StateManager {
    fn default() -> Self {
        // standings/schedule/team_stats are deliberately absent from every
        // default rotation: nothing in this crate's data model (no
        // standings/schedule fetch, see libs/sports's league client
        // contract) backs real content for them, and a board that only
        // paints a blank screen must not occupy a default rotation slot.
        // They remain available as plugin board kinds (registry.rs's
        // `instantiate_kind`) for a deployment that wires up real data.
        let mut rotations = HashMap::new();
        rotations.insert(BoardState::Idle, BoardRotation::new(&["clock"], 90));
        rotations.insert(BoardState::Pregame, BoardRotation::new(&["scoreboard"], 60));
        rotations.insert(BoardState::Live, BoardRotation::new(&["scoreboard"], 0));
        rotations.insert(BoardState::Intermission, BoardRotation::new(&["scoreboard"], 90));
        rotations.insert(BoardState::Postgame, BoardRotation::new(&["scoreboard"], 120));
        rotations.insert(BoardState::Alert, BoardRotation::new(&["alert"], 0));
        rotations.insert(BoardState::Manual, BoardRotation::new(&[], 0));

        let now = Instant::now();
        Self {
            current_state: BoardState::Idle,
            previous_state: BoardState::Idle,
            state_start: now,
            rotation_index: 0,
            last_rotation: now,
            rotations,
            transition_history: Vec::new(),
        }
    }
}

impl StateManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_state(&self) -> BoardState {
        self.current_state
    }

    /// Decides the board state for this tick from the featured game snapshot
    /// and the current local time, per the PRE/LIVE/FINAL rules.
    pub fn determine_state(&self, snapshot: Option<&Game>, now: DateTime<Utc>) -> BoardState {
        let Some(game) = snapshot else {
            return BoardState::Idle;
        };
        use sports::GameState;
        match game.state {
            GameState::Pre => {
                if game.seconds_to_start > 0 && game.seconds_to_start <= 1800 {
                    BoardState::Pregame
                } else {
                    BoardState::Idle
                }
            }
            GameState::Live => {
                if game.is_intermission.unwrap_or(false) {
                    BoardState::Intermission
                } else {
                    BoardState::Live
                }
            }
            GameState::Final => {
                let estimated_end = game.start_time + chrono::Duration::minutes(150);
                let time_since_end = now.signed_duration_since(estimated_end).num_seconds();
                if time_since_end < 3600 {
                    BoardState::Postgame
                } else {
                    BoardState::Idle
                }
            }
        }
    }

    /// Updates current state, returning true if it actually changed. A
    /// state change resets rotation progress.
    pub fn update_state(&mut self, new_state: BoardState) -> bool {
        if new_state != self.current_state {
            self.previous_state = self.current_state;
            self.current_state = new_state;
            self.state_start = Instant::now();
            self.rotation_index = 0;
            self.last_rotation = Instant::now();
            true
        } else {
            false
        }
    }

    pub fn current_board_sequence(&self) -> &[String] {
        match self.rotations.get(&self.current_state) {
            Some(r) if r.enabled => &r.boards,
            _ => &[],
        }
    }

    /// Advances and returns the board name due for display right now,
    /// rotating on a fixed per-board interval if the state's rotation is
    /// enabled and has more than one board.
    pub fn next_board_in_rotation(&mut self) -> Option<String> {
        let rotation = self.rotations.get(&self.current_state)?;
        if !rotation.enabled || rotation.boards.is_empty() {
            return None;
        }
        let boards = rotation.boards.clone();
        if rotation.cycle_duration_secs > 0 && boards.len() > 1 {
            let time_per_board = Duration::from_secs(rotation.cycle_duration_secs) / boards.len() as u32;
            if self.last_rotation.elapsed() >= time_per_board {
                self.rotation_index = (self.rotation_index + 1) % boards.len();
                self.last_rotation = Instant::now();
            }
        }
        boards.get(self.rotation_index).cloned()
    }

    pub fn should_force_board(&self, board_name: &str) -> bool {
        match self.current_state {
            BoardState::Live => board_name.starts_with("scoreboard"),
            BoardState::Alert => board_name == "alert",
            _ => false,
        }
    }

    pub fn record_transition(&mut self, from_board: &str, to_board: &str) {
        self.transition_history.push(BoardTransition {
            from_board: from_board.to_string(),
            to_board: to_board.to_string(),
        });
        if self.transition_history.len() > TRANSITION_HISTORY_CAP {
            let overflow = self.transition_history.len() - TRANSITION_HISTORY_CAP;
            self.transition_history.drain(0..overflow);
        }
    }

    pub fn state_duration(&self) -> Duration {
        self.state_start.elapsed()
    }

    pub fn transition_history(&self) -> &[BoardTransition] {
        &self.transition_history
    }

    pub fn configure_rotation(&mut self, state: BoardState, boards: &[&str], cycle_duration_secs: u64) {
        self.rotations.insert(state, BoardRotation::new(boards, cycle_duration_secs));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sports::{definitions, GameState, Team};

    fn pre_game(seconds_to_start: i64) -> Game {
        Game {
            league: "nhl".into(),
            sport: definitions::hockey(),
            event_id: "1".into(),
            start_time: Utc::now(),
            state: GameState::Pre,
            home: Team::new("h", "Home", "HOM"),
            away: Team::new("a", "Away", "AWY"),
            period: 0,
            period_name: String::new(),
            display_clock: String::new(),
            seconds_to_start,
            status_detail: String::new(),
            is_intermission: None,
            sport_specific: Default::default(),
        }
    }

    #[test]
    fn no_snapshot_is_idle() {
        let sm = StateManager::new();
        assert_eq!(sm.determine_state(None, Utc::now()), BoardState::Idle);
    }

    #[test]
    fn pre_game_within_30_min_is_pregame() {
        let sm = StateManager::new();
        let game = pre_game(600);
        assert_eq!(sm.determine_state(Some(&game), Utc::now()), BoardState::Pregame);
    }

    #[test]
    fn pre_game_far_out_is_idle() {
        let sm = StateManager::new();
        let game = pre_game(7200);
        assert_eq!(sm.determine_state(Some(&game), Utc::now()), BoardState::Idle);
    }

    #[test]
    fn state_change_resets_rotation_index() {
        let mut sm = StateManager::new();
        sm.rotation_index = 2;
        assert!(sm.update_state(BoardState::Live));
        assert_eq!(sm.rotation_index, 0);
        assert!(!sm.update_state(BoardState::Live));
    }

    #[test]
    fn live_state_forces_scoreboard() {
        let mut sm = StateManager::new();
        sm.update_state(BoardState::Live);
        assert!(sm.should_force_board("scoreboard_nhl"));
        assert!(!sm.should_force_board("clock"));
    }

    #[test]
    fn transition_history_caps_at_100() {
        let mut sm = StateManager::new();
        for i in 0..150 {
            sm.record_transition(&format!("b{i}"), &format!("b{}", i + 1));
        }
        assert_eq!(sm.transition_history().len(), 100);
        assert_eq!(sm.transition_history().first().unwrap().from_board, "b50");
    }
}
