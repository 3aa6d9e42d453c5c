pub mod aggregator;
pub mod error;
pub mod leagues;
pub mod model;

pub use aggregator::all_games;
pub use error::{Result, SportsError};
pub use leagues::{parse_state, LeagueClient, LeagueFetchResult};
pub use model::{definitions, Game, GameState, PeriodType, Sport, Team, TeamRecord};
