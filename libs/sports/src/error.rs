use thiserror::Error;

#[derive(Error, Debug)]
pub enum SportsError {
    #[error("unknown league code: {0}")]
    UnknownLeague(String),

    #[error("unknown sport code: {0}")]
    UnknownSport(String),
}

pub type Result<T> = std::result::Result<T, SportsError>;
