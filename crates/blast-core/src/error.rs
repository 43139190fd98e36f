//! Error types for the game.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid player name: {0}")]
    InvalidName(String),

    #[error("Game is over")]
    GameOver,

    #[error("Position ({row}, {col}) is outside the board")]
    OutOfBounds { row: usize, col: usize },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0}ms")]
    Timeout(u64),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
