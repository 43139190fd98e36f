//! High-score handling: the remote leaderboard client, player-name rules and
//! the local best-score file.

pub mod client;
pub mod local;
pub mod name;

pub use client::{LeaderboardClient, LeaderboardEntry, ScoreBoard};
pub use local::{HighScoreRecord, LocalHighScores};
pub use name::{sanitize_input, validate_player_name, NameError, MAX_NAME_LEN};
