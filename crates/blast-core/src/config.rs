//! Configuration types for the game.

use crate::{Error, Palette, Result, RuleSet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Board and scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Board height
    pub rows: usize,
    /// Board width
    pub cols: usize,
    /// Rows filled with random blocks at game start, counted from the entry edge
    pub initial_filled_rows: usize,
    /// Block colors
    pub palette: Palette,
    /// A new row is inserted every n turns (1 = hardest)
    pub turns_per_new_row: u32,
    /// Points awarded per cleared block
    pub points_per_block: u64,
    /// Rule variant
    pub rules: RuleSet,
    /// Random seed; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 8,
            cols: 8,
            initial_filled_rows: 4,
            palette: Palette::default(),
            turns_per_new_row: 1,
            points_per_block: 100,
            rules: RuleSet::default(),
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(Error::Validation(format!(
                "Board must be non-empty, got {}x{}",
                self.rows, self.cols
            )));
        }
        if self.initial_filled_rows > self.rows {
            return Err(Error::Validation(format!(
                "Cannot pre-fill {} rows on a board with {}",
                self.initial_filled_rows, self.rows
            )));
        }
        if self.turns_per_new_row == 0 {
            return Err(Error::Validation(
                "turns_per_new_row must be at least 1".to_string(),
            ));
        }
        if self.rules.min_group_size == 0 {
            return Err(Error::Validation(
                "min_group_size must be at least 1".to_string(),
            ));
        }
        self.palette.validate()
    }
}

/// Remote leaderboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    /// Leaderboard endpoint; the leaderboard is disabled when unset
    pub api_url: Option<String>,
    /// Maximum entries shown and the cutoff for qualifying
    pub limit: usize,
    /// Per-request timeout (milliseconds)
    pub timeout_ms: u64,
    /// How long a fetched board is reused (seconds)
    pub cache_ttl_secs: u64,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            limit: 10,
            timeout_ms: 5000,
            cache_ttl_secs: 30,
        }
    }
}

impl LeaderboardConfig {
    pub fn is_enabled(&self) -> bool {
        self.api_url.as_deref().is_some_and(|url| !url.trim().is_empty())
    }
}

/// Local high-score storage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighScoreConfig {
    /// JSON file holding the best local score
    pub path: String,
}

impl Default for HighScoreConfig {
    fn default() -> Self {
        Self {
            path: "./data/highscore.json".to_string(),
        }
    }
}

/// Everything the binary needs at startup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game: GameConfig,
    pub leaderboard: LeaderboardConfig,
    pub highscore: HighScoreConfig,
    /// OpenTelemetry endpoint
    pub otel_endpoint: Option<String>,
}

impl AppConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Defaults, then `BLAST_CONFIG` file, then individual env overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("BLAST_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.game.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("BLAST_LEADERBOARD_URL") {
            self.leaderboard.api_url = Some(url).filter(|u| !u.trim().is_empty());
        }
        if let Some(limit) = parse_var(&lookup, "BLAST_LEADERBOARD_LIMIT") {
            self.leaderboard.limit = limit;
        }
        if let Some(timeout) = parse_var(&lookup, "BLAST_LEADERBOARD_TIMEOUT_MS") {
            self.leaderboard.timeout_ms = timeout;
        }
        if let Some(seed) = parse_var(&lookup, "BLAST_SEED") {
            self.game.seed = Some(seed);
        }
        if let Some(name) = lookup("BLAST_RULES") {
            match RuleSet::from_name(&name) {
                Some(rules) => self.game.rules = rules,
                None => warn!("Unknown rule set '{}', keeping {:?}", name, self.game.rules.clear_mode),
            }
        }
        if let Some(path) = lookup("BLAST_HIGHSCORE_PATH") {
            self.highscore.path = path;
        }
        if let Some(endpoint) = lookup("OTEL_EXPORTER_OTLP_ENDPOINT") {
            self.otel_endpoint = Some(endpoint);
        }
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid number", key, raw);
            None
        }
    }
}
