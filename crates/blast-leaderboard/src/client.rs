//! Client for the remote leaderboard.
//!
//! The service speaks two calls on a single URL: `GET ?limit=N` answers
//! `{"scores": [{"name", "score"}, ...]}` best first, and `POST {name, score}`
//! records a score. Every request is raced against the configured timeout and
//! fetched boards are reused for a short while.

use crate::name::validate_player_name;
use blast_core::{Error, LeaderboardConfig, Result};
use parking_lot::Mutex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u64,
}

/// Body returned by `GET`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreBoard {
    #[serde(default)]
    pub scores: Vec<LeaderboardEntry>,
}

struct CachedBoard {
    limit: usize,
    fetched_at: Instant,
    scores: Vec<LeaderboardEntry>,
}

pub struct LeaderboardClient {
    config: LeaderboardConfig,
    api_url: String,
    http_client: Client,
    cache: Mutex<Option<CachedBoard>>,
}

impl LeaderboardClient {
    pub fn new(config: LeaderboardConfig) -> Result<Self> {
        let api_url = config
            .api_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| Error::Validation("Leaderboard API URL is not configured".to_string()))?;

        let http_client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            config,
            api_url,
            http_client,
            cache: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &LeaderboardConfig {
        &self.config
    }

    /// Top `limit` entries, best first
    #[instrument(skip(self))]
    pub async fn fetch_top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        if let Some(scores) = self.cached(limit) {
            debug!("Leaderboard served from cache");
            return Ok(scores);
        }

        debug!("Fetching leaderboard from {}", self.api_url);

        let response = self
            .with_timeout(
                self.http_client
                    .get(&self.api_url)
                    .query(&[("limit", limit)])
                    .send(),
            )
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Leaderboard fetch failed: {} - {}", status, error_text);
            return Err(Error::Network(format!(
                "Leaderboard fetch failed: {}",
                status
            )));
        }

        let board: ScoreBoard = self.with_timeout(response.json()).await?;
        let mut scores = board.scores;
        scores.truncate(limit);

        info!(entries = scores.len(), "Leaderboard fetched");

        *self.cache.lock() = Some(CachedBoard {
            limit,
            fetched_at: Instant::now(),
            scores: scores.clone(),
        });

        Ok(scores)
    }

    /// Validate `name` and record `score` under it. Returns the normalized name.
    #[instrument(skip(self))]
    pub async fn submit(&self, name: &str, score: u64) -> Result<String> {
        let name = validate_player_name(name)?;

        let response = self
            .with_timeout(
                self.http_client
                    .post(&self.api_url)
                    .json(&LeaderboardEntry {
                        name: name.clone(),
                        score,
                    })
                    .send(),
            )
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Network(format!(
                "Failed to submit score: {} - {}",
                status, error_text
            )));
        }

        self.invalidate_cache();
        info!(name = %name, score, "Score submitted");

        Ok(name)
    }

    /// Whether `score` earns a place in the configured top list.
    ///
    /// An unreachable leaderboard counts as qualifying so the player still gets
    /// the chance to submit.
    pub async fn qualifies(&self, score: u64) -> bool {
        let limit = self.config.limit;
        match self.fetch_top(limit).await {
            Ok(scores) => qualifies_against(&scores, limit, score),
            Err(e) => {
                warn!("High score check failed: {}", e);
                true
            }
        }
    }

    pub fn invalidate_cache(&self) {
        self.cache.lock().take();
    }

    fn cached(&self, limit: usize) -> Option<Vec<LeaderboardEntry>> {
        let ttl = Duration::from_secs(self.config.cache_ttl_secs);
        let cache = self.cache.lock();
        cache
            .as_ref()
            .filter(|c| c.limit == limit && c.fetched_at.elapsed() < ttl)
            .map(|c| c.scores.clone())
    }

    async fn with_timeout<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, reqwest::Error>>,
    {
        let timeout_ms = self.config.timeout_ms;
        match tokio::time::timeout(Duration::from_millis(timeout_ms), fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) if e.is_timeout() => Err(Error::Timeout(timeout_ms)),
            Ok(Err(e)) => Err(Error::Network(e.to_string())),
            Err(_) => Err(Error::Timeout(timeout_ms)),
        }
    }
}

/// A score qualifies when the list has room or it beats the last entry
pub fn qualifies_against(scores: &[LeaderboardEntry], limit: usize, score: u64) -> bool {
    if scores.len() < limit {
        return true;
    }
    scores.last().map_or(true, |last| score > last.score)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(scores: &[u64]) -> Vec<LeaderboardEntry> {
        scores
            .iter()
            .map(|&score| LeaderboardEntry {
                name: "AAA".to_string(),
                score,
            })
            .collect()
    }

    #[test]
    fn test_client_requires_url() {
        assert!(LeaderboardClient::new(LeaderboardConfig::default()).is_err());

        let config = LeaderboardConfig {
            api_url: Some("http://127.0.0.1:1/exec".to_string()),
            ..Default::default()
        };
        assert!(LeaderboardClient::new(config).is_ok());
    }

    #[test]
    fn test_qualifies_with_room() {
        assert!(qualifies_against(&[], 10, 0));
        assert!(qualifies_against(&entries(&[500, 400]), 3, 1));
    }

    #[test]
    fn test_qualifies_against_full_board() {
        let board = entries(&[900, 800, 700]);
        assert!(qualifies_against(&board, 3, 701));
        assert!(!qualifies_against(&board, 3, 700));
        assert!(!qualifies_against(&board, 3, 100));
    }

    #[test]
    fn test_scoreboard_tolerates_missing_scores() {
        let board: ScoreBoard = serde_json::from_str("{}").unwrap();
        assert!(board.scores.is_empty());

        let board: ScoreBoard =
            serde_json::from_str(r#"{"scores":[{"name":"ACE","score":1200}]}"#).unwrap();
        assert_eq!(board.scores[0].score, 1200);
    }
}
