//! Best score kept on local disk.

use blast_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreRecord {
    pub score: u64,
    pub name: Option<String>,
    /// Unix timestamp (seconds) of when the record was set
    pub timestamp: i64,
}

pub struct LocalHighScores {
    path: PathBuf,
}

impl LocalHighScores {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored record, or `None` when nothing has been saved yet
    pub async fn load(&self) -> Result<Option<HighScoreRecord>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No high score file at {:?}", self.path);
                return Ok(None);
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let record: HighScoreRecord = serde_json::from_slice(&bytes)?;
        Ok(Some(record))
    }

    pub async fn best(&self) -> Result<u64> {
        Ok(self.load().await?.map_or(0, |r| r.score))
    }

    /// Persist `score` if it beats the stored record. Returns whether it did.
    pub async fn record(&self, score: u64, name: Option<&str>) -> Result<bool> {
        if score <= self.best().await? {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let record = HighScoreRecord {
            score,
            name: name.map(str::to_string),
            timestamp: chrono::Utc::now().timestamp(),
        };
        let bytes = serde_json::to_vec_pretty(&record)?;
        fs::write(&self.path, bytes).await?;

        info!(score, path = ?self.path, "New local high score saved");
        Ok(true)
    }
}
