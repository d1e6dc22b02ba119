use chrono::{Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::storage::{KeyValueStore, StorageError};

pub const STORAGE_KEY: &str = "blindTimerHiScores";
pub const MAX_SCORES: usize = 10;
pub const MAX_NAME_LEN: usize = 10;
pub const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u64,
    pub rounds: u32,
    /// milliseconds since the Unix epoch
    pub date: i64,
}

impl HighScoreEntry {
    /// Local calendar date of the entry, `YYYY-MM-DD`
    pub fn formatted_date(&self) -> String {
        Local
            .timestamp_millis_opt(self.date)
            .single()
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct HighScoreData {
    version: u32,
    #[serde(default)]
    scores: Vec<HighScoreEntry>,
}

impl Default for HighScoreData {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            scores: Vec::new(),
        }
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    rank: usize,
    name: &'a str,
    score: u64,
    rounds: u32,
    date: String,
}

/// Top-ten list persisted as one versioned JSON document.
///
/// Every storage failure is absorbed here: reads degrade to an empty list
/// and writes report `false`, so the game stays playable without scores.
#[derive(Debug)]
pub struct HighScores<S: KeyValueStore> {
    storage: S,
}

impl<S: KeyValueStore> HighScores<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn load(&self) -> Vec<HighScoreEntry> {
        self.read().map(|data| data.scores).unwrap_or_default()
    }

    pub fn save(&self, name: &str, score: u64, rounds: u32) -> bool {
        let mut data = self.read().unwrap_or_default();

        data.scores.push(HighScoreEntry {
            name: name.chars().take(MAX_NAME_LEN).collect(),
            score,
            rounds,
            date: Utc::now().timestamp_millis(),
        });
        data.scores.sort_by(|a, b| b.score.cmp(&a.score));
        data.scores.truncate(MAX_SCORES);

        let written = serde_json::to_string(&data)
            .map_err(StorageError::from)
            .and_then(|raw| self.storage.set(STORAGE_KEY, &raw));

        match written {
            Ok(()) => {
                tracing::info!(name, score, rounds, "high score saved");
                true
            }
            Err(e) => {
                tracing::warn!("failed to save high score: {e}");
                false
            }
        }
    }

    pub fn is_high_score(&self, score: u64) -> bool {
        let scores = self.load();

        if scores.len() < MAX_SCORES {
            return true;
        }

        let lowest = scores.last().map(|entry| entry.score).unwrap_or(0);
        score > lowest
    }

    pub fn clear(&self) -> bool {
        match self.storage.remove(STORAGE_KEY) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("failed to clear high scores: {e}");
                false
            }
        }
    }

    /// Write the list as CSV with a header row
    pub fn export_csv<W: Write>(&self, writer: W) -> csv::Result<()> {
        let mut out = csv::Writer::from_writer(writer);
        for (idx, entry) in self.load().iter().enumerate() {
            out.serialize(CsvRow {
                rank: idx + 1,
                name: &entry.name,
                score: entry.score,
                rounds: entry.rounds,
                date: entry.formatted_date(),
            })?;
        }
        out.flush()?;
        Ok(())
    }

    /// Stored document, or `None` when absent, unreadable or from another version
    fn read(&self) -> Option<HighScoreData> {
        let raw = match self.storage.get(STORAGE_KEY) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return None,
            Err(e) => {
                tracing::warn!("failed to read high scores: {e}");
                return None;
            }
        };

        match serde_json::from_str::<HighScoreData>(&raw) {
            Ok(data) if data.version == CURRENT_VERSION => Some(data),
            Ok(data) => {
                tracing::warn!(
                    found = data.version,
                    expected = CURRENT_VERSION,
                    "discarding high scores from another version"
                );
                None
            }
            Err(e) => {
                tracing::warn!("discarding unreadable high scores: {e}");
                None
            }
        }
    }
}
