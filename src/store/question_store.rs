//! Question store for persisting the daily question to disk
//!
//! Stores the cached question and the date it was fetched as a single JSON
//! document, so a reader can never observe one without the other.

use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::data::Question;

/// File name of the persisted record inside the store directory
const RECORD_FILE: &str = "question.json";

/// The persisted record: the cached question and the day it was fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Local calendar date of the last successful fetch
    pub fetched_on: NaiveDate,
    /// The question fetched on that date
    pub question: Question,
}

/// Durable storage for the daily question record
///
/// The store keeps the record as a JSON file in an XDG-compliant data
/// directory (`~/.local/share/dailytrivia/` on Linux). Reads are fail-open:
/// a missing or undecodable record is a cache-miss, never an error, so a
/// corrupted store cannot block the user from seeing today's question.
#[derive(Debug, Clone)]
pub struct QuestionStore {
    /// Directory where the record file is stored
    dir: PathBuf,
}

impl QuestionStore {
    /// Creates a new QuestionStore using the platform data directory
    ///
    /// Returns `None` if the directory cannot be determined (e.g., no home
    /// directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "dailytrivia")?;
        let dir = project_dirs.data_dir().to_path_buf();
        Some(Self { dir })
    }

    /// Creates a new QuestionStore with a custom directory
    ///
    /// Useful for testing or when a specific location is needed.
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Returns the path of the record file
    fn record_path(&self) -> PathBuf {
        self.dir.join(RECORD_FILE)
    }

    /// Reads the persisted record
    ///
    /// Returns `None` if no record was ever written or the stored payload
    /// fails to decode.
    pub fn read_record(&self) -> Option<CacheRecord> {
        let content = fs::read_to_string(self.record_path()).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Writes the record, replacing any previous one
    ///
    /// The record is written to a temporary file and renamed into place, so
    /// a reader sees either the old record or the new one, never a torn
    /// write.
    pub fn write_record(&self, record: &CacheRecord) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let json = serde_json::to_string_pretty(record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let path = self.record_path();
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, path)
    }
}
