//! Transcription history storage and retrieval using SQLite.
//!
//! Every successful transcription is stored with its timestamp and, for
//! assistant sessions, the dispatched command (or the fact that nothing
//! matched). The `history` command reads it back most-recent-first.

use anyhow::Result;
use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// A single transcription entry in the history.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Unique identifier for this entry
    pub id: i64,
    /// The transcribed text
    pub text: String,
    /// Dispatched command id, if the assistant matched one
    pub command: Option<String>,
    /// When this transcription was created
    pub created_at: DateTime<Local>,
}

/// Manages the transcription history database.
pub struct HistoryManager {
    /// Path to the SQLite database file
    database_path: PathBuf,
    /// Connection to the database (lazy-loaded)
    connection: Option<Connection>,
}

impl HistoryManager {
    /// Creates a history manager for the given data directory.
    pub fn new(data_dir: &Path) -> Result<Self> {
        let database_path = data_dir.join("history.db");

        Ok(Self {
            database_path,
            connection: None,
        })
    }

    /// Opens the history database in the default data directory.
    pub fn open_default() -> Result<Self> {
        let data_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
            .join(".local")
            .join("share")
            .join("voxlink");
        std::fs::create_dir_all(&data_dir)?;
        Self::new(&data_dir)
    }

    /// Initializes the database connection and creates tables if necessary.
    fn get_connection(&mut self) -> Result<&Connection> {
        if self.connection.is_none() {
            let connection = Connection::open(&self.database_path)?;

            connection.execute(
                "CREATE TABLE IF NOT EXISTS transcriptions (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    text TEXT NOT NULL,
                    command TEXT,
                    created_at TEXT NOT NULL
                )",
                [],
            )?;

            self.connection = Some(connection);
        }

        Ok(self.connection.as_ref().unwrap())
    }

    /// Saves a transcription and its dispatch outcome.
    ///
    /// # Errors
    /// - If the database connection fails
    /// - If the insertion fails
    pub fn save(&mut self, text: &str, command: Option<&str>) -> Result<()> {
        let connection = self.get_connection()?;
        let timestamp = Local::now().to_rfc3339();

        connection.execute(
            "INSERT INTO transcriptions (text, command, created_at) VALUES (?1, ?2, ?3)",
            params![text, command, timestamp],
        )?;

        tracing::debug!("Transcription saved to history");
        Ok(())
    }

    /// Retrieves the most recent entries, newest first.
    ///
    /// # Errors
    /// - If the database connection fails
    /// - If the query fails or a timestamp cannot be parsed
    pub fn recent(&mut self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let connection = self.get_connection()?;

        let mut statement = connection.prepare(
            "SELECT id, text, command, created_at FROM transcriptions
             ORDER BY created_at DESC LIMIT ?1",
        )?;

        let entries = statement
            .query_map(params![limit as i64], |row| {
                let id = row.get::<_, i64>(0)?;
                let text = row.get::<_, String>(1)?;
                let command = row.get::<_, Option<String>>(2)?;
                let timestamp_str = row.get::<_, String>(3)?;

                let created_at = DateTime::parse_from_rfc3339(&timestamp_str)
                    .map(|dt| dt.with_timezone(&Local))
                    .map_err(|_| {
                        rusqlite::Error::InvalidParameterName(
                            "Invalid timestamp format".to_string(),
                        )
                    })?;

                Ok(HistoryEntry {
                    id,
                    text,
                    command,
                    created_at,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_manager(tag: &str) -> (HistoryManager, PathBuf) {
        let dir = std::env::temp_dir().join(format!("voxlink-history-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        (HistoryManager::new(&dir).unwrap(), dir)
    }

    #[test]
    fn test_save_and_read_back() {
        let (mut manager, dir) = temp_manager("roundtrip");

        manager.save("ativar som", Some("toggle-sound")).unwrap();
        manager.save("olá mundo", None).unwrap();

        let entries = manager.recent(10).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.text == "ativar som"
            && e.command.as_deref() == Some("toggle-sound")));
        assert!(entries
            .iter()
            .any(|e| e.text == "olá mundo" && e.command.is_none()));

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_recent_respects_limit() {
        let (mut manager, dir) = temp_manager("limit");

        for i in 0..5 {
            manager.save(&format!("entry {i}"), None).unwrap();
        }

        let entries = manager.recent(3).unwrap();
        assert_eq!(entries.len(), 3);

        std::fs::remove_dir_all(dir).ok();
    }
}
