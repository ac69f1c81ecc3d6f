use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::task;

/// Local key/value store for client preferences, the desktop counterpart
/// of the web client's cookies.
#[derive(Debug, Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub async fn new() -> Result<Self> {
        let path = Self::db_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
        }

        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Create an in-memory database (used for testing and as placeholder)
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn db_path() -> Result<PathBuf> {
        let data_dir = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").expect("HOME not set");
                PathBuf::from(home).join(".local/share")
            });
        Ok(data_dir.join("vernissage").join("vernissage.db"))
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER NOT NULL
            );",
        )?;

        let version: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        if version < 1 {
            conn.execute_batch(
                "CREATE TABLE settings (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                INSERT INTO schema_version (version) VALUES (1);",
            )?;
        }

        Ok(())
    }

    pub async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.clone();
        let key = key.to_string();
        task::spawn_blocking(move || {
            let conn = conn.lock().unwrap();
            let result: Option<String> = conn
                .query_row(
                    "SELECT value FROM settings WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(result)
        })
        .await?
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.clone();
        let key = key.to_string();
        let value = value.to_string();
        task::spawn_blocking(move || {
            let conn = conn.lock().unwrap();
            conn.execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO UPDATE SET value = ?2",
                params![key, value],
            )?;
            Ok(())
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_setting_is_none() {
        let db = Database::new_in_memory().unwrap();
        assert!(db.get_setting("timezone").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_setting_round_trip_and_overwrite() {
        let db = Database::new_in_memory().unwrap();

        db.set_setting("timezone", "Asia/Tokyo").await.unwrap();
        assert_eq!(
            db.get_setting("timezone").await.unwrap().as_deref(),
            Some("Asia/Tokyo")
        );

        db.set_setting("timezone", "Europe/Paris").await.unwrap();
        assert_eq!(
            db.get_setting("timezone").await.unwrap().as_deref(),
            Some("Europe/Paris")
        );
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let db = Database::new_in_memory().unwrap();
        db.set_setting("timezone", "UTC").await.unwrap();
        db.set_setting("theme", "dark").await.unwrap();
        assert_eq!(db.get_setting("theme").await.unwrap().as_deref(), Some("dark"));
        assert_eq!(db.get_setting("timezone").await.unwrap().as_deref(), Some("UTC"));
    }
}
