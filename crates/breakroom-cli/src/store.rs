//! SQLite-backed snapshot store.
//!
//! The core never persists anything; the CLI keeps the latest [`Session`]
//! as JSON in a small key-value table so successive invocations see the
//! same run.

use std::path::Path;

use breakroom_core::storage::data_dir;
use breakroom_core::Session;
use rusqlite::{params, Connection};
use tracing::warn;

const SESSION_KEY: &str = "session";

pub struct SessionStore {
    conn: Connection,
}

impl SessionStore {
    /// Open (or create) `breakroom.db` in the data directory.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        Self::open_at(&data_dir()?.join("breakroom.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, Box<dyn std::error::Error>> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// The stored session, or an empty one if none was saved yet.
    pub fn load_session(&self) -> Result<Session, Box<dyn std::error::Error>> {
        let Some(json) = self.kv_get(SESSION_KEY)? else {
            return Ok(Session::new());
        };
        match serde_json::from_str::<Session>(&json) {
            Ok(session) => Ok(session),
            Err(err) => {
                warn!(error = %err, "stored session unreadable, starting empty");
                Ok(Session::new())
            }
        }
    }

    pub fn save_session(&self, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string(session)?;
        self.kv_set(SESSION_KEY, &json)?;
        Ok(())
    }

    fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}
