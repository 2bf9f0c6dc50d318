pub mod migrations;
pub mod models;
pub mod queries;

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Result, anyhow};
use rusqlite::Connection;
use tracing::info;

/// Writers wait this long on a locked database file before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the seen store. All access goes through one connection.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        let db = Self::migrated(conn)?;
        info!("Seen store opened at {}", path.display());
        Ok(db)
    }

    /// Private, throwaway database. Used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::migrated(Connection::open_in_memory()?)
    }

    fn migrated(conn: Connection) -> Result<Self> {
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow!("seen store lock poisoned: {}", e))?;
        f(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_database_survives_reopen() {
        let dir = std::env::temp_dir().join(format!("lastseen_db_test_{}", std::process::id()));
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("seen.db");
        let _ = std::fs::remove_file(&path);

        {
            let db = Database::open(&path).unwrap();
            db.upsert_seen(&models::SeenRow {
                time: 1,
                server: "srv".into(),
                channel: "#c".into(),
                nick: "Bob".into(),
                kind: 0,
                text: None,
            })
            .unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.count_seen().unwrap(), 1);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
