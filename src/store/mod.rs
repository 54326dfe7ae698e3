// =============================================================================
// Account / Watchlist Store — SQLite persistence
// =============================================================================
//
// Two tables:
//   users(email PRIMARY KEY, password_hash)
//   watchlist(email, symbol, PRIMARY KEY(email, symbol))
//
// The composite primary key on watchlist is the sole concurrency guard for
// duplicate (email, symbol) writes. Every operation runs inside its own
// short-lived statement/transaction scope on a mutex-guarded connection, so
// writes to the same key are serialized by the store itself.
//
// Password plaintext never touches the database or the logs; only the hex
// SHA-256 digest is stored.
// =============================================================================

pub mod accounts;
pub mod watchlist;

use std::path::Path;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use rusqlite::Connection;
use tracing::info;

pub use accounts::AccountError;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    email         TEXT PRIMARY KEY,
    password_hash TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS watchlist (
    email  TEXT NOT NULL,
    symbol TEXT NOT NULL,
    PRIMARY KEY (email, symbol)
);
"#;

/// SQLite-backed store for user credentials and per-user watchlists.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("failed to create database directory")?;
            }
        }

        let conn = Connection::open(&path)
            .with_context(|| format!("failed to open database at {}", path.as_ref().display()))?;
        conn.execute_batch(SCHEMA_SQL)
            .context("failed to initialise database schema")?;

        info!(path = %path.as_ref().display(), "store opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        conn.execute_batch(SCHEMA_SQL)
            .context("failed to initialise database schema")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub(crate) fn lock(&self) -> parking_lot::MutexGuard<'_, Connection> {
        self.conn.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_is_idempotent() {
        let store = Store::open_in_memory().unwrap();
        // Re-running the schema batch must not fail.
        store.lock().execute_batch(SCHEMA_SQL).unwrap();
    }
}
