// =============================================================================
// Watchlist operations — at most one entry per (email, symbol)
// =============================================================================

use anyhow::{Context, Result};
use tracing::info;

use super::Store;

impl Store {
    /// Add `symbol` to the user's watchlist. Returns `false` when the
    /// (email, symbol) pair already exists — the composite primary key
    /// enforces uniqueness.
    pub fn add_to_watchlist(&self, email: &str, symbol: &str) -> Result<bool> {
        let conn = self.lock();
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO watchlist (email, symbol) VALUES (?1, ?2)",
                rusqlite::params![email, symbol],
            )
            .context("failed to insert watchlist entry")?;

        if inserted > 0 {
            info!(email = %email, symbol = %symbol, "watchlist entry added");
        }
        Ok(inserted > 0)
    }

    /// Remove `symbol` from the user's watchlist. Idempotent — removing an
    /// entry that does not exist is not an error.
    pub fn remove_from_watchlist(&self, email: &str, symbol: &str) -> Result<()> {
        let conn = self.lock();
        conn.execute(
            "DELETE FROM watchlist WHERE email = ?1 AND symbol = ?2",
            rusqlite::params![email, symbol],
        )
        .context("failed to delete watchlist entry")?;
        Ok(())
    }

    /// All symbols on the user's watchlist. Order is not significant.
    pub fn watchlist(&self, email: &str) -> Result<Vec<String>> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare("SELECT symbol FROM watchlist WHERE email = ?1")
            .context("failed to prepare watchlist query")?;
        let symbols = stmt
            .query_map(rusqlite::params![email], |row| row.get::<_, String>(0))
            .context("failed to query watchlist")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to read watchlist rows")?;
        Ok(symbols)
    }
}
