// =============================================================================
// Account operations — create + authenticate
// =============================================================================

use anyhow::{Context, Result};
use rusqlite::OptionalExtension;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use super::Store;

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 6;

/// Categorized, user-facing account creation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountError {
    InvalidEmail,
    WeakPassword,
    DuplicateEmail,
}

impl AccountError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "Invalid email format",
            Self::WeakPassword => "Password must be at least 6 characters",
            Self::DuplicateEmail => "Email already exists",
        }
    }
}

impl std::fmt::Display for AccountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Hex SHA-256 digest of the plaintext password.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Validate a `local@domain.tld` shape: word/dot/hyphen characters in the
/// local and domain parts, exactly one `@`, and a word-character TLD after
/// the final dot.
pub fn is_valid_email(email: &str) -> bool {
    let is_part_char = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-';
    let is_word_char = |c: char| c.is_ascii_alphanumeric() || c == '_';

    let mut halves = email.splitn(2, '@');
    let (local, domain) = match (halves.next(), halves.next()) {
        (Some(l), Some(d)) => (l, d),
        _ => return false,
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    if !local.chars().all(is_part_char) {
        return false;
    }

    let (host, tld) = match domain.rsplit_once('.') {
        Some(parts) => parts,
        None => return false,
    };
    !host.is_empty()
        && host.chars().all(is_part_char)
        && !tld.is_empty()
        && tld.chars().all(is_word_char)
}

impl Store {
    /// Create a new account. The stored credential is a one-way hash; the
    /// plaintext is never persisted or logged.
    pub fn create_account(&self, email: &str, password: &str) -> Result<Result<(), AccountError>> {
        if !is_valid_email(email) {
            return Ok(Err(AccountError::InvalidEmail));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Ok(Err(AccountError::WeakPassword));
        }

        let conn = self.lock();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO users (email, password_hash) VALUES (?1, ?2)",
            rusqlite::params![email, hash_password(password)],
        )
        .context("failed to insert user")?;

        if inserted == 0 {
            return Ok(Err(AccountError::DuplicateEmail));
        }

        info!(email = %email, "account created");
        Ok(Ok(()))
    }

    /// True iff an account exists for `email` and its stored hash matches the
    /// hash of `password`.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<bool> {
        let conn = self.lock();
        let stored: Option<String> = conn
            .query_row(
                "SELECT password_hash FROM users WHERE email = ?1",
                rusqlite::params![email],
                |row| row.get(0),
            )
            .optional()
            .context("failed to query user")?;

        Ok(match stored {
            Some(hash) => hash == hash_password(password),
            None => false,
        })
    }
}
