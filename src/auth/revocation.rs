//! Revocation Ledger
//! Mission: Append-only deny-list of token ids, consulted on every request

use crate::auth::models::TokenKind;
use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::info;

/// Append-only record of revoked token identifiers.
///
/// Revocation cannot be encoded in a token that is already in the client's
/// possession, so a store-backed deny-list keyed by jti is required. The
/// jti is the primary key, keeping the per-request lookup O(1).
pub struct RevocationLedger {
    db_path: String,
}

impl RevocationLedger {
    /// Create a new ledger and initialize its table
    pub fn new(db_path: &str) -> Result<Self> {
        let ledger = Self {
            db_path: db_path.to_string(),
        };
        ledger.init_db()?;
        Ok(ledger)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS revoked_tokens (
                jti TEXT PRIMARY KEY,
                token_kind TEXT NOT NULL,
                revoked_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Mark a jti as revoked. Revoking an already-revoked jti is a no-op.
    pub fn revoke(&self, jti: &str, kind: TokenKind) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "INSERT OR IGNORE INTO revoked_tokens (jti, token_kind, revoked_at)
             VALUES (?1, ?2, ?3)",
            params![jti, kind.as_str(), Utc::now().to_rfc3339()],
        )?;

        info!("🚫 Revoked {} token, jti {}", kind.as_str(), jti);
        Ok(())
    }

    /// Whether a jti has been revoked.
    pub fn is_revoked(&self, jti: &str) -> Result<bool> {
        let conn = Connection::open(&self.db_path)?;

        let revoked: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = ?1)",
            params![jti],
            |row| row.get(0),
        )?;

        Ok(revoked)
    }
}
