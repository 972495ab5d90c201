//! Drug Storage
//! Mission: Persist inventory records with SQLite

use crate::inventory::models::Drug;
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use tracing::info;
use uuid::Uuid;

const SELECT_DRUG: &str = "SELECT d.id, d.name, d.quantity, d.min_threshold, d.user_id,
        d.created_at, u.username
 FROM drugs d LEFT JOIN users u ON u.id = d.user_id";

/// Drug storage with SQLite backend.
///
/// Shares the database file with [`crate::auth::UserStore`]; the users
/// table must exist before any read (owner usernames are joined in).
pub struct DrugStore {
    db_path: String,
}

impl DrugStore {
    /// Create a new drug store and initialize its table
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS drugs (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                quantity INTEGER NOT NULL DEFAULT 0,
                min_threshold INTEGER NOT NULL DEFAULT 10,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (user_id, name),
                FOREIGN KEY (user_id) REFERENCES users(id)
            )",
            [],
        )?;

        Ok(())
    }

    /// Insert a new record.
    ///
    /// One record per name per owner; a duplicate surfaces as the UNIQUE
    /// constraint violation.
    pub fn create(
        &self,
        name: &str,
        quantity: i64,
        min_threshold: i64,
        user_id: &Uuid,
    ) -> Result<Drug> {
        let id = Uuid::new_v4();
        let created_at = Utc::now().to_rfc3339();

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO drugs (id, name, quantity, min_threshold, user_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id.to_string(),
                name,
                quantity,
                min_threshold,
                user_id.to_string(),
                created_at,
            ],
        )
        .context("Failed to insert drug")?;

        info!("✅ Added drug: {} (qty {})", name, quantity);

        self.get(&id)?
            .context("Inserted drug not found on readback")
    }

    /// Get a record by id
    pub fn get(&self, id: &Uuid) -> Result<Option<Drug>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(&format!("{SELECT_DRUG} WHERE d.id = ?1"))?;
        match stmt.query_row(params![id.to_string()], row_to_drug) {
            Ok(drug) => Ok(Some(drug)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List all records
    pub fn list_all(&self) -> Result<Vec<Drug>> {
        self.query(&format!("{SELECT_DRUG} ORDER BY d.created_at"), [])
    }

    /// List records owned by one user
    pub fn list_by_owner(&self, user_id: &Uuid) -> Result<Vec<Drug>> {
        self.query(
            &format!("{SELECT_DRUG} WHERE d.user_id = ?1 ORDER BY d.created_at"),
            params![user_id.to_string()],
        )
    }

    /// List records below their low-stock threshold
    pub fn low_stock(&self) -> Result<Vec<Drug>> {
        self.query(
            &format!("{SELECT_DRUG} WHERE d.quantity < d.min_threshold ORDER BY d.created_at"),
            [],
        )
    }

    /// Case-insensitive substring search on name
    pub fn search(&self, name_query: &str) -> Result<Vec<Drug>> {
        let pattern = format!("%{}%", name_query);
        self.query(
            &format!("{SELECT_DRUG} WHERE d.name LIKE ?1 ORDER BY d.created_at"),
            params![pattern],
        )
    }

    /// Partial update; None fields keep their current value. Returns the
    /// updated record, or None when the id does not exist.
    pub fn update(
        &self,
        id: &Uuid,
        name: Option<&str>,
        quantity: Option<i64>,
        min_threshold: Option<i64>,
    ) -> Result<Option<Drug>> {
        let conn = Connection::open(&self.db_path)?;

        let rows_affected = conn
            .execute(
                "UPDATE drugs SET
                    name = COALESCE(?1, name),
                    quantity = COALESCE(?2, quantity),
                    min_threshold = COALESCE(?3, min_threshold)
                 WHERE id = ?4",
                params![name, quantity, min_threshold, id.to_string()],
            )
            .context("Failed to update drug")?;

        if rows_affected == 0 {
            return Ok(None);
        }

        self.get(id)
    }

    /// Delete a record. Returns false when the id does not exist.
    pub fn delete(&self, id: &Uuid) -> Result<bool> {
        let conn = Connection::open(&self.db_path)?;

        let rows_affected =
            conn.execute("DELETE FROM drugs WHERE id = ?1", params![id.to_string()])?;

        if rows_affected > 0 {
            info!("🗑️  Deleted drug: {}", id);
        }

        Ok(rows_affected > 0)
    }

    fn query<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<Drug>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(sql)?;
        let drugs = stmt
            .query_map(params, row_to_drug)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(drugs)
    }
}

fn row_to_drug(row: &Row<'_>) -> rusqlite::Result<Drug> {
    let id_str: String = row.get(0)?;
    let id = Uuid::parse_str(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let owner_str: String = row.get(4)?;
    let user_id = Uuid::parse_str(&owner_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Drug {
        id,
        name: row.get(1)?,
        quantity: row.get(2)?,
        min_threshold: row.get(3)?,
        user_id,
        created_at: row.get(5)?,
        owner: row.get(6)?,
    })
}
