//! # cm-db
//!
//! libSQL record store for CarbonMeter.
//!
//! Holds organization profiles, real and predicted activity observations and
//! the append-only carbon credit log. The engine only needs insert,
//! filter-by-fields and grouped sums; per-organization atomicity of credit
//! use comes from a single conditional `INSERT … SELECT`.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod store;

use error::DatabaseError;
use libsql::Builder;

/// Database handle: a libSQL database and its connection.
pub struct CarbonDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl CarbonDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` when opening or migrating fails.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Per-connection setting.
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let carbon_db = Self { db, conn };
        carbon_db.run_migrations().await?;
        tracing::debug!(path, "opened carbon database");
        Ok(carbon_db)
    }

    /// The libSQL connection the repositories query through.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// A fresh `<prefix>-<8 hex>` id, e.g. `"act-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query(
                &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<String>(0)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    async fn test_db() -> CarbonDb {
        CarbonDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        for table in ["organizations", "activities", "credit_transactions"] {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id("act").await.unwrap();
        assert!(id.starts_with("act-"), "ID should start with 'act-': {id}");
        assert_eq!(id.len(), 12, "3 prefix + 1 dash + 8 hex: {id}");
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn generate_id_is_unique() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            assert!(ids.insert(db.generate_id("crd").await.unwrap()));
        }
    }

    #[tokio::test]
    async fn opens_file_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("carbon.db");
        let path = path.to_str().unwrap();
        {
            let db = CarbonDb::open_local(path).await.unwrap();
            db.conn()
                .execute(
                    "INSERT INTO organizations (id, name) VALUES ('org-1', 'Acme')",
                    (),
                )
                .await
                .unwrap();
        }
        let db = CarbonDb::open_local(path).await.unwrap();
        let mut rows = db
            .conn()
            .query("SELECT COUNT(*) FROM organizations", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 1);
    }
}
