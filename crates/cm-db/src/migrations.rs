//! Schema setup, run on every open. The SQL only uses `IF NOT EXISTS` forms.

use crate::CarbonDb;
use crate::error::DatabaseError;

/// Initial schema: organizations, activities, credit transactions.
const MIGRATION_001: &str = include_str!("../migrations/001_initial.sql");

impl CarbonDb {
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| DatabaseError::Migration(format!("001_initial.sql: {e}")))?;
        Ok(())
    }
}
