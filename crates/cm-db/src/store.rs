//! `CarbonStore`: the repository surface the engine talks to.
//!
//! Repository methods live in `repos/` as `impl CarbonStore` blocks.

use crate::CarbonDb;
use crate::error::DatabaseError;

/// Record store over a [`CarbonDb`].
pub struct CarbonStore {
    db: CarbonDb,
}

impl CarbonStore {
    /// Open a store on a local database file or `":memory:"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = CarbonDb::open_local(db_path).await?;
        Ok(Self { db })
    }

    /// Wrap an already-open database.
    #[must_use]
    pub const fn from_db(db: CarbonDb) -> Self {
        Self { db }
    }

    #[must_use]
    pub const fn db(&self) -> &CarbonDb {
        &self.db
    }
}
