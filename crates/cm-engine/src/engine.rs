//! `CarbonEngine`: the operation surface exposed to the CLI.
//!
//! `CarbonEngine` wraps `CarbonStore` (persistence), `CarbonConfig` (tunables),
//! a [`Calculator`] and a [`Predictor`]. Operations live in sibling modules as
//! `impl<P: Predictor> CarbonEngine<P>` blocks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{NaiveDate, Utc};
use cm_config::CarbonConfig;
use cm_db::store::CarbonStore;
use cm_predictor::{OfflinePredictor, Predictor};

use crate::calculator::Calculator;
use crate::error::EngineError;

type OrgLock = Arc<tokio::sync::Mutex<()>>;

/// One async mutex per organization, serializing credit mutations.
///
/// Entries live only while some task holds or waits on them, so the map
/// never outgrows the set of organizations with a write in flight.
#[derive(Debug, Default)]
pub(crate) struct OrgLocks {
    inner: Mutex<HashMap<String, OrgLock>>,
}

impl OrgLocks {
    fn lock_for(&self, org_id: &str) -> OrgLock {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(map.entry(org_id.to_string()).or_default())
    }

    /// Wait for exclusive access to `org_id`'s credit log.
    pub(crate) async fn acquire(&self, org_id: &str) -> OrgGuard<'_> {
        let guard = self.lock_for(org_id).lock_owned().await;
        OrgGuard {
            locks: self,
            org_id: org_id.to_string(),
            guard: Some(guard),
        }
    }

    /// Drop `org_id`'s entry once nobody else holds a handle to it.
    fn release(&self, org_id: &str) {
        let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if map.get(org_id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            map.remove(org_id);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Held for the duration of one credit mutation.
pub(crate) struct OrgGuard<'a> {
    locks: &'a OrgLocks,
    org_id: String,
    guard: Option<tokio::sync::OwnedMutexGuard<()>>,
}

impl Drop for OrgGuard<'_> {
    fn drop(&mut self) {
        // Unlock first so the handle count reflects only other tasks.
        self.guard.take();
        self.locks.release(&self.org_id);
    }
}

/// Emissions benchmarking, forecasting and credit engine.
pub struct CarbonEngine<P = OfflinePredictor> {
    store: CarbonStore,
    config: CarbonConfig,
    calculator: Calculator,
    predictor: P,
    credit_locks: OrgLocks,
}

impl<P: Predictor> CarbonEngine<P> {
    #[must_use]
    pub fn new(
        store: CarbonStore,
        config: CarbonConfig,
        calculator: Calculator,
        predictor: P,
    ) -> Self {
        Self {
            store,
            config,
            calculator,
            predictor,
            credit_locks: OrgLocks::default(),
        }
    }

    /// Open the store at `config.general.db_path` with the built-in factor table.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Database`] if the database cannot be opened.
    pub async fn open(config: CarbonConfig, predictor: P) -> Result<Self, EngineError> {
        let store = CarbonStore::new_local(&config.general.db_path).await?;
        tracing::debug!(db_path = %config.general.db_path, "opened carbon store");
        Ok(Self::new(store, config, Calculator::default(), predictor))
    }

    #[must_use]
    pub const fn store(&self) -> &CarbonStore {
        &self.store
    }

    #[must_use]
    pub const fn config(&self) -> &CarbonConfig {
        &self.config
    }

    #[must_use]
    pub const fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    pub(crate) const fn predictor(&self) -> &P {
        &self.predictor
    }

    pub(crate) const fn credit_locks(&self) -> &OrgLocks {
        &self.credit_locks
    }
}

/// Today in UTC.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Inclusive window of `days` days ending on `end`.
pub(crate) fn trailing_window(end: NaiveDate, days: u32) -> NaiveDate {
    let back = i64::from(days.max(1)) - 1;
    end - chrono::Duration::days(back)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_window_is_inclusive() {
        let end = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        assert_eq!(
            trailing_window(end, 90),
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
        );
        assert_eq!(trailing_window(end, 1), end);
        assert_eq!(trailing_window(end, 0), end);
    }

    #[test]
    fn same_org_shares_a_lock() {
        let locks = OrgLocks::default();
        let a = locks.lock_for("org-a");
        let b = locks.lock_for("org-a");
        let c = locks.lock_for("org-b");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[tokio::test]
    async fn released_locks_leave_the_map() {
        let locks = OrgLocks::default();
        for n in 0..50 {
            let _guard = locks.acquire(&format!("org-{n}")).await;
            assert_eq!(locks.len(), 1);
        }
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn waiting_task_keeps_the_entry() {
        let locks = Arc::new(OrgLocks::default());
        let first = locks.acquire("org-a").await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire("org-a").await;
            })
        };
        while Arc::strong_count(&locks.lock_for("org-a")) < 4 {
            tokio::task::yield_now().await;
        }

        drop(first);
        assert_eq!(locks.len(), 1);
        waiter.await.unwrap();
        assert_eq!(locks.len(), 0);
    }
}
