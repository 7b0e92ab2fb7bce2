//! Carbon credit transaction repository.
//!
//! The log is append-only. Balance is always folded from the rows; it is
//! never stored.

use chrono::Utc;

use cm_core::entities::{CREDIT_TOLERANCE, CreditTotals, CreditTransaction};
use cm_core::enums::{CreditSource, TransactionType};
use cm_core::ids::PREFIX_CREDIT;

use crate::error::DatabaseError;
use crate::helpers::{get_bool, get_opt_f64, get_opt_string, parse_datetime, parse_enum, parse_opt_enum};
use crate::store::CarbonStore;

const SELECT_COLS: &str = "id, org_id, transaction_type, credits, source, description,
    price_per_credit, total_cost, verified, created_at";

/// SQL expression folding an organization's balance; `?2` is the org id.
const BALANCE_FOLD: &str = "(SELECT COALESCE(SUM(CASE
        WHEN transaction_type IN ('earned', 'purchased') THEN credits
        WHEN transaction_type = 'used' THEN -credits
        ELSE 0 END), 0.0)
     FROM credit_transactions WHERE org_id = ?2)";

fn row_to_credit(row: &libsql::Row) -> Result<CreditTransaction, DatabaseError> {
    Ok(CreditTransaction {
        id: row.get::<String>(0)?,
        org_id: row.get::<String>(1)?,
        transaction_type: parse_enum(&row.get::<String>(2)?)?,
        credits: row.get::<f64>(3)?,
        source: parse_opt_enum(get_opt_string(row, 4)?.as_deref())?,
        description: get_opt_string(row, 5)?,
        price_per_credit: get_opt_f64(row, 6)?,
        total_cost: get_opt_f64(row, 7)?,
        verified: get_bool(row, 8)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
    })
}

/// A credit transaction to append.
#[derive(Debug, Clone)]
pub struct NewCredit<'a> {
    pub org_id: &'a str,
    pub transaction_type: TransactionType,
    pub credits: f64,
    pub source: Option<CreditSource>,
    pub description: Option<&'a str>,
    pub price_per_credit: Option<f64>,
    pub verified: bool,
}

impl NewCredit<'_> {
    fn total_cost(&self) -> Option<f64> {
        self.price_per_credit.map(|price| price * self.credits)
    }
}

impl CarbonStore {
    /// Append a transaction unconditionally.
    ///
    /// `used` rows must go through [`CarbonStore::append_use_if_covered`].
    pub async fn append_credit(
        &self,
        new: &NewCredit<'_>,
    ) -> Result<CreditTransaction, DatabaseError> {
        if new.transaction_type == TransactionType::Used {
            return Err(DatabaseError::InvalidState(
                "used credits must be appended with a balance check".into(),
            ));
        }
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_CREDIT).await?;
        let total_cost = new.total_cost();

        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO credit_transactions ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
                ),
                libsql::params![
                    id.as_str(),
                    new.org_id,
                    new.transaction_type.as_str(),
                    new.credits,
                    new.source.map(CreditSource::as_str),
                    new.description,
                    new.price_per_credit,
                    total_cost,
                    i64::from(new.verified),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(CreditTransaction {
            id,
            org_id: new.org_id.to_string(),
            transaction_type: new.transaction_type,
            credits: new.credits,
            source: new.source,
            description: new.description.map(String::from),
            price_per_credit: new.price_per_credit,
            total_cost,
            verified: new.verified,
            created_at: now,
        })
    }

    /// Append a `used` transaction only if the folded balance covers it.
    ///
    /// The balance check and the insert are one statement, so no reader can
    /// observe a negative balance. The check allows [`CREDIT_TOLERANCE`] of
    /// float residue. Returns `None` when the balance is short.
    pub async fn append_use_if_covered(
        &self,
        org_id: &str,
        credits: f64,
        description: Option<&str>,
    ) -> Result<Option<CreditTransaction>, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_CREDIT).await?;

        let changed = self
            .db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO credit_transactions ({SELECT_COLS})
                     SELECT ?1, ?2, 'used', ?3, NULL, ?4, NULL, NULL, 1, ?5
                     WHERE {BALANCE_FOLD} + ?6 >= ?3"
                ),
                libsql::params![
                    id.as_str(),
                    org_id,
                    credits,
                    description,
                    now.to_rfc3339(),
                    CREDIT_TOLERANCE
                ],
            )
            .await?;

        if changed == 0 {
            return Ok(None);
        }
        Ok(Some(CreditTransaction {
            id,
            org_id: org_id.to_string(),
            transaction_type: TransactionType::Used,
            credits,
            source: None,
            description: description.map(String::from),
            price_per_credit: None,
            total_cost: None,
            verified: true,
            created_at: now,
        }))
    }

    /// Newest first.
    pub async fn list_credits(
        &self,
        org_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<CreditTransaction>, DatabaseError> {
        let sql = match limit {
            Some(limit) => format!(
                "SELECT {SELECT_COLS} FROM credit_transactions WHERE org_id = ?1
                 ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
            ),
            None => format!(
                "SELECT {SELECT_COLS} FROM credit_transactions WHERE org_id = ?1
                 ORDER BY created_at DESC, rowid DESC"
            ),
        };
        let mut rows = self.db().conn().query(&sql, [org_id]).await?;
        let mut credits = Vec::new();
        while let Some(row) = rows.next().await? {
            credits.push(row_to_credit(&row)?);
        }
        Ok(credits)
    }

    /// Per-type sums over the full history, grouped in SQL.
    pub async fn credit_totals(&self, org_id: &str) -> Result<CreditTotals, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT transaction_type, SUM(credits), COALESCE(SUM(total_cost), 0.0)
                 FROM credit_transactions WHERE org_id = ?1
                 GROUP BY transaction_type",
                [org_id],
            )
            .await?;

        let mut totals = CreditTotals::default();
        while let Some(row) = rows.next().await? {
            let kind: TransactionType = parse_enum(&row.get::<String>(0)?)?;
            let credits = row.get::<f64>(1)?;
            let cost = row.get::<f64>(2)?;
            match kind {
                TransactionType::Earned => totals.earned = credits,
                TransactionType::Purchased => {
                    totals.purchased = credits;
                    totals.total_cost = cost;
                }
                TransactionType::Used => totals.used = credits,
                TransactionType::Transferred => {
                    totals.transferred = credits;
                    totals.total_revenue = cost;
                }
                TransactionType::Expired => totals.expired = credits,
            }
        }
        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> CarbonStore {
        let store = CarbonStore::new_local(":memory:").await.unwrap();
        store
            .register_organization("org-a", "Acme", Some("IT"), Some(100), None)
            .await
            .unwrap();
        store
    }

    fn earned(credits: f64) -> NewCredit<'static> {
        NewCredit {
            org_id: "org-a",
            transaction_type: TransactionType::Earned,
            credits,
            source: Some(CreditSource::SolarPower),
            description: Some("rooftop array"),
            price_per_credit: None,
            verified: true,
        }
    }

    #[tokio::test]
    async fn append_and_list_newest_first() {
        let store = store().await;
        let first = store.append_credit(&earned(5.0)).await.unwrap();
        let second = store.append_credit(&earned(7.0)).await.unwrap();

        let listed = store.list_credits("org-a", None).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1], first);
    }

    #[tokio::test]
    async fn purchase_records_total_cost() {
        let store = store().await;
        let tx = store
            .append_credit(&NewCredit {
                org_id: "org-a",
                transaction_type: TransactionType::Purchased,
                credits: 4.0,
                source: Some(CreditSource::CarbonMarket),
                description: None,
                price_per_credit: Some(1500.0),
                verified: true,
            })
            .await
            .unwrap();
        assert_eq!(tx.total_cost, Some(6000.0));
        let totals = store.credit_totals("org-a").await.unwrap();
        assert!((totals.total_cost - 6000.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn use_is_rejected_beyond_balance() {
        let store = store().await;
        store.append_credit(&earned(10.0)).await.unwrap();

        let rejected = store.append_use_if_covered("org-a", 15.0, None).await.unwrap();
        assert!(rejected.is_none());
        assert_eq!(store.list_credits("org-a", None).await.unwrap().len(), 1);

        let accepted = store
            .append_use_if_covered("org-a", 10.0, Some("offset"))
            .await
            .unwrap();
        assert!(accepted.is_some());
        let totals = store.credit_totals("org-a").await.unwrap();
        assert!(totals.balance().abs() < 1e-9);
    }

    #[tokio::test]
    async fn fractional_uses_spend_the_whole_balance() {
        let store = store().await;
        store.append_credit(&earned(0.3)).await.unwrap();

        assert!(store.append_use_if_covered("org-a", 0.1, None).await.unwrap().is_some());
        assert!(store.append_use_if_covered("org-a", 0.2, None).await.unwrap().is_some());
        assert!(store.append_use_if_covered("org-a", 0.0001, None).await.unwrap().is_none());

        let balance = store.credit_totals("org-a").await.unwrap().balance();
        assert!(balance >= 0.0, "balance {balance}");
        assert_eq!(store.list_credits("org-a", None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn used_rows_cannot_bypass_the_check() {
        let store = store().await;
        let mut bypass = earned(1.0);
        bypass.transaction_type = TransactionType::Used;
        assert!(matches!(
            store.append_credit(&bypass).await,
            Err(DatabaseError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn sql_totals_match_fold() {
        let store = store().await;
        store.append_credit(&earned(3.0)).await.unwrap();
        store.append_credit(&earned(4.5)).await.unwrap();
        store.append_use_if_covered("org-a", 2.0, None).await.unwrap();

        let history = store.list_credits("org-a", None).await.unwrap();
        let folded = CreditTotals::fold(&history);
        let grouped = store.credit_totals("org-a").await.unwrap();
        assert!((folded.balance() - grouped.balance()).abs() < 1e-9);
        assert!((grouped.balance() - 5.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn limit_caps_listing() {
        let store = store().await;
        for _ in 0..5 {
            store.append_credit(&earned(1.0)).await.unwrap();
        }
        assert_eq!(store.list_credits("org-a", Some(3)).await.unwrap().len(), 3);
    }
}
