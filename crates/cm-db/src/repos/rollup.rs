//! Grouped-sum rollups over activity observations.
//!
//! Predicted rows are included by default but never double-count a date that
//! also has real observations.

use chrono::NaiveDate;

use cm_core::enums::{RollupGroup, Scope};
use cm_core::responses::RollupRow;

use crate::error::DatabaseError;
use crate::repos::EFFECTIVE_ROW;
use crate::store::CarbonStore;

/// Options for [`CarbonStore::rollup`].
#[derive(Debug, Clone, Copy)]
pub struct RollupQuery<'a> {
    pub org_id: &'a str,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub group_by: RollupGroup,
    pub include_predictions: bool,
}

/// Summed emissions and how many observations contributed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionTotal {
    pub total: f64,
    pub observations: u64,
}

impl EmissionTotal {
    /// `None` when nothing was observed, so "no data" is distinct from zero.
    #[must_use]
    pub const fn observed(self) -> Option<f64> {
        if self.observations == 0 {
            None
        } else {
            Some(self.total)
        }
    }
}

/// One (month, scope) cell of the monthly trend.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthScopeTotal {
    /// `YYYY-MM`.
    pub month: String,
    pub scope: Scope,
    pub total: f64,
}

const fn group_expr(group: RollupGroup) -> &'static str {
    match group {
        RollupGroup::Scope => "CAST(a.scope AS TEXT)",
        RollupGroup::Category => "a.category",
        RollupGroup::Month => "substr(a.activity_date, 1, 7)",
    }
}

fn prediction_clause(include_predictions: bool) -> String {
    if include_predictions {
        EFFECTIVE_ROW.to_string()
    } else {
        "a.is_prediction = 0".to_string()
    }
}

impl CarbonStore {
    /// Sum and count observations grouped by scope, category or month,
    /// ordered ascending by key. No matches yields an empty vec.
    pub async fn rollup(&self, query: &RollupQuery<'_>) -> Result<Vec<RollupRow>, DatabaseError> {
        let key = group_expr(query.group_by);
        let sql = format!(
            "SELECT {key} AS grp, SUM(a.emission_value), COUNT(*)
             FROM activities a
             WHERE a.org_id = ?1 AND a.activity_date BETWEEN ?2 AND ?3
               AND {}
             GROUP BY grp
             ORDER BY grp",
            prediction_clause(query.include_predictions)
        );
        let mut rows = self
            .db()
            .conn()
            .query(
                &sql,
                libsql::params![query.org_id, query.from.to_string(), query.to.to_string()],
            )
            .await?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            let count = row.get::<i64>(2)?;
            out.push(RollupRow {
                key: row.get::<String>(0)?,
                total: row.get::<f64>(1)?,
                count: u64::try_from(count)
                    .map_err(|_| DatabaseError::InvalidState(format!("negative count {count}")))?,
            });
        }
        Ok(out)
    }

    /// Total emissions in `[from, to]` with the number of rows summed.
    pub async fn total_emissions(
        &self,
        org_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        include_predictions: bool,
    ) -> Result<EmissionTotal, DatabaseError> {
        let sql = format!(
            "SELECT COALESCE(SUM(a.emission_value), 0.0), COUNT(*) FROM activities a
             WHERE a.org_id = ?1 AND a.activity_date BETWEEN ?2 AND ?3 AND {}",
            prediction_clause(include_predictions)
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params![org_id, from.to_string(), to.to_string()])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let count = row.get::<i64>(1)?;
        Ok(EmissionTotal {
            total: row.get::<f64>(0)?,
            observations: u64::try_from(count)
                .map_err(|_| DatabaseError::InvalidState(format!("negative count {count}")))?,
        })
    }

    /// Totals per (month, scope), ascending by month then scope.
    pub async fn monthly_scope_totals(
        &self,
        org_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MonthScopeTotal>, DatabaseError> {
        let sql = format!(
            "SELECT substr(a.activity_date, 1, 7) AS month, a.scope, SUM(a.emission_value)
             FROM activities a
             WHERE a.org_id = ?1 AND a.activity_date BETWEEN ?2 AND ?3 AND {EFFECTIVE_ROW}
             GROUP BY month, a.scope
             ORDER BY month, a.scope"
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params![org_id, from.to_string(), to.to_string()])
            .await?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(MonthScopeTotal {
                month: row.get::<String>(0)?,
                scope: Scope::from_i64(row.get::<i64>(1)?)
                    .map_err(|e| DatabaseError::InvalidState(e.to_string()))?,
                total: row.get::<f64>(2)?,
            });
        }
        Ok(out)
    }
}
