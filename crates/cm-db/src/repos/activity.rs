//! Activity observation repository: real inserts, idempotent predicted
//! inserts, filtered listing and per-day series.

use chrono::{NaiveDate, Utc};

use cm_core::entities::{ActivityObservation, ActivityPayload, FactorRef};
use cm_core::enums::{Category, ForecastSource, Scope};
use cm_core::ids::PREFIX_ACTIVITY;

use crate::error::DatabaseError;
use crate::helpers::{
    get_bool, get_opt_f64, get_opt_string, parse_date, parse_datetime, parse_enum, parse_opt_enum,
};
use crate::store::CarbonStore;

const SELECT_COLS: &str = "a.id, a.org_id, a.activity_date, a.scope, a.category,
    a.kind, a.quantity, a.unit, a.mode, a.weight, a.emission_value,
    a.factor_key, a.factor_value, a.factor_unit, a.factor_source,
    a.is_prediction, a.prediction_confidence, a.prediction_source, a.created_at";

fn row_to_activity(row: &libsql::Row) -> Result<ActivityObservation, DatabaseError> {
    let payload = match get_opt_string(row, 5)? {
        Some(kind) => Some(ActivityPayload {
            kind,
            quantity: get_opt_f64(row, 6)?.unwrap_or(0.0),
            unit: get_opt_string(row, 7)?.unwrap_or_default(),
            mode: get_opt_string(row, 8)?,
            weight: get_opt_f64(row, 9)?,
        }),
        None => None,
    };
    let factor = match (get_opt_string(row, 11)?, get_opt_f64(row, 12)?) {
        (Some(key), Some(value)) => Some(FactorRef {
            key,
            value,
            unit: get_opt_string(row, 13)?.unwrap_or_default(),
            source: get_opt_string(row, 14)?.unwrap_or_default(),
        }),
        _ => None,
    };
    let scope = Scope::from_i64(row.get::<i64>(3)?)
        .map_err(|e| DatabaseError::InvalidState(e.to_string()))?;

    Ok(ActivityObservation {
        id: row.get::<String>(0)?,
        org_id: row.get::<String>(1)?,
        activity_date: parse_date(&row.get::<String>(2)?)?,
        scope,
        category: parse_enum(&row.get::<String>(4)?)?,
        payload,
        emission_value: row.get::<f64>(10)?,
        factor,
        is_prediction: get_bool(row, 15)?,
        prediction_confidence: get_opt_f64(row, 16)?,
        prediction_source: parse_opt_enum(get_opt_string(row, 17)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(18)?)?,
    })
}

/// A real observation to store.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub org_id: String,
    pub activity_date: NaiveDate,
    pub scope: Scope,
    pub category: Category,
    pub payload: ActivityPayload,
    pub emission_value: f64,
    pub factor: FactorRef,
}

/// A predicted observation to store.
#[derive(Debug, Clone)]
pub struct NewPrediction<'a> {
    pub org_id: &'a str,
    pub activity_date: NaiveDate,
    pub scope: Scope,
    pub emission_value: f64,
    pub confidence: f64,
    pub source: ForecastSource,
}

/// Filters for [`CarbonStore::list_activities`].
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub scope: Option<Scope>,
    pub category: Option<Category>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// `None` returns both, `Some(false)` only real, `Some(true)` only predicted.
    pub is_prediction: Option<bool>,
    pub limit: Option<u32>,
}

impl CarbonStore {
    pub async fn insert_activity(
        &self,
        new: &NewActivity,
    ) -> Result<ActivityObservation, DatabaseError> {
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_ACTIVITY).await?;

        self.db()
            .conn()
            .execute(
                "INSERT INTO activities (id, org_id, activity_date, scope, category,
                    kind, quantity, unit, mode, weight, emission_value,
                    factor_key, factor_value, factor_unit, factor_source,
                    is_prediction, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, 0, ?16)",
                libsql::params![
                    id.as_str(),
                    new.org_id.as_str(),
                    new.activity_date.to_string(),
                    new.scope.as_i64(),
                    new.category.as_str(),
                    new.payload.kind.as_str(),
                    new.payload.quantity,
                    new.payload.unit.as_str(),
                    new.payload.mode.as_deref(),
                    new.payload.weight,
                    new.emission_value,
                    new.factor.key.as_str(),
                    new.factor.value,
                    new.factor.unit.as_str(),
                    new.factor.source.as_str(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(ActivityObservation {
            id,
            org_id: new.org_id.clone(),
            activity_date: new.activity_date,
            scope: new.scope,
            category: new.category,
            payload: Some(new.payload.clone()),
            emission_value: new.emission_value,
            factor: Some(new.factor.clone()),
            is_prediction: false,
            prediction_confidence: None,
            prediction_source: None,
            created_at: now,
        })
    }

    /// Insert a predicted observation unless one already exists for
    /// (org, date, scope) or any real observation exists on that date.
    ///
    /// Returns `true` when a row was written.
    pub async fn insert_prediction(&self, new: &NewPrediction<'_>) -> Result<bool, DatabaseError> {
        let id = self.db().generate_id(PREFIX_ACTIVITY).await?;
        let date = new.activity_date.to_string();

        let changed = self
            .db()
            .conn()
            .execute(
                "INSERT OR IGNORE INTO activities (id, org_id, activity_date, scope, category,
                    emission_value, is_prediction, prediction_confidence, prediction_source, created_at)
                 SELECT ?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?8, ?9
                 WHERE NOT EXISTS (
                     SELECT 1 FROM activities
                     WHERE org_id = ?2 AND activity_date = ?3 AND is_prediction = 0)",
                libsql::params![
                    id.as_str(),
                    new.org_id,
                    date,
                    new.scope.as_i64(),
                    Category::ForecastEstimate.as_str(),
                    new.emission_value,
                    new.confidence,
                    new.source.as_str(),
                    Utc::now().to_rfc3339()
                ],
            )
            .await?;
        Ok(changed > 0)
    }

    pub async fn list_activities(
        &self,
        org_id: &str,
        filter: &ActivityFilter,
    ) -> Result<Vec<ActivityObservation>, DatabaseError> {
        let mut params: Vec<libsql::Value> = vec![org_id.into()];
        let mut conditions = vec!["a.org_id = ?1".to_string()];

        if let Some(scope) = filter.scope {
            params.push(scope.as_i64().into());
            conditions.push(format!("a.scope = ?{}", params.len()));
        }
        if let Some(category) = filter.category {
            params.push(category.as_str().into());
            conditions.push(format!("a.category = ?{}", params.len()));
        }
        if let Some(from) = filter.from {
            params.push(from.to_string().into());
            conditions.push(format!("a.activity_date >= ?{}", params.len()));
        }
        if let Some(to) = filter.to {
            params.push(to.to_string().into());
            conditions.push(format!("a.activity_date <= ?{}", params.len()));
        }
        if let Some(predicted) = filter.is_prediction {
            params.push(i64::from(predicted).into());
            conditions.push(format!("a.is_prediction = ?{}", params.len()));
        }

        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT {SELECT_COLS} FROM activities a
             WHERE {}
             ORDER BY a.activity_date DESC, a.created_at DESC, a.rowid DESC
             LIMIT {limit}",
            conditions.join(" AND ")
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut activities = Vec::new();
        while let Some(row) = rows.next().await? {
            activities.push(row_to_activity(&row)?);
        }
        Ok(activities)
    }

    /// Daily totals of real observations in `[from, to]`, oldest first.
    /// Days without real observations are absent.
    pub async fn daily_real_totals(
        &self,
        org_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT activity_date, SUM(emission_value) FROM activities
                 WHERE org_id = ?1 AND is_prediction = 0 AND activity_date BETWEEN ?2 AND ?3
                 GROUP BY activity_date
                 ORDER BY activity_date",
                libsql::params![org_id, from.to_string(), to.to_string()],
            )
            .await?;
        let mut series = Vec::new();
        while let Some(row) = rows.next().await? {
            series.push((parse_date(&row.get::<String>(0)?)?, row.get::<f64>(1)?));
        }
        Ok(series)
    }
}
