//! Dashboard rollup: totals, intensities, category and monthly breakdowns,
//! credit position and compliance against the allowed limit.

use std::collections::HashMap;

use chrono::{Datelike, Months, NaiveDate};
use cm_core::enums::{ComplianceStatus, RollupGroup, Scope};
use cm_core::responses::{DashboardRollup, MonthlyTrendPoint, RollupRow};
use cm_db::repos::rollup::RollupQuery;
use cm_predictor::Predictor;

use crate::calculator::round4;
use crate::engine::{CarbonEngine, today, trailing_window};
use crate::error::EngineError;

/// Days covered when no window is given.
pub const DEFAULT_WINDOW_DAYS: u32 = 365;

/// Optional bounds of a dashboard or rollup query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateWindow {
    /// Resolve against `today`: `to` defaults to today, `from` to
    /// [`DEFAULT_WINDOW_DAYS`] before `to`.
    fn resolve(self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), EngineError> {
        let to = self.to.unwrap_or(today);
        let from = self
            .from
            .unwrap_or_else(|| trailing_window(to, DEFAULT_WINDOW_DAYS));
        if from > to {
            return Err(EngineError::Validation(format!(
                "window start {from} is after window end {to}"
            )));
        }
        Ok((from, to))
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - chrono::Duration::days(i64::from(date.day0()))
}

/// `YYYY-MM` keys of the `count` months ending with the month of `end`.
fn month_keys(end: NaiveDate, count: u32) -> Vec<String> {
    let last = first_of_month(end);
    (0..count)
        .rev()
        .filter_map(|back| last.checked_sub_months(Months::new(back)))
        .map(|d| d.format("%Y-%m").to_string())
        .collect()
}

fn scope_total(rows: &[RollupRow], scope: Scope) -> f64 {
    let key = scope.as_i64().to_string();
    rows.iter()
        .find(|r| r.key == key)
        .map_or(0.0, |r| r.total)
}

impl<P: Predictor> CarbonEngine<P> {
    /// Grouped sums over a window, predictions included unless a real row
    /// covers the same date.
    ///
    /// # Errors
    ///
    /// [`EngineError::Validation`] for an inverted window,
    /// [`EngineError::Database`] on store failure.
    pub async fn rollup(
        &self,
        org_id: &str,
        group_by: RollupGroup,
        window: DateWindow,
    ) -> Result<Vec<RollupRow>, EngineError> {
        let (from, to) = window.resolve(today())?;
        Ok(self
            .store()
            .rollup(&RollupQuery {
                org_id,
                from,
                to,
                group_by,
                include_predictions: true,
            })
            .await?)
    }

    /// Dashboard for `org_id` over `window`.
    ///
    /// # Errors
    ///
    /// [`EngineError::Validation`] for an inverted window,
    /// [`EngineError::Database`] on store failure.
    pub async fn get_dashboard_rollup(
        &self,
        org_id: &str,
        window: DateWindow,
    ) -> Result<DashboardRollup, EngineError> {
        self.dashboard_rollup_as_of(org_id, window, today()).await
    }

    /// [`Self::get_dashboard_rollup`] with a fixed "today".
    ///
    /// # Errors
    ///
    /// See [`Self::get_dashboard_rollup`].
    pub async fn dashboard_rollup_as_of(
        &self,
        org_id: &str,
        window: DateWindow,
        today: NaiveDate,
    ) -> Result<DashboardRollup, EngineError> {
        let cfg = &self.config().dashboard;
        let (from, to) = window.resolve(today)?;
        let profile = self.store().find_organization(org_id).await?;

        let query = |group_by| RollupQuery {
            org_id,
            from,
            to,
            group_by,
            include_predictions: true,
        };
        let scopes = self.store().rollup(&query(RollupGroup::Scope)).await?;
        let categories = self.store().rollup(&query(RollupGroup::Category)).await?;

        let scope1 = scope_total(&scopes, Scope::Scope1);
        let scope2 = scope_total(&scopes, Scope::Scope2);
        let scope3 = scope_total(&scopes, Scope::Scope3);
        let total = scope1 + scope2 + scope3;

        #[allow(clippy::cast_precision_loss)]
        let per_employee = profile
            .as_ref()
            .and_then(|p| p.employees())
            .map(|n| round4(total / n as f64));
        let per_million_revenue = profile
            .as_ref()
            .and_then(|p| p.annual_revenue)
            .filter(|r| r.is_finite() && *r > 0.0)
            .map(|r| round4(total / r * 1_000_000.0));

        let keys = month_keys(to, cfg.trend_months);
        let trend_start = keys
            .first()
            .and_then(|k| NaiveDate::parse_from_str(&format!("{k}-01"), "%Y-%m-%d").ok())
            .unwrap_or(from);
        let mut by_month: HashMap<String, [f64; 3]> = HashMap::new();
        for row in self
            .store()
            .monthly_scope_totals(org_id, trend_start, to)
            .await?
        {
            let idx = match row.scope {
                Scope::Scope1 => 0,
                Scope::Scope2 => 1,
                Scope::Scope3 => 2,
            };
            by_month.entry(row.month).or_default()[idx] += row.total;
        }
        let monthly_trend = keys
            .into_iter()
            .map(|month| {
                let [s1, s2, s3] = by_month.get(&month).copied().unwrap_or_default();
                MonthlyTrendPoint {
                    month,
                    total: round4(s1 + s2 + s3),
                    scope1: round4(s1),
                    scope2: round4(s2),
                    scope3: round4(s3),
                }
            })
            .collect();

        let credits = self.store().credit_totals(org_id).await?;

        Ok(DashboardRollup {
            org_id: org_id.to_string(),
            window_start: from,
            window_end: to,
            total_emissions: round4(total),
            scope1: round4(scope1),
            scope2: round4(scope2),
            scope3: round4(scope3),
            per_employee,
            per_million_revenue,
            categories,
            monthly_trend,
            credits_earned: credits.earned,
            credits_used: credits.used,
            credit_balance: credits.balance(),
            allowed_limit: cfg.allowed_limit,
            compliance: ComplianceStatus::evaluate(total, cfg.allowed_limit),
            excess_emissions: round4((total - cfg.allowed_limit).max(0.0)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_keys_cross_year_boundary() {
        assert_eq!(
            month_keys(date(2026, 2, 14), 4),
            vec!["2025-11", "2025-12", "2026-01", "2026-02"]
        );
        assert!(month_keys(date(2026, 2, 14), 0).is_empty());
    }

    #[test]
    fn window_defaults_to_trailing_year() {
        let today = date(2026, 6, 30);
        let (from, to) = DateWindow::default().resolve(today).unwrap();
        assert_eq!(to, today);
        assert_eq!(from, date(2025, 7, 1));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let window = DateWindow {
            from: Some(date(2026, 2, 1)),
            to: Some(date(2026, 1, 1)),
        };
        assert!(matches!(
            window.resolve(date(2026, 6, 30)),
            Err(EngineError::Validation(_))
        ));
    }
}
