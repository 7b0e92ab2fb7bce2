//! Leaderboard, peer comparison, benchmark and percentile.
//!
//! All four run over [`CarbonEngine::assemble_cohort`] and render something
//! for any sector input. The `_as_of` variants pin "today" for tests.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use cm_core::entities::CohortEntry;
use cm_core::enums::{PerformanceCategory, PracticeLevel, RankingMetric, Trend};
use cm_core::responses::{BenchmarkResult, Leaderboard, PeerComparison, PercentileResult};
use cm_db::repos::rollup::MonthScopeTotal;
use cm_predictor::Predictor;

use crate::engine::{CarbonEngine, today, trailing_window};
use crate::error::EngineError;
use crate::ranking;
use crate::sectors;

/// Relative month-over-month change treated as movement.
const TREND_TOLERANCE: f64 = 0.05;

/// Direction between the last two months that have data.
fn trend_from_months(months: &[MonthScopeTotal]) -> Trend {
    let mut per_month: BTreeMap<&str, f64> = BTreeMap::new();
    for row in months {
        *per_month.entry(row.month.as_str()).or_default() += row.total;
    }
    let totals: Vec<f64> = per_month.into_values().filter(|t| *t > 0.0).collect();
    let [.., previous, last] = totals.as_slice() else {
        return Trend::Stable;
    };
    let change = (last - previous) / previous;
    if change > TREND_TOLERANCE {
        Trend::Increasing
    } else if change < -TREND_TOLERANCE {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

fn own_intensity(entries: &[CohortEntry]) -> Option<f64> {
    entries
        .iter()
        .find(|e| e.is_self)
        .and_then(CohortEntry::intensity)
}

impl<P: Predictor> CarbonEngine<P> {
    /// Sorted cohort on `metric`, lower first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Database`] on store failure.
    pub async fn get_leaderboard(
        &self,
        org_id: &str,
        sector: Option<&str>,
        metric: RankingMetric,
    ) -> Result<Leaderboard, EngineError> {
        self.leaderboard_as_of(org_id, sector, metric, today()).await
    }

    /// [`Self::get_leaderboard`] with a fixed "today".
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Database`] on store failure.
    pub async fn leaderboard_as_of(
        &self,
        org_id: &str,
        sector: Option<&str>,
        metric: RankingMetric,
        today: NaiveDate,
    ) -> Result<Leaderboard, EngineError> {
        let cohort = self.assemble_cohort(org_id, sector, today).await?;
        let entries = ranking::leaderboard(&cohort.entries, metric);
        let self_rank = entries.iter().find(|e| e.is_self).map(|e| e.rank);
        let cohort_size = u32::try_from(entries.len()).unwrap_or(u32::MAX);

        Ok(Leaderboard {
            sector: cohort.sector.name,
            metric,
            entries,
            self_rank,
            cohort_size,
            used_demo_fallback: cohort.used_demo_fallback,
        })
    }

    /// Own standing against the best, mean and worst peer intensity.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Database`] on store failure.
    pub async fn get_peer_comparison(
        &self,
        org_id: &str,
        sector: Option<&str>,
    ) -> Result<PeerComparison, EngineError> {
        self.peer_comparison_as_of(org_id, sector, today()).await
    }

    /// [`Self::get_peer_comparison`] with a fixed "today".
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Database`] on store failure.
    pub async fn peer_comparison_as_of(
        &self,
        org_id: &str,
        sector: Option<&str>,
        today: NaiveDate,
    ) -> Result<PeerComparison, EngineError> {
        let cohort = self.assemble_cohort(org_id, sector, today).await?;
        let outcome = ranking::rank(&cohort.entries, RankingMetric::Intensity);
        let (best, average, worst) = ranking::peer_spread(&cohort.entries);

        let from = trailing_window(today, self.config().cohort.window_days);
        let months = self
            .store()
            .monthly_scope_totals(org_id, from, today)
            .await?;

        Ok(PeerComparison {
            own_total: cohort
                .own()
                .and_then(|e| e.total_emissions)
                .unwrap_or_default(),
            own_intensity: own_intensity(&cohort.entries),
            sector: cohort.sector.name,
            best_intensity: best,
            average_intensity: average,
            worst_intensity: worst,
            percentile: outcome.percentile,
            trend: trend_from_months(&months),
            cohort_size: outcome.cohort_size,
            used_demo_fallback: cohort.used_demo_fallback,
        })
    }

    /// Absolute bucket of own intensity plus matching best practices.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Database`] on store failure.
    pub async fn get_benchmark(
        &self,
        org_id: &str,
        sector: Option<&str>,
    ) -> Result<BenchmarkResult, EngineError> {
        self.benchmark_as_of(org_id, sector, today()).await
    }

    /// [`Self::get_benchmark`] with a fixed "today".
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Database`] on store failure.
    pub async fn benchmark_as_of(
        &self,
        org_id: &str,
        sector: Option<&str>,
        today: NaiveDate,
    ) -> Result<BenchmarkResult, EngineError> {
        let cohort = self.assemble_cohort(org_id, sector, today).await?;
        let reference = sectors::profile_or_default(&cohort.sector.name);
        let intensity = own_intensity(&cohort.entries);
        let bucket = ranking::bucket(intensity, &reference.thresholds);
        let practice_level = PracticeLevel::from(bucket);

        Ok(BenchmarkResult {
            sector: cohort.sector.name,
            intensity,
            bucket,
            thresholds: reference.thresholds,
            practice_level,
            best_practices: reference.practices(practice_level),
            used_demo_fallback: cohort.used_demo_fallback,
        })
    }

    /// Better-than percentile, rank position and badge.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Database`] on store failure.
    pub async fn get_percentile(
        &self,
        org_id: &str,
        sector: Option<&str>,
    ) -> Result<PercentileResult, EngineError> {
        self.percentile_as_of(org_id, sector, today()).await
    }

    /// [`Self::get_percentile`] with a fixed "today".
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Database`] on store failure.
    pub async fn percentile_as_of(
        &self,
        org_id: &str,
        sector: Option<&str>,
        today: NaiveDate,
    ) -> Result<PercentileResult, EngineError> {
        let cohort = self.assemble_cohort(org_id, sector, today).await?;
        let outcome = ranking::rank(&cohort.entries, RankingMetric::Intensity);
        let reference = sectors::profile_or_default(&cohort.sector.name);

        Ok(PercentileResult {
            percentile: outcome.percentile,
            rank_position: outcome.rank_position,
            cohort_size: outcome.cohort_size,
            badge: outcome.badge,
            performance: PerformanceCategory::from_percentile(outcome.percentile),
            bucket: ranking::bucket(own_intensity(&cohort.entries), &reference.thresholds),
            sector: cohort.sector.name,
            used_demo_fallback: cohort.used_demo_fallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cm_core::enums::Scope;

    fn month(month: &str, scope: Scope, total: f64) -> MonthScopeTotal {
        MonthScopeTotal {
            month: month.into(),
            scope,
            total,
        }
    }

    #[test]
    fn trend_compares_last_two_months_with_data() {
        let rising = [
            month("2026-01", Scope::Scope1, 10.0),
            month("2026-02", Scope::Scope1, 6.0),
            month("2026-02", Scope::Scope2, 6.0),
        ];
        assert_eq!(trend_from_months(&rising), Trend::Increasing);

        let falling = [
            month("2026-01", Scope::Scope1, 10.0),
            month("2026-03", Scope::Scope3, 9.0),
        ];
        assert_eq!(trend_from_months(&falling), Trend::Decreasing);

        let flat = [
            month("2026-01", Scope::Scope1, 10.0),
            month("2026-02", Scope::Scope1, 10.4),
        ];
        assert_eq!(trend_from_months(&flat), Trend::Stable);
    }

    #[test]
    fn single_month_is_stable() {
        assert_eq!(
            trend_from_months(&[month("2026-01", Scope::Scope1, 3.0)]),
            Trend::Stable
        );
        assert_eq!(trend_from_months(&[]), Trend::Stable);
    }
}
