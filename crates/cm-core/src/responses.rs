//! Response types returned by the engine's exposed operations.
//!
//! These are the JSON shapes printed by `cmtr` for the dashboard, leaderboard,
//! peers, benchmark, percentile, gap and credit commands.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{CreditTransaction, FactorRef};
use crate::enums::{
    Badge, BenchmarkBucket, ComplianceStatus, ForecastSource, PerformanceCategory, PracticeLevel,
    RankingMetric, Trend,
};

// ---------------------------------------------------------------------------
// Calculation & rollups
// ---------------------------------------------------------------------------

/// Result of pricing one activity.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct EmissionCalculation {
    /// tCO2e, rounded to four decimals.
    pub emission_value: f64,
    pub factor: FactorRef,
    /// Quantity after unit normalization (e.g. miles converted to km).
    pub normalized_quantity: f64,
    pub normalized_unit: String,
}

/// One group of a rollup.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RollupRow {
    /// `"1"`..`"3"` for scope, the category key, or `"YYYY-MM"` for month.
    pub key: String,
    pub total: f64,
    pub count: u64,
}

/// One month of the dashboard trend.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct MonthlyTrendPoint {
    /// `YYYY-MM`.
    pub month: String,
    pub total: f64,
    pub scope1: f64,
    pub scope2: f64,
    pub scope3: f64,
}

/// Response from `cmtr dashboard`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct DashboardRollup {
    pub org_id: String,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub total_emissions: f64,
    pub scope1: f64,
    pub scope2: f64,
    pub scope3: f64,
    pub per_employee: Option<f64>,
    /// tCO2e per million of annual revenue.
    pub per_million_revenue: Option<f64>,
    pub categories: Vec<RollupRow>,
    pub monthly_trend: Vec<MonthlyTrendPoint>,
    pub credits_earned: f64,
    pub credits_used: f64,
    pub credit_balance: f64,
    pub allowed_limit: f64,
    pub compliance: ComplianceStatus,
    pub excess_emissions: f64,
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// One row of a leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct LeaderboardEntry {
    /// 1-based sorted position.
    pub rank: u32,
    pub label: String,
    pub employee_count: Option<i64>,
    pub total_emissions: f64,
    pub intensity: Option<f64>,
    pub is_self: bool,
    pub is_synthetic: bool,
    pub badge: Option<Badge>,
}

/// Response from `cmtr leaderboard`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Leaderboard {
    pub sector: String,
    pub metric: RankingMetric,
    pub entries: Vec<LeaderboardEntry>,
    /// Own position, `None` when the organization cannot be ranked on `metric`.
    pub self_rank: Option<u32>,
    pub cohort_size: u32,
    pub used_demo_fallback: bool,
}

/// Response from `cmtr peers`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct PeerComparison {
    pub sector: String,
    pub own_total: f64,
    pub own_intensity: Option<f64>,
    pub best_intensity: Option<f64>,
    pub average_intensity: Option<f64>,
    pub worst_intensity: Option<f64>,
    pub percentile: u8,
    pub trend: Trend,
    pub cohort_size: u32,
    pub used_demo_fallback: bool,
}

/// Absolute per-employee thresholds of a sector, tCO2e per employee.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct SectorThresholds {
    pub excellent: f64,
    pub good: f64,
    pub average: f64,
    pub needs_improvement: f64,
}

/// Response from `cmtr benchmark`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct BenchmarkResult {
    pub sector: String,
    pub intensity: Option<f64>,
    pub bucket: BenchmarkBucket,
    pub thresholds: SectorThresholds,
    pub practice_level: PracticeLevel,
    pub best_practices: Vec<String>,
    pub used_demo_fallback: bool,
}

/// Response from `cmtr percentile`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct PercentileResult {
    pub sector: String,
    /// Better-than percentile, 0..=100, higher is better.
    pub percentile: u8,
    pub rank_position: Option<u32>,
    pub cohort_size: u32,
    pub badge: Option<Badge>,
    pub performance: PerformanceCategory,
    pub bucket: BenchmarkBucket,
    pub used_demo_fallback: bool,
}

// ---------------------------------------------------------------------------
// Gaps
// ---------------------------------------------------------------------------

/// Response from `cmtr gaps missing`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MissingDatesReport {
    pub org_id: String,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    /// Most recent missing dates, oldest first, capped for display.
    pub missing_dates: Vec<NaiveDate>,
    pub total_missing: u32,
    /// Real observations in the window, counted per row.
    pub real_observations: u32,
    pub can_fill: bool,
}

/// One date handled by a fill run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FilledDate {
    pub date: NaiveDate,
    pub source: ForecastSource,
    pub confidence: f64,
    /// Number of predicted rows actually inserted (0 when already filled).
    pub rows_written: u32,
}

/// Response from `cmtr gaps fill`.
///
/// `source`, `confidence` and `predicted_daily_total` are `None` when the
/// window had no missing dates and no prediction was made.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FillReport {
    pub org_id: String,
    /// Dates that received at least one new predicted row.
    pub filled: u32,
    pub total_missing: u32,
    pub source: Option<ForecastSource>,
    pub confidence: Option<f64>,
    pub predicted_daily_total: Option<f64>,
    pub dates: Vec<FilledDate>,
}

// ---------------------------------------------------------------------------
// Credits
// ---------------------------------------------------------------------------

/// Response from `cmtr credits balance`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CreditBalance {
    pub org_id: String,
    pub balance: f64,
}

/// Response from `cmtr credits summary`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CreditSummary {
    pub org_id: String,
    pub balance: f64,
    pub earned: f64,
    pub purchased: f64,
    pub used: f64,
    pub total_cost: f64,
    pub total_revenue: f64,
    pub recent: Vec<CreditTransaction>,
}
