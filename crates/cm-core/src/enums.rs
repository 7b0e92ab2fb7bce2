//! Scopes, categories, transaction types and ranking labels.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! and expose `as_str()` for the value stored in SQL.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

/// GHG accounting scope.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Scope1,
    Scope2,
    Scope3,
}

impl Scope {
    pub const ALL: [Self; 3] = [Self::Scope1, Self::Scope2, Self::Scope3];

    /// Integer stored in the `scope` column.
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        match self {
            Self::Scope1 => 1,
            Self::Scope2 => 2,
            Self::Scope3 => 3,
        }
    }

    /// Inverse of [`Scope::as_i64`].
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for anything outside 1..=3.
    pub fn from_i64(value: i64) -> Result<Self, CoreError> {
        match value {
            1 => Ok(Self::Scope1),
            2 => Ok(Self::Scope2),
            3 => Ok(Self::Scope3),
            other => Err(CoreError::Validation(format!(
                "scope must be 1, 2 or 3, got {other}"
            ))),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scope1 => "scope1",
            Self::Scope2 => "scope2",
            Self::Scope3 => "scope3",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Scope1 => "Scope 1",
            Self::Scope2 => "Scope 2",
            Self::Scope3 => "Scope 3",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Scope {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.chars().filter(char::is_ascii_digit).collect();
        digits
            .parse::<i64>()
            .map_err(|_| CoreError::Validation(format!("invalid scope '{s}'")))
            .and_then(Self::from_i64)
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Activity category. Closed set per scope.
///
/// `ForecastEstimate` belongs to no scope in particular and is reserved for
/// predicted observations written by the forecast filler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    // Scope 1
    FuelCombustion,
    CompanyVehicles,
    MachineryEquipment,
    ProcessEmissions,
    Refrigerants,
    FugitiveEmissions,
    // Scope 2
    ElectricityConsumption,
    PurchasedSteam,
    PurchasedHeating,
    PurchasedCooling,
    // Scope 3
    BusinessTravel,
    EmployeeCommuting,
    FreightLogistics,
    WasteGenerated,
    PurchasedGoods,
    RawMaterials,
    CapitalGoods,
    UpstreamTransport,
    DownstreamTransport,
    // Predicted
    ForecastEstimate,
}

impl Category {
    pub const ALL: [Self; 20] = [
        Self::FuelCombustion,
        Self::CompanyVehicles,
        Self::MachineryEquipment,
        Self::ProcessEmissions,
        Self::Refrigerants,
        Self::FugitiveEmissions,
        Self::ElectricityConsumption,
        Self::PurchasedSteam,
        Self::PurchasedHeating,
        Self::PurchasedCooling,
        Self::BusinessTravel,
        Self::EmployeeCommuting,
        Self::FreightLogistics,
        Self::WasteGenerated,
        Self::PurchasedGoods,
        Self::RawMaterials,
        Self::CapitalGoods,
        Self::UpstreamTransport,
        Self::DownstreamTransport,
        Self::ForecastEstimate,
    ];

    /// The scope this category belongs to. `None` for `ForecastEstimate`.
    #[must_use]
    pub const fn scope(self) -> Option<Scope> {
        match self {
            Self::FuelCombustion
            | Self::CompanyVehicles
            | Self::MachineryEquipment
            | Self::ProcessEmissions
            | Self::Refrigerants
            | Self::FugitiveEmissions => Some(Scope::Scope1),
            Self::ElectricityConsumption
            | Self::PurchasedSteam
            | Self::PurchasedHeating
            | Self::PurchasedCooling => Some(Scope::Scope2),
            Self::BusinessTravel
            | Self::EmployeeCommuting
            | Self::FreightLogistics
            | Self::WasteGenerated
            | Self::PurchasedGoods
            | Self::RawMaterials
            | Self::CapitalGoods
            | Self::UpstreamTransport
            | Self::DownstreamTransport => Some(Scope::Scope3),
            Self::ForecastEstimate => None,
        }
    }

    /// Whether a real observation in `scope` may use this category.
    #[must_use]
    pub fn allows_real(self, scope: Scope) -> bool {
        self.scope() == Some(scope)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FuelCombustion => "fuel_combustion",
            Self::CompanyVehicles => "company_vehicles",
            Self::MachineryEquipment => "machinery_equipment",
            Self::ProcessEmissions => "process_emissions",
            Self::Refrigerants => "refrigerants",
            Self::FugitiveEmissions => "fugitive_emissions",
            Self::ElectricityConsumption => "electricity_consumption",
            Self::PurchasedSteam => "purchased_steam",
            Self::PurchasedHeating => "purchased_heating",
            Self::PurchasedCooling => "purchased_cooling",
            Self::BusinessTravel => "business_travel",
            Self::EmployeeCommuting => "employee_commuting",
            Self::FreightLogistics => "freight_logistics",
            Self::WasteGenerated => "waste_generated",
            Self::PurchasedGoods => "purchased_goods",
            Self::RawMaterials => "raw_materials",
            Self::CapitalGoods => "capital_goods",
            Self::UpstreamTransport => "upstream_transport",
            Self::DownstreamTransport => "downstream_transport",
            Self::ForecastEstimate => "forecast_estimate",
        }
    }

    /// Human-readable label, e.g. `"Fuel Combustion"`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FuelCombustion => "Fuel Combustion",
            Self::CompanyVehicles => "Company Vehicles",
            Self::MachineryEquipment => "Machinery & Equipment",
            Self::ProcessEmissions => "Process Emissions",
            Self::Refrigerants => "Refrigerants",
            Self::FugitiveEmissions => "Fugitive Emissions",
            Self::ElectricityConsumption => "Electricity Consumption",
            Self::PurchasedSteam => "Purchased Steam",
            Self::PurchasedHeating => "Purchased Heating",
            Self::PurchasedCooling => "Purchased Cooling",
            Self::BusinessTravel => "Business Travel",
            Self::EmployeeCommuting => "Employee Commuting",
            Self::FreightLogistics => "Freight & Logistics",
            Self::WasteGenerated => "Waste Generated",
            Self::PurchasedGoods => "Purchased Goods",
            Self::RawMaterials => "Raw Materials",
            Self::CapitalGoods => "Capital Goods",
            Self::UpstreamTransport => "Upstream Transport",
            Self::DownstreamTransport => "Downstream Transport",
            Self::ForecastEstimate => "Forecast Estimate",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    /// Accepts either the snake_case key or the human label (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == needle || c.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| CoreError::Validation(format!("unknown category '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// TransactionType
// ---------------------------------------------------------------------------

/// Kind of carbon credit transaction.
///
/// Only `Earned` and `Purchased` add to the balance and only `Used` subtracts.
/// `Transferred` and `Expired` are recorded for reporting and do not move it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Earned,
    Purchased,
    Used,
    Transferred,
    Expired,
}

impl TransactionType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Earned => "earned",
            Self::Purchased => "purchased",
            Self::Used => "used",
            Self::Transferred => "transferred",
            Self::Expired => "expired",
        }
    }

    /// Signed contribution of one credit of this type to the balance.
    #[must_use]
    pub const fn balance_sign(self) -> f64 {
        match self {
            Self::Earned | Self::Purchased => 1.0,
            Self::Used => -1.0,
            Self::Transferred | Self::Expired => 0.0,
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CreditSource
// ---------------------------------------------------------------------------

/// Where credits came from (or went to).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CreditSource {
    SolarPower,
    WindPower,
    EnergyEfficiencyProject,
    TreePlantation,
    VoluntaryReduction,
    CarbonMarket,
    EmissionOffset,
}

impl CreditSource {
    pub const ALL: [Self; 7] = [
        Self::SolarPower,
        Self::WindPower,
        Self::EnergyEfficiencyProject,
        Self::TreePlantation,
        Self::VoluntaryReduction,
        Self::CarbonMarket,
        Self::EmissionOffset,
    ];

    /// Reduction projects that can mint credits through `earn`.
    #[must_use]
    pub const fn is_reduction_project(self) -> bool {
        matches!(
            self,
            Self::SolarPower
                | Self::WindPower
                | Self::EnergyEfficiencyProject
                | Self::TreePlantation
                | Self::VoluntaryReduction
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SolarPower => "solar_power",
            Self::WindPower => "wind_power",
            Self::EnergyEfficiencyProject => "energy_efficiency_project",
            Self::TreePlantation => "tree_plantation",
            Self::VoluntaryReduction => "voluntary_reduction",
            Self::CarbonMarket => "carbon_market",
            Self::EmissionOffset => "emission_offset",
        }
    }
}

impl fmt::Display for CreditSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreditSource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|src| src.as_str() == key)
            .ok_or_else(|| CoreError::Validation(format!("unknown credit source '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Ranking labels
// ---------------------------------------------------------------------------

/// Absolute sector benchmark bucket for per-employee intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkBucket {
    Excellent,
    Average,
    High,
    Unknown,
}

impl BenchmarkBucket {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Average => "average",
            Self::High => "high",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for BenchmarkBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rank badge awarded by sorted position within the cohort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Badge {
    #[serde(rename = "Top 10%")]
    Top10,
    #[serde(rename = "Top 25%")]
    Top25,
}

impl Badge {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top10 => "Top 10%",
            Self::Top25 => "Top 25%",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse performance label derived from the better-than percentile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceCategory {
    TopPerformer,
    AboveAverage,
    Average,
    BelowAverage,
    NeedsImprovement,
}

impl PerformanceCategory {
    /// Higher percentile is better.
    #[must_use]
    pub const fn from_percentile(percentile: u8) -> Self {
        match percentile {
            90.. => Self::TopPerformer,
            75..=89 => Self::AboveAverage,
            50..=74 => Self::Average,
            25..=49 => Self::BelowAverage,
            _ => Self::NeedsImprovement,
        }
    }
}

/// Practice level used to pick sector best practices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PracticeLevel {
    High,
    Medium,
    Low,
}

impl From<BenchmarkBucket> for PracticeLevel {
    fn from(bucket: BenchmarkBucket) -> Self {
        match bucket {
            BenchmarkBucket::Excellent => Self::Low,
            BenchmarkBucket::Average | BenchmarkBucket::Unknown => Self::Medium,
            BenchmarkBucket::High => Self::High,
        }
    }
}

/// Basis a leaderboard is sorted on. Lower is better for both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RankingMetric {
    /// Total emissions per employee.
    #[default]
    Intensity,
    /// Raw total emissions.
    Total,
}

impl RankingMetric {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Intensity => "intensity",
            Self::Total => "total",
        }
    }
}

impl FromStr for RankingMetric {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "intensity" | "per_employee" => Ok(Self::Intensity),
            "total" | "total_emissions" => Ok(Self::Total),
            other => Err(CoreError::Validation(format!(
                "metric must be 'intensity' or 'total', got '{other}'"
            ))),
        }
    }
}

/// Month-over-month direction of an organization's emissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

/// Compliance status against the allowed emission limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Good,
    Warning,
    Exceeded,
}

impl ComplianceStatus {
    /// `Good` below 80 % of the limit, `Warning` below 100 %, else `Exceeded`.
    #[must_use]
    pub fn evaluate(total: f64, allowed_limit: f64) -> Self {
        if total < allowed_limit * 0.8 {
            Self::Good
        } else if total < allowed_limit {
            Self::Warning
        } else {
            Self::Exceeded
        }
    }
}

// ---------------------------------------------------------------------------
// Forecasting
// ---------------------------------------------------------------------------

/// Which link of the predictor chain produced a forecast value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ForecastSource {
    /// The remote predictor answered.
    Model,
    /// Arithmetic mean of the trailing real series.
    Fallback,
}

impl ForecastSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ForecastSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grouping key for rollups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RollupGroup {
    Scope,
    Category,
    Month,
}
