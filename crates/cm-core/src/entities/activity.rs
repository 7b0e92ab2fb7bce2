use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Category, ForecastSource, Scope};

/// Raw, kind-dependent input of a logged activity.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ActivityPayload {
    /// Activity kind, e.g. `"Diesel"`, `"Electricity"`, `"Transport"`.
    pub kind: String,
    pub quantity: f64,
    pub unit: String,
    /// Sub-mode: transport mode (`Air`, `Rail`, `Road`, `Ship`, `Car`) or
    /// electricity source (`Grid`, `Renewable`).
    pub mode: Option<String>,
    /// Cargo weight in tonnes for freight transport.
    pub weight: Option<f64>,
}

/// The emission factor an observation was priced with.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FactorRef {
    /// Factor table key that matched, e.g. `"Road Freight"`.
    pub key: String,
    /// kg CO2e per unit.
    pub value: f64,
    pub unit: String,
    pub source: String,
}

/// One emission observation for an organization on a calendar day.
///
/// Real observations carry a payload and factor reference. Predicted ones are
/// written by the forecast filler with `category = ForecastEstimate`, a
/// confidence and the predictor link that produced them.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ActivityObservation {
    pub id: String,
    pub org_id: String,
    pub activity_date: NaiveDate,
    pub scope: Scope,
    pub category: Category,
    pub payload: Option<ActivityPayload>,
    /// tCO2e, never negative.
    pub emission_value: f64,
    pub factor: Option<FactorRef>,
    pub is_prediction: bool,
    pub prediction_confidence: Option<f64>,
    pub prediction_source: Option<ForecastSource>,
    pub created_at: DateTime<Utc>,
}
