//! Dashboard compliance settings.

use serde::{Deserialize, Serialize};

const fn default_allowed_limit() -> f64 {
    100.0
}

const fn default_trend_months() -> u32 {
    6
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    /// Allowed emissions in tCO2e for the compliance status.
    #[serde(default = "default_allowed_limit")]
    pub allowed_limit: f64,

    /// Months shown in the monthly trend, current month included.
    #[serde(default = "default_trend_months")]
    pub trend_months: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            allowed_limit: default_allowed_limit(),
            trend_months: default_trend_months(),
        }
    }
}
