//! Gap detection and forecast fill policy.

use serde::{Deserialize, Serialize};

const fn default_window_days() -> u32 {
    90
}

const fn default_min_real_observations() -> u32 {
    7
}

const fn default_cap() -> u32 {
    30
}

const fn default_fallback_confidence() -> f64 {
    0.6
}

const fn default_scope_split() -> [f64; 3] {
    [0.3, 0.4, 0.3]
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ForecastConfig {
    /// Trailing window scanned for missing dates, today inclusive.
    #[serde(default = "default_window_days")]
    pub window_days: u32,

    /// Fewer real observations in the window than this and the filler
    /// refuses to run.
    #[serde(default = "default_min_real_observations")]
    pub min_real_observations: u32,

    /// Maximum dates written per fill run.
    #[serde(default = "default_cap")]
    pub fill_cap: u32,

    /// Maximum dates listed by the missing-dates report.
    #[serde(default = "default_cap")]
    pub display_cap: u32,

    /// Confidence of the arithmetic-mean fallback.
    #[serde(default = "default_fallback_confidence")]
    pub fallback_confidence: f64,

    /// Share of a predicted daily total assigned to scopes 1, 2 and 3.
    #[serde(default = "default_scope_split")]
    pub scope_split: [f64; 3],
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            min_real_observations: default_min_real_observations(),
            fill_cap: default_cap(),
            display_cap: default_cap(),
            fallback_confidence: default_fallback_confidence(),
            scope_split: default_scope_split(),
        }
    }
}
