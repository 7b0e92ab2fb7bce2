//! Carbon credit price band.

use serde::{Deserialize, Serialize};

const fn default_min_price() -> f64 {
    500.0
}

const fn default_max_price() -> f64 {
    3000.0
}

const fn default_price() -> f64 {
    1500.0
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreditsConfig {
    #[serde(default = "default_min_price")]
    pub min_price: f64,

    #[serde(default = "default_max_price")]
    pub max_price: f64,

    /// Price per credit when a purchase does not name one.
    #[serde(default = "default_price")]
    pub default_price: f64,
}

impl Default for CreditsConfig {
    fn default() -> Self {
        Self {
            min_price: default_min_price(),
            max_price: default_max_price(),
            default_price: default_price(),
        }
    }
}

impl CreditsConfig {
    /// Inclusive band check.
    pub fn price_in_band(&self, price: f64) -> bool {
        price.is_finite() && price >= self.min_price && price <= self.max_price
    }
}
