//! Remote forecasting oracle configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const fn default_timeout_secs() -> u64 {
    5
}

const fn default_confidence() -> f64 {
    0.75
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PredictorConfig {
    /// Endpoint accepting `POST {sector, trailing_series, employee_count}`.
    /// Empty means no remote predictor; the statistical fallback is used.
    #[serde(default)]
    pub url: String,

    /// Client-side timeout for the single call per fill batch.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Confidence attached when the predictor omits one.
    #[serde(default = "default_confidence")]
    pub default_confidence: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: default_timeout_secs(),
            default_confidence: default_confidence(),
        }
    }
}

impl PredictorConfig {
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = PredictorConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn whitespace_url_is_not_configured() {
        let config = PredictorConfig {
            url: "   ".into(),
            ..PredictorConfig::default()
        };
        assert!(!config.is_configured());
    }
}
