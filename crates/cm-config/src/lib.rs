//! # cm-config
//!
//! Layered configuration loading for CarbonMeter using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`CARBON_*` prefix, `__` as separator)
//! 2. Project-level `.carbon/config.toml`
//! 3. User-level `~/.config/carbonmeter/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `CARBON_PREDICTOR__URL` -> `predictor.url`,
//! `CARBON_CREDITS__MAX_PRICE` -> `credits.max_price`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use cm_config::CarbonConfig;
//!
//! let config = CarbonConfig::load_with_dotenv().expect("config");
//! config.validate().expect("valid config");
//!
//! if config.predictor.is_configured() {
//!     println!("Predictor: {}", config.predictor.url);
//! }
//! ```

mod cohort;
mod credits;
mod dashboard;
mod error;
mod forecast;
mod general;
mod predictor;

pub use cohort::CohortConfig;
pub use credits::CreditsConfig;
pub use dashboard::DashboardConfig;
pub use error::ConfigError;
pub use forecast::ForecastConfig;
pub use general::GeneralConfig;
pub use predictor::PredictorConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CarbonConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub predictor: PredictorConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub cohort: CohortConfig,
    #[serde(default)]
    pub credits: CreditsConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl CarbonConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".carbon/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("CARBON_").split("__"))
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let credits = &self.credits;
        if !(credits.min_price.is_finite() && credits.max_price.is_finite())
            || credits.min_price <= 0.0
        {
            return Err(ConfigError::invalid(
                "credits.min_price",
                "price band must be finite and positive",
            ));
        }
        if credits.min_price > credits.max_price {
            return Err(ConfigError::invalid(
                "credits.max_price",
                format!(
                    "max_price {} is below min_price {}",
                    credits.max_price, credits.min_price
                ),
            ));
        }
        if !credits.price_in_band(credits.default_price) {
            return Err(ConfigError::invalid(
                "credits.default_price",
                "default price must lie inside the price band",
            ));
        }

        let forecast = &self.forecast;
        if forecast.window_days == 0 {
            return Err(ConfigError::invalid("forecast.window_days", "must be positive"));
        }
        if forecast.fill_cap == 0 || forecast.display_cap == 0 {
            return Err(ConfigError::invalid("forecast.fill_cap", "caps must be positive"));
        }
        check_confidence("forecast.fallback_confidence", forecast.fallback_confidence)?;
        check_confidence("predictor.default_confidence", self.predictor.default_confidence)?;
        if forecast.scope_split.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(ConfigError::invalid(
                "forecast.scope_split",
                "shares must be non-negative",
            ));
        }
        let sum: f64 = forecast.scope_split.iter().sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(ConfigError::invalid(
                "forecast.scope_split",
                format!("shares must sum to 1, got {sum}"),
            ));
        }

        if self.cohort.window_days == 0 {
            return Err(ConfigError::invalid("cohort.window_days", "must be positive"));
        }
        if self.cohort.default_sector.trim().is_empty() {
            return Err(ConfigError::invalid("cohort.default_sector", "must not be empty"));
        }
        if !(self.dashboard.allowed_limit.is_finite() && self.dashboard.allowed_limit > 0.0) {
            return Err(ConfigError::invalid(
                "dashboard.allowed_limit",
                "must be a positive number",
            ));
        }
        if self.dashboard.trend_months == 0 {
            return Err(ConfigError::invalid("dashboard.trend_months", "must be positive"));
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("carbonmeter").join("config.toml"))
    }

    /// Load `.env` from the workspace root, falling back to the current dir.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

fn check_confidence(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} is outside [0, 1]")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = CarbonConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.predictor.is_configured());
        assert_eq!(config.forecast.window_days, 90);
        assert_eq!(config.cohort.min_real_peers, 3);
    }

    #[test]
    fn inverted_price_band_is_rejected() {
        let mut config = CarbonConfig::default();
        config.credits.min_price = 4000.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "credits.max_price"));
    }

    #[test]
    fn scope_split_must_sum_to_one() {
        let mut config = CarbonConfig::default();
        config.forecast.scope_split = [0.5, 0.5, 0.5];
        assert!(config.validate().is_err());
    }

    #[test]
    fn confidence_out_of_range_is_rejected() {
        let mut config = CarbonConfig::default();
        config.forecast.fallback_confidence = 1.5;
        assert!(config.validate().is_err());
    }
}
