//! Gap scanning and forecast filling.
//!
//! A date is missing when it has no real observation. Filling asks the
//! predictor once per batch for a daily total, falls back to the trailing
//! mean when the predictor fails, and writes one predicted row per scope for
//! each missing date. Predicted rows never replace real ones and a second run
//! over the same window writes nothing.

use std::collections::HashSet;

use chrono::NaiveDate;
use cm_core::enums::{ForecastSource, Scope};
use cm_core::responses::{FillReport, FilledDate, MissingDatesReport};
use cm_db::repos::activity::NewPrediction;
use cm_predictor::{PredictionRequest, Predictor, PredictorError};

use crate::calculator::round4;
use crate::cohort::resolve_sector;
use crate::engine::{CarbonEngine, today, trailing_window};
use crate::error::EngineError;

/// A daily forecast ready to be split across scopes.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DailyForecast {
    value: f64,
    confidence: f64,
    split: [f64; 3],
    source: ForecastSource,
}

/// Result of scanning the window.
struct GapScan {
    window_start: NaiveDate,
    /// Daily real totals, oldest first.
    series: Vec<f64>,
    real_observations: u32,
    missing: Vec<NaiveDate>,
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// The most recent `cap` entries, oldest first.
fn most_recent(dates: &[NaiveDate], cap: u32) -> Vec<NaiveDate> {
    let cap = usize::try_from(cap).unwrap_or(usize::MAX);
    dates[dates.len().saturating_sub(cap)..].to_vec()
}

#[allow(clippy::cast_precision_loss)]
fn mean(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    series.iter().sum::<f64>() / series.len() as f64
}

impl<P: Predictor> CarbonEngine<P> {
    async fn scan_gaps(&self, org_id: &str, today: NaiveDate) -> Result<GapScan, EngineError> {
        let window_start = trailing_window(today, self.config().forecast.window_days);
        let daily = self
            .store()
            .daily_real_totals(org_id, window_start, today)
            .await?;

        let observed: HashSet<NaiveDate> = daily.iter().map(|(d, _)| *d).collect();
        let missing = window_start
            .iter_days()
            .take_while(|d| *d <= today)
            .filter(|d| !observed.contains(d))
            .collect();
        let real_observations = self
            .store()
            .total_emissions(org_id, window_start, today, false)
            .await?
            .observations;

        Ok(GapScan {
            window_start,
            series: daily.into_iter().map(|(_, v)| v).collect(),
            real_observations: u32::try_from(real_observations).unwrap_or(u32::MAX),
            missing,
        })
    }

    /// Dates in the trailing window without a real observation.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Database`] on store failure.
    pub async fn get_missing_dates(&self, org_id: &str) -> Result<MissingDatesReport, EngineError> {
        self.missing_dates_as_of(org_id, today()).await
    }

    /// [`Self::get_missing_dates`] with a fixed "today".
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Database`] on store failure.
    pub async fn missing_dates_as_of(
        &self,
        org_id: &str,
        today: NaiveDate,
    ) -> Result<MissingDatesReport, EngineError> {
        let cfg = &self.config().forecast;
        let scan = self.scan_gaps(org_id, today).await?;

        Ok(MissingDatesReport {
            org_id: org_id.to_string(),
            window_start: scan.window_start,
            window_end: today,
            missing_dates: most_recent(&scan.missing, cfg.display_cap),
            total_missing: to_u32(scan.missing.len()),
            real_observations: scan.real_observations,
            can_fill: scan.real_observations >= cfg.min_real_observations
                && !scan.missing.is_empty(),
        })
    }

    /// Write predicted observations for the most recent missing dates.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InsufficientHistory`] when the window holds fewer real
    ///   observations than `forecast.min_real_observations`. Nothing is
    ///   written.
    /// - [`EngineError::Database`] on store failure.
    pub async fn fill_missing_dates(&self, org_id: &str) -> Result<FillReport, EngineError> {
        self.fill_missing_dates_as_of(org_id, today()).await
    }

    /// [`Self::fill_missing_dates`] with a fixed "today".
    ///
    /// # Errors
    ///
    /// See [`Self::fill_missing_dates`].
    pub async fn fill_missing_dates_as_of(
        &self,
        org_id: &str,
        today: NaiveDate,
    ) -> Result<FillReport, EngineError> {
        let cfg = &self.config().forecast;
        let scan = self.scan_gaps(org_id, today).await?;
        if scan.real_observations < cfg.min_real_observations {
            return Err(EngineError::InsufficientHistory {
                real_observations: scan.real_observations,
                required: cfg.min_real_observations,
            });
        }

        let total_missing = to_u32(scan.missing.len());
        if scan.missing.is_empty() {
            tracing::debug!(org_id, "no missing dates to fill");
            return Ok(FillReport {
                org_id: org_id.to_string(),
                filled: 0,
                total_missing,
                source: None,
                confidence: None,
                predicted_daily_total: None,
                dates: Vec::new(),
            });
        }

        let batch = most_recent(&scan.missing, cfg.fill_cap);
        let forecast = self.forecast_daily(org_id, &scan.series).await?;

        let mut dates = Vec::with_capacity(batch.len());
        for date in batch {
            let mut rows_written = 0;
            for (scope, share) in Scope::ALL.into_iter().zip(forecast.split) {
                let written = self
                    .store()
                    .insert_prediction(&NewPrediction {
                        org_id,
                        activity_date: date,
                        scope,
                        emission_value: round4(forecast.value * share),
                        confidence: forecast.confidence,
                        source: forecast.source,
                    })
                    .await?;
                rows_written += u32::from(written);
            }
            dates.push(FilledDate {
                date,
                source: forecast.source,
                confidence: forecast.confidence,
                rows_written,
            });
        }

        let filled = to_u32(dates.iter().filter(|d| d.rows_written > 0).count());
        tracing::info!(
            org_id,
            filled,
            total_missing,
            source = %forecast.source,
            "filled missing dates"
        );

        Ok(FillReport {
            org_id: org_id.to_string(),
            filled,
            total_missing,
            source: Some(forecast.source),
            confidence: Some(forecast.confidence),
            predicted_daily_total: Some(round4(forecast.value)),
            dates,
        })
    }

    /// One predictor call bounded by the configured timeout, or the trailing mean.
    async fn forecast_daily(
        &self,
        org_id: &str,
        series: &[f64],
    ) -> Result<DailyForecast, EngineError> {
        let forecast_cfg = &self.config().forecast;
        let predictor_cfg = &self.config().predictor;

        let profile = self.store().find_organization(org_id).await?;
        let sector = resolve_sector(
            None,
            profile.as_ref(),
            &self.config().cohort.default_sector,
        );
        let request = PredictionRequest {
            sector: sector.name,
            trailing_series: series.to_vec(),
            employee_count: profile.as_ref().and_then(|p| p.employees()),
        };

        let outcome = tokio::time::timeout(
            predictor_cfg.timeout(),
            self.predictor().predict(&request),
        )
        .await
        .unwrap_or_else(|_| {
            Err(PredictorError::Unavailable(format!(
                "no answer within {}s",
                predictor_cfg.timeout_secs
            )))
        })
        .and_then(cm_predictor::Prediction::validate);

        let forecast = match outcome {
            Ok(prediction) => DailyForecast {
                value: prediction.predicted_value,
                confidence: prediction
                    .confidence
                    .filter(|c| c.is_finite())
                    .unwrap_or(predictor_cfg.default_confidence)
                    .clamp(0.0, 1.0),
                split: prediction
                    .scope_split
                    .and_then(|s| s.normalized())
                    .unwrap_or(forecast_cfg.scope_split),
                source: ForecastSource::Model,
            },
            Err(e) => {
                tracing::warn!(org_id, error = %e, "predictor failed, using trailing mean");
                DailyForecast {
                    value: mean(series),
                    confidence: forecast_cfg.fallback_confidence,
                    split: forecast_cfg.scope_split,
                    source: ForecastSource::Fallback,
                }
            }
        };
        Ok(forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    #[test]
    fn most_recent_keeps_tail_in_order() {
        let dates: Vec<_> = (1..=10).map(day).collect();
        assert_eq!(most_recent(&dates, 3), vec![day(8), day(9), day(10)]);
        assert_eq!(most_recent(&dates, 30).len(), 10);
        assert!(most_recent(&[], 5).is_empty());
    }

    #[test]
    fn mean_of_empty_is_zero() {
        assert!(mean(&[]).abs() < f64::EPSILON);
        assert!((mean(&[1.0, 2.0, 6.0]) - 3.0).abs() < 1e-12);
    }
}
