//! # cm-engine
//!
//! Emissions benchmarking, ranking, forecasting and carbon credit engine.
//!
//! [`CarbonEngine`] is the single entry point the CLI talks to. It owns the
//! record store, the loaded configuration, the factor-table [`Calculator`]
//! and a [`cm_predictor::Predictor`]:
//!
//! - activities: organization profiles, pricing and logging real activities
//! - cohort / analytics: sector cohorts, leaderboard, peers, benchmark, percentile
//! - forecast: missing-date scanning and predicted gap filling
//! - ledger: append-only carbon credits
//! - dashboard: rollups and compliance
//!
//! Analytical reads degrade to synthetic sector data instead of failing, and
//! predictor failures degrade to the trailing mean.

pub mod activities;
pub mod analytics;
pub mod calculator;
pub mod cohort;
pub mod dashboard;
mod engine;
pub mod error;
pub mod factors;
pub mod forecast;
pub mod ledger;
pub mod ranking;
pub mod sectors;

pub use activities::{LogActivity, NewOrganization};
pub use calculator::Calculator;
pub use cohort::{Cohort, ResolvedSector};
pub use dashboard::DateWindow;
pub use engine::CarbonEngine;
pub use error::EngineError;
pub use factors::{EmissionFactor, FactorTable};
pub use ledger::EarnCredits;
