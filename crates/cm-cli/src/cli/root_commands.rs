use chrono::NaiveDate;
use clap::{Args, Subcommand};

use crate::cli::subcommands::{CreditCommands, GapCommands, OrgCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Organization profiles.
    Org {
        #[command(subcommand)]
        action: OrgCommands,
    },
    /// List the emission factor table.
    Factors,
    /// Price one activity without recording it.
    Calc(CalcArgs),
    /// Record a real activity for --org.
    Log(LogArgs),
    /// List recorded observations for --org.
    Activities(ActivitiesArgs),
    /// Totals, intensities, trend, credits and compliance for --org.
    Dashboard(WindowArgs),
    /// Grouped sums by scope, category or month.
    Rollup(RollupArgs),
    /// Sector leaderboard.
    Leaderboard(LeaderboardArgs),
    /// Comparison against sector peers.
    Peers(SectorArgs),
    /// Absolute benchmark with best practices.
    Benchmark(SectorArgs),
    /// Percentile, rank and badge.
    Percentile(SectorArgs),
    /// Missing dates and forecast filling.
    Gaps {
        #[command(subcommand)]
        action: GapCommands,
    },
    /// Carbon credit ledger.
    Credits {
        #[command(subcommand)]
        action: CreditCommands,
    },
}

/// Activity description shared by `calc` and `log`.
#[derive(Clone, Debug, Args)]
pub struct PayloadArgs {
    /// Factor key, e.g. Diesel, Electricity, Transport, Hotel Night.
    #[arg(long)]
    pub kind: String,
    #[arg(long)]
    pub quantity: f64,
    #[arg(long, default_value = "unit")]
    pub unit: String,
    /// Transport mode (Air, Rail, Road, Ship, Car) or electricity source.
    #[arg(long)]
    pub mode: Option<String>,
    /// Cargo weight in tonnes for freight.
    #[arg(long)]
    pub weight: Option<f64>,
}

#[derive(Clone, Debug, Args)]
pub struct CalcArgs {
    #[command(flatten)]
    pub payload: PayloadArgs,
}

#[derive(Clone, Debug, Args)]
pub struct LogArgs {
    /// Activity date (YYYY-MM-DD), defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// 1, 2 or 3.
    #[arg(long)]
    pub scope: String,
    /// Category key or label, e.g. fuel_combustion or "Business Travel".
    #[arg(long)]
    pub category: String,
    #[command(flatten)]
    pub payload: PayloadArgs,
}

#[derive(Clone, Debug, Args)]
pub struct ActivitiesArgs {
    #[arg(long)]
    pub scope: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub from: Option<NaiveDate>,
    #[arg(long)]
    pub to: Option<NaiveDate>,
    /// Only predicted (true) or only real (false) observations.
    #[arg(long)]
    pub predicted: Option<bool>,
}

#[derive(Clone, Debug, Default, Args)]
pub struct WindowArgs {
    #[arg(long)]
    pub from: Option<NaiveDate>,
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

#[derive(Clone, Debug, Args)]
pub struct RollupArgs {
    /// scope, category or month.
    #[arg(long, default_value = "scope")]
    pub by: String,
    #[command(flatten)]
    pub window: WindowArgs,
}

#[derive(Clone, Debug, Args)]
pub struct SectorArgs {
    /// Sector to compare against; defaults to the profile sector.
    #[arg(long)]
    pub sector: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct LeaderboardArgs {
    #[command(flatten)]
    pub sector: SectorArgs,
    /// intensity or total.
    #[arg(long, default_value = "intensity")]
    pub metric: String,
}
