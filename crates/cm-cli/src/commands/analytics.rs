use cm_core::enums::{RankingMetric, RollupGroup};
use cm_engine::DateWindow;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{LeaderboardArgs, RollupArgs, SectorArgs, WindowArgs};
use crate::commands::shared::parse::{parse_enum, parse_value};
use crate::context::AppContext;
use crate::output::output;

const fn window(args: &WindowArgs) -> DateWindow {
    DateWindow {
        from: args.from,
        to: args.to,
    }
}

/// Handle `cmtr dashboard`.
pub async fn handle_dashboard(
    args: &WindowArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let dashboard = ctx
        .engine
        .get_dashboard_rollup(flags.require_org()?, window(args))
        .await?;
    output(&dashboard, flags.format)
}

/// Handle `cmtr rollup`.
pub async fn handle_rollup(
    args: &RollupArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let group_by = parse_enum::<RollupGroup>(&args.by, "group")?;
    let rows = ctx
        .engine
        .rollup(flags.require_org()?, group_by, window(&args.window))
        .await?;
    output(&rows, flags.format)
}

/// Handle `cmtr leaderboard`.
pub async fn handle_leaderboard(
    args: &LeaderboardArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let metric = parse_value::<RankingMetric>(&args.metric, "metric")?;
    let board = ctx
        .engine
        .get_leaderboard(flags.require_org()?, args.sector.sector.as_deref(), metric)
        .await?;
    output(&board, flags.format)
}

/// Handle `cmtr peers`.
pub async fn handle_peers(
    args: &SectorArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let comparison = ctx
        .engine
        .get_peer_comparison(flags.require_org()?, args.sector.as_deref())
        .await?;
    output(&comparison, flags.format)
}

/// Handle `cmtr benchmark`.
pub async fn handle_benchmark(
    args: &SectorArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let benchmark = ctx
        .engine
        .get_benchmark(flags.require_org()?, args.sector.as_deref())
        .await?;
    output(&benchmark, flags.format)
}

/// Handle `cmtr percentile`.
pub async fn handle_percentile(
    args: &SectorArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let percentile = ctx
        .engine
        .get_percentile(flags.require_org()?, args.sector.as_deref())
        .await?;
    output(&percentile, flags.format)
}
