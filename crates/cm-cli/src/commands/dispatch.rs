use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Org { action } => commands::org::handle(&action, ctx, flags).await,
        Commands::Log(args) => commands::activity::handle_log(&args, ctx, flags).await,
        Commands::Activities(args) => commands::activity::handle_list(&args, ctx, flags).await,
        Commands::Dashboard(args) => commands::analytics::handle_dashboard(&args, ctx, flags).await,
        Commands::Rollup(args) => commands::analytics::handle_rollup(&args, ctx, flags).await,
        Commands::Leaderboard(args) => {
            commands::analytics::handle_leaderboard(&args, ctx, flags).await
        }
        Commands::Peers(args) => commands::analytics::handle_peers(&args, ctx, flags).await,
        Commands::Benchmark(args) => commands::analytics::handle_benchmark(&args, ctx, flags).await,
        Commands::Percentile(args) => {
            commands::analytics::handle_percentile(&args, ctx, flags).await
        }
        Commands::Gaps { action } => commands::gaps::handle(&action, ctx, flags).await,
        Commands::Credits { action } => commands::credits::handle(&action, ctx, flags).await,
        Commands::Factors | Commands::Calc(_) => {
            unreachable!("factors/calc are pre-dispatched in main")
        }
    }
}
