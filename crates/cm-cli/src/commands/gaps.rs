use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::GapCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `cmtr gaps`.
pub async fn handle(action: &GapCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let org_id = flags.require_org()?;
    match action {
        GapCommands::Missing => {
            let report = ctx.engine.get_missing_dates(org_id).await?;
            output(&report, flags.format)
        }
        GapCommands::Fill => match ctx.engine.fill_missing_dates(org_id).await {
            Ok(report) => output(&report, flags.format),
            // Too little history is an answer, not a failure.
            Err(error) if error.is_informational() => output(
                &json!({
                    "org_id": org_id,
                    "filled": 0,
                    "reason": error.to_string(),
                }),
                flags.format,
            ),
            Err(error) => Err(error.into()),
        },
    }
}
