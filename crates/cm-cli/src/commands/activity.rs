use chrono::Utc;
use cm_core::entities::ActivityPayload;
use cm_core::enums::{Category, Scope};
use cm_db::repos::activity::ActivityFilter;
use cm_engine::{Calculator, LogActivity};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{ActivitiesArgs, CalcArgs, LogArgs, PayloadArgs};
use crate::commands::shared::limit::effective_limit;
use crate::commands::shared::parse::parse_value;
use crate::context::AppContext;
use crate::output::output;

fn to_payload(args: &PayloadArgs) -> ActivityPayload {
    ActivityPayload {
        kind: args.kind.trim().to_string(),
        quantity: args.quantity,
        unit: args.unit.clone(),
        mode: args.mode.clone(),
        weight: args.weight,
    }
}

/// Handle `cmtr calc`.
pub fn handle_calc(args: &CalcArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let calculation = Calculator::default().compute(&to_payload(&args.payload))?;
    output(&calculation, flags.format)
}

/// Handle `cmtr log`.
pub async fn handle_log(args: &LogArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let org_id = flags.require_org()?;
    let activity = LogActivity {
        activity_date: args.date.unwrap_or_else(|| Utc::now().date_naive()),
        scope: parse_value::<Scope>(&args.scope, "scope")?,
        category: parse_value::<Category>(&args.category, "category")?,
        payload: to_payload(&args.payload),
    };

    let observation = ctx.engine.log_activity(org_id, &activity).await?;
    output(&observation, flags.format)
}

/// Handle `cmtr activities`.
pub async fn handle_list(
    args: &ActivitiesArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let org_id = flags.require_org()?;
    let filter = ActivityFilter {
        scope: args
            .scope
            .as_deref()
            .map(|raw| parse_value::<Scope>(raw, "scope"))
            .transpose()?,
        category: args
            .category
            .as_deref()
            .map(|raw| parse_value::<Category>(raw, "category"))
            .transpose()?,
        from: args.from,
        to: args.to,
        is_prediction: args.predicted,
        limit: Some(effective_limit(
            flags.limit,
            ctx.engine.config().general.default_limit,
        )),
    };

    let observations = ctx.engine.list_activities(org_id, &filter).await?;
    output(&observations, flags.format)
}
