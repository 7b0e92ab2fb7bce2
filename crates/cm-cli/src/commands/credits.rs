use cm_core::enums::CreditSource;
use cm_engine::EarnCredits;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::CreditCommands;
use crate::commands::shared::parse::parse_value;
use crate::context::AppContext;
use crate::output::output;

/// Handle `cmtr credits`.
pub async fn handle(
    action: &CreditCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let org_id = flags.require_org()?;
    match action {
        CreditCommands::Earn {
            credits,
            source,
            unverified,
            description,
        } => {
            let earn = EarnCredits {
                credits: *credits,
                source: parse_value::<CreditSource>(source, "source")?,
                verified: !unverified,
                description: description.clone(),
            };
            let transaction = ctx.engine.earn_credits(org_id, &earn).await?;
            output(&transaction, flags.format)
        }
        CreditCommands::Purchase { credits, price } => {
            let transaction = ctx.engine.purchase_credits(org_id, *credits, *price).await?;
            output(&transaction, flags.format)
        }
        CreditCommands::Use { credits, reason } => {
            let transaction = ctx
                .engine
                .use_credits(org_id, *credits, reason.as_deref())
                .await?;
            output(&transaction, flags.format)
        }
        CreditCommands::Balance => output(&ctx.engine.credit_balance(org_id).await?, flags.format),
        CreditCommands::Summary => output(&ctx.engine.credit_summary(org_id).await?, flags.format),
    }
}
