use cm_db::repos::organization::OrganizationUpdate;
use cm_engine::NewOrganization;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::OrgCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `cmtr org`.
pub async fn handle(action: &OrgCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        OrgCommands::Register {
            id,
            name,
            sector,
            employees,
            revenue,
        } => {
            let profile = ctx
                .engine
                .register_organization(&NewOrganization {
                    id: id.clone(),
                    name: name.clone(),
                    sector: sector.clone(),
                    employee_count: *employees,
                    annual_revenue: *revenue,
                })
                .await?;
            output(&profile, flags.format)
        }
        OrgCommands::Update {
            name,
            sector,
            employees,
            revenue,
        } => {
            let org_id = flags.require_org()?;
            let update = OrganizationUpdate {
                name: name.clone(),
                sector: sector.clone(),
                employee_count: *employees,
                annual_revenue: *revenue,
            };
            if update.is_empty() {
                anyhow::bail!("nothing to update: pass --name, --sector, --employees or --revenue");
            }
            let profile = ctx.engine.update_organization(org_id, &update).await?;
            output(&profile, flags.format)
        }
        OrgCommands::Show => {
            let profile = ctx.engine.get_organization(flags.require_org()?).await?;
            output(&profile, flags.format)
        }
    }
}
