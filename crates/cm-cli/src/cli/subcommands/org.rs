use clap::Subcommand;

/// Organization profile commands.
#[derive(Clone, Debug, Subcommand)]
pub enum OrgCommands {
    /// Register an organization.
    Register {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        sector: Option<String>,
        #[arg(long)]
        employees: Option<i64>,
        /// Annual revenue, in the same currency used for intensity reporting.
        #[arg(long)]
        revenue: Option<f64>,
    },
    /// Update the organization selected with --org.
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        sector: Option<String>,
        #[arg(long)]
        employees: Option<i64>,
        #[arg(long)]
        revenue: Option<f64>,
    },
    /// Show the organization selected with --org.
    Show,
}
