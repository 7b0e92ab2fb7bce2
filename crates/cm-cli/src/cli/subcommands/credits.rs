use clap::Subcommand;

/// Carbon credit ledger commands.
#[derive(Clone, Debug, Subcommand)]
pub enum CreditCommands {
    /// Record credits earned from a verified reduction project.
    Earn {
        #[arg(long)]
        credits: f64,
        /// solar_power, wind_power, energy_efficiency_project, tree_plantation, voluntary_reduction
        #[arg(long)]
        source: String,
        /// Record the reduction as not yet verified (rejected by the ledger).
        #[arg(long)]
        unverified: bool,
        #[arg(long)]
        description: Option<String>,
    },
    /// Buy credits on the market.
    Purchase {
        #[arg(long)]
        credits: f64,
        /// Price per credit; defaults to the configured price.
        #[arg(long)]
        price: Option<f64>,
    },
    /// Retire credits against emissions.
    Use {
        #[arg(long)]
        credits: f64,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Current balance.
    Balance,
    /// Totals and recent transactions.
    Summary,
}
