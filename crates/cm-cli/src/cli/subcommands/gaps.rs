use clap::Subcommand;

/// Missing-date scanning and forecast filling.
#[derive(Clone, Debug, Subcommand)]
pub enum GapCommands {
    /// List dates without real observations in the forecast window.
    Missing,
    /// Write predicted observations for the most recent missing dates.
    Fill,
}
