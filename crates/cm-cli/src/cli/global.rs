use clap::ValueEnum;

/// Shared output mode across all commands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Raw,
}

/// Global flags available before or after subcommands.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub format: OutputFormat,
    pub limit: Option<u32>,
    pub quiet: bool,
    pub verbose: bool,
    pub org: Option<String>,
    pub db: Option<String>,
}

impl GlobalFlags {
    /// The `--org` value, required by organization-scoped commands.
    pub fn require_org(&self) -> anyhow::Result<&str> {
        self.org
            .as_deref()
            .map(str::trim)
            .filter(|org| !org.is_empty())
            .ok_or_else(|| anyhow::anyhow!("this command needs --org <ORG_ID>"))
    }
}
