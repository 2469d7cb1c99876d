use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "lakeview",
    version,
    about = "A terminal cockpit for lakehouse workspaces."
)]
pub struct CliArgs {
    /// tracing filter (for example: info,debug,trace)
    #[arg(long, default_value = "info")]
    pub log_filter: String,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Register a workspace profile and mark it active
    Login,
    /// Mark an existing workspace profile active
    Use { name: String },
    /// Delete a workspace profile
    Delete { name: String },
}
