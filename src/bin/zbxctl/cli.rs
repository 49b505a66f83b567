use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Command-line client for the Zabbix JSON-RPC API", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Allow plain HTTP endpoints.
    #[arg(long, action = ArgAction::SetTrue)]
    pub insecure: bool,

    /// Emit logs as JSON (requires `--features json-logs`).
    #[arg(long, action = ArgAction::SetTrue)]
    pub json_logs: bool,

    /// Explicit log filter (e.g. "zbxapi=debug").
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Authenticate and report whether a session token was issued.
    Login,
    /// Print the server API version.
    Version,
    /// Issue a raw RPC call and print its result as JSON.
    Call {
        method: String,
        /// Parameters as a JSON document.
        #[arg(default_value = "{}")]
        params: String,
    },
    #[command(subcommand)]
    Group(GroupCommand),
    #[command(subcommand)]
    Host(HostCommand),
    #[command(subcommand)]
    Template(TemplateCommand),
    #[command(subcommand)]
    Screen(ScreenCommand),
}

#[derive(Subcommand, Debug)]
pub enum GroupCommand {
    /// Print the id of a host group.
    Id { name: String },
    /// Create a host group.
    Add { name: String },
    /// Add a host to a host group.
    AddHost(HostGroupArgs),
}

#[derive(Args, Debug)]
pub struct HostGroupArgs {
    #[arg(long)]
    pub host_id: String,
    #[arg(long)]
    pub group_id: String,
}

#[derive(Subcommand, Debug)]
pub enum HostCommand {
    /// Print the id of a host by technical name.
    Id { name: String },
    /// Delete a host by id.
    Delete { host_id: String },
}

#[derive(Subcommand, Debug)]
pub enum TemplateCommand {
    /// Print the id of a template.
    Id { name: String },
}

#[derive(Subcommand, Debug)]
pub enum ScreenCommand {
    /// Print the id of a screen.
    Id { name: String },
    /// List the graph ids placed on a screen.
    Graphs { screen_id: String },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
