use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;
use zbxapi::config::Config;
use zbxapi::telemetry::init_tracing;
use zbxapi::zbx_client::ZbxClient;

use super::cli::{Cli, Command, GroupCommand, HostCommand, ScreenCommand, TemplateCommand};

const DEFAULT_CONFIG: &str = "zbxapi.toml";

pub async fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.log_filter.as_deref(), cli.json_logs)?;

    let config_path = cli.config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let mut config = Config::from_env_and_file(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;
    if cli.insecure {
        config.http.insecure_http = true;
    }

    let client = ZbxClient::from_config(&config)?;
    info!(endpoint = %client.endpoint(), user = %config.user, "zabbix client ready");

    match cli.command {
        Command::Login => {
            client.login().await?;
            println!("authenticated as {}", config.user);
        }
        Command::Version => println!("{}", client.api_version().await?),
        Command::Call { method, params } => {
            let params: Value = serde_json::from_str(&params)
                .with_context(|| format!("parsing parameters for {method}"))?;
            let result = client.call(&method, params).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Group(cmd) => match cmd {
            GroupCommand::Id { name } => print_optional(client.get_group_id(&name).await?),
            GroupCommand::Add { name } => print_optional(client.add_group(&name).await?),
            GroupCommand::AddHost(args) => {
                println!(
                    "{}",
                    client.add_host_to_group(&args.host_id, &args.group_id).await?
                );
            }
        },
        Command::Host(cmd) => match cmd {
            HostCommand::Id { name } => print_optional(client.get_host_id(&name).await?),
            HostCommand::Delete { host_id } => println!("{}", client.delete_host(&host_id).await?),
        },
        Command::Template(TemplateCommand::Id { name }) => {
            print_optional(client.get_template_id(&name).await?);
        }
        Command::Screen(cmd) => match cmd {
            ScreenCommand::Id { name } => print_optional(client.get_screen_id(&name).await?),
            ScreenCommand::Graphs { screen_id } => {
                match client.get_screen_graph_ids(&screen_id).await? {
                    Some(ids) => ids.iter().for_each(|id| println!("{id}")),
                    None => anyhow::bail!("screen {screen_id} not found"),
                }
            }
        },
    }

    Ok(())
}

fn print_optional(value: Option<String>) {
    match value {
        Some(value) => println!("{value}"),
        None => println!("-"),
    }
}
