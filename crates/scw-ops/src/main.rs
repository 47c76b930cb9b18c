mod commands;
mod config;
mod dto;

use std::path::PathBuf;

use clap::Parser;
use scw_registry::Registry;
use tracing_subscriber::EnvFilter;

use crate::commands::{Command, Output};
use crate::config::CredentialArgs;

/// Inspect and manage Scaleway compute resources.
#[derive(Debug, Parser)]
#[command(name = "scw-ops", version)]
struct Cli {
    /// File holding the API token (use together with --org-file)
    #[arg(long, global = true, env = "SCW_KEY_FILE")]
    key_file: Option<PathBuf>,

    /// File holding the organization id
    #[arg(long, global = true, env = "SCW_ORG_FILE")]
    org_file: Option<PathBuf>,

    /// Region, e.g. par1 or ams1
    #[arg(long, global = true)]
    region: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = config::resolve(&CredentialArgs {
        key_file: cli.key_file,
        org_file: cli.org_file,
        region: cli.region,
        timeout_secs: cli.timeout,
    })?;

    let mut registry = Registry::connect(&config).await?;
    tracing::debug!(
        servers = registry.servers().len(),
        ips = registry.ips().len(),
        volumes = registry.volumes().len(),
        "registry loaded"
    );

    let output = if cli.json { Output::Json } else { Output::Text };
    commands::run(&mut registry, cli.command, output).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_attach_with_global_flags() {
        let cli = Cli::try_parse_from(["scw-ops", "attach-ip", "web", "1.2.3.4", "--json", "--region", "ams1"])
            .unwrap();
        assert!(cli.json);
        assert_eq!(cli.region.as_deref(), Some("ams1"));
        assert!(matches!(
            cli.command,
            Command::AttachIp { ref server, ref ip } if server == "web" && ip == "1.2.3.4"
        ));
    }
}
