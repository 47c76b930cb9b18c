use std::fmt::Display;

use anyhow::Context;
use clap::Subcommand;
use scw_registry::{ComputeApi, Registry};
use serde::Serialize;
use tracing::warn;

use crate::dto::{IpRow, ReleasedIpRow, ServerRow, TaskRow, VolumeRow};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List servers with their state and attached IP
    Servers,
    /// List reserved IPs and the server each is attached to
    Ips,
    /// List volumes and the server each is attached to
    Volumes,
    /// Reserve a new IP (billed until deleted)
    IpCreate,
    /// Release a reserved IP, by id or address
    IpDelete { ip: String },
    /// Request power on for a server, by name or id
    PowerOn { server: String },
    /// Request power off for a server, by name or id
    PowerOff { server: String },
    /// Attach a reserved IP (id or address) to a server
    AttachIp { server: String, ip: String },
    /// Detach the reserved IP currently attached to a server
    DetachIp { server: String },
    /// Re-fetch a server's state from the provider
    State { server: String },
}

#[derive(Debug, Clone, Copy)]
pub enum Output {
    Text,
    Json,
}

impl Output {
    fn emit<T: Serialize + Display>(self, rows: &[T]) -> anyhow::Result<()> {
        match self {
            Output::Json => println!("{}", serde_json::to_string_pretty(rows)?),
            Output::Text => {
                for row in rows {
                    println!("{row}");
                }
            }
        }
        Ok(())
    }
}

pub async fn run<A: ComputeApi>(
    registry: &mut Registry<A>,
    command: Command,
    output: Output,
) -> anyhow::Result<()> {
    match command {
        Command::Servers => {
            let registry = &*registry;
            let rows: Vec<_> = registry
                .servers()
                .iter()
                .map(|server| ServerRow::new(server, registry))
                .collect();
            output.emit(&rows)
        }
        Command::Ips => {
            let registry = &*registry;
            let rows: Vec<_> = registry
                .ips()
                .iter()
                .map(|ip| IpRow::new(ip, registry))
                .collect();
            output.emit(&rows)
        }
        Command::Volumes => {
            let registry = &*registry;
            let rows: Vec<_> = registry
                .volumes()
                .iter()
                .map(|volume| VolumeRow::new(volume, registry))
                .collect();
            output.emit(&rows)
        }
        Command::IpCreate => {
            let ip = registry.create_reserved_ip().await?.clone();
            output.emit(&[IpRow::new(&ip, registry)])
        }
        Command::IpDelete { ip } => {
            let ip_id = resolve_ip(registry, &ip)?;
            let row = ReleasedIpRow::new(registry.find_ip_by_id(&ip_id)?);
            registry
                .delete_reserved_ip(&ip_id)
                .await
                .with_context(|| format!("deleting ip {ip}"))?;
            output.emit(&[row])
        }
        Command::PowerOn { server } => {
            let server_id = resolve_server(registry, &server)?;
            let task = registry.power_on(&server_id).await?;
            output.emit(&[TaskRow::new(&server, task)])
        }
        Command::PowerOff { server } => {
            let server_id = resolve_server(registry, &server)?;
            let task = registry.power_off(&server_id).await?;
            output.emit(&[TaskRow::new(&server, task)])
        }
        Command::AttachIp { server, ip } => {
            let server_id = resolve_server(registry, &server)?;
            let ip_id = resolve_ip(registry, &ip)?;
            registry
                .attach_ip(&server_id, &ip_id)
                .await
                .with_context(|| format!("attaching {ip} to {server}"))?;
            let row = ServerRow::new(registry.find_server_by_id(&server_id)?, registry);
            output.emit(&[row])
        }
        Command::DetachIp { server } => {
            let server_id = resolve_server(registry, &server)?;
            registry
                .detach_ip(&server_id)
                .await
                .with_context(|| format!("detaching ip from {server}"))?;
            let row = ServerRow::new(registry.find_server_by_id(&server_id)?, registry);
            output.emit(&[row])
        }
        Command::State { server } => {
            let server_id = resolve_server(registry, &server)?;
            registry.update_state(&server_id).await?;
            let row = ServerRow::new(registry.find_server_by_id(&server_id)?, registry);
            output.emit(&[row])
        }
    }
}

/// Accept a server name or id. Names win; duplicate names are reported.
fn resolve_server<A: ComputeApi>(registry: &Registry<A>, key: &str) -> anyhow::Result<String> {
    let named = registry.find_servers_by_name(key);
    if named.len() > 1 {
        warn!(name = key, count = named.len(), "several servers share this name, using the first");
    }
    if let Some(server) = named.first() {
        return Ok(server.id.clone());
    }
    Ok(registry.find_server_by_id(key)?.id.clone())
}

/// Accept an IP id or address.
fn resolve_ip<A: ComputeApi>(registry: &Registry<A>, key: &str) -> anyhow::Result<String> {
    let ip = registry
        .find_ip_by_id(key)
        .or_else(|_| registry.find_ip_by_address(key))?;
    Ok(ip.id.clone())
}
