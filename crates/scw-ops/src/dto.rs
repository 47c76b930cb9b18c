use std::fmt;

use scw_registry::{Registry, ReservedIp, Server, Task, Volume};
use serde::Serialize;

const RULE: &str = "-------------------------------------------------------";

// ── Rows ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ServerRow {
    pub id: String,
    pub name: String,
    pub state: String,
    pub state_detail: String,
    pub address: Option<String>,
    pub ip_id: Option<String>,
    pub private_ip: Option<String>,
    pub allowed_actions: Vec<String>,
}

impl ServerRow {
    pub fn new<A: scw_registry::ComputeApi>(server: &Server, registry: &Registry<A>) -> Self {
        Self {
            id: server.id.clone(),
            name: server.name.clone(),
            state: server.state.to_string(),
            state_detail: server.state_detail.clone(),
            address: server.address().map(str::to_string),
            ip_id: server.resolve_attached_ip(registry).map(|ip| ip.id.clone()),
            private_ip: server.private_ip.clone(),
            allowed_actions: server.allowed_actions.clone(),
        }
    }
}

impl fmt::Display for ServerRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} | {} | ID: {}", self.name, self.state, self.id)?;
        writeln!(
            f,
            "Address: {} | IP ID: {}",
            or_dash(&self.address),
            or_dash(&self.ip_id)
        )?;
        if !self.allowed_actions.is_empty() {
            writeln!(f, "actions: {}", self.allowed_actions.join(", "))?;
        }
        write!(f, "{RULE}")
    }
}

#[derive(Debug, Serialize)]
pub struct IpRow {
    pub id: String,
    pub address: String,
    pub server_id: Option<String>,
    pub server_name: Option<String>,
}

impl IpRow {
    pub fn new<A: scw_registry::ComputeApi>(ip: &ReservedIp, registry: &Registry<A>) -> Self {
        Self {
            id: ip.id.clone(),
            address: ip.address.clone(),
            server_id: ip.server_id.clone(),
            server_name: ip
                .resolve_attached_server(registry)
                .map(|server| server.name.clone()),
        }
    }
}

impl fmt::Display for IpRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} | ID: {}", self.address, self.id)?;
        writeln!(f, "Attached to: {}", or_dash(&self.server_name))?;
        write!(f, "{RULE}")
    }
}

/// Confirmation for an IP the provider has released.
#[derive(Debug, Serialize)]
pub struct ReleasedIpRow {
    pub id: String,
    pub address: String,
    pub released: bool,
}

impl ReleasedIpRow {
    pub fn new(ip: &ReservedIp) -> Self {
        Self {
            id: ip.id.clone(),
            address: ip.address.clone(),
            released: true,
        }
    }
}

impl fmt::Display for ReleasedIpRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "released {} (ID: {})", self.address, self.id)
    }
}

#[derive(Debug, Serialize)]
pub struct VolumeRow {
    pub id: String,
    pub name: String,
    pub volume_type: String,
    pub size: Option<u64>,
    pub server_name: Option<String>,
}

impl VolumeRow {
    pub fn new<A: scw_registry::ComputeApi>(volume: &Volume, registry: &Registry<A>) -> Self {
        Self {
            id: volume.id.clone(),
            name: volume.name.clone(),
            volume_type: volume.volume_type.clone(),
            size: volume.size,
            server_name: volume
                .resolve_attached_server(registry)
                .map(|server| server.name.clone()),
        }
    }
}

impl fmt::Display for VolumeRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} | {} | ID: {}", self.name, self.volume_type, self.id)?;
        writeln!(f, "Attached to: {}", or_dash(&self.server_name))?;
        write!(f, "{RULE}")
    }
}

#[derive(Debug, Serialize)]
pub struct TaskRow {
    pub server: String,
    pub task_id: String,
    pub status: Option<String>,
}

impl TaskRow {
    pub fn new(server: &str, task: Task) -> Self {
        Self {
            server: server.to_string(),
            task_id: task.id,
            status: task.status,
        }
    }
}

impl fmt::Display for TaskRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: task {} ({})",
            self.server,
            self.task_id,
            self.status.as_deref().unwrap_or("accepted")
        )
    }
}

fn or_dash(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}
