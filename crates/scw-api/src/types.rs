use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Servers ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub id: String,
    pub name: String,
    pub state: ServerState,
    #[serde(default)]
    pub state_detail: String,
    #[serde(default)]
    pub public_ip: Option<ServerPublicIp>,
    #[serde(default)]
    pub private_ip: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub commercial_type: Option<String>,
    #[serde(default)]
    pub allowed_actions: Vec<String>,
    #[serde(default)]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modification_date: Option<DateTime<Utc>>,
}

/// Public address block embedded in a server representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerPublicIp {
    pub id: String,
    pub address: String,
    #[serde(default)]
    pub dynamic: bool,
}

/// Provider-reported power/lifecycle state.
///
/// The provider owns this state machine; values outside the well-known set
/// are kept verbatim in `Other` rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServerState {
    Running,
    Stopped,
    Starting,
    Stopping,
    Other(String),
}

impl ServerState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Stopping => "stopping",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for ServerState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "running" => Self::Running,
            "stopped" => Self::Stopped,
            "starting" => Self::Starting,
            "stopping" => Self::Stopping,
            _ => Self::Other(s),
        }
    }
}

impl From<ServerState> for String {
    fn from(state: ServerState) -> Self {
        match state {
            ServerState::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListServersResponse {
    pub servers: Vec<Server>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerResponse {
    pub server: Server,
}

// ── Actions ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerAction {
    PowerOn,
    PowerOff,
    Reboot,
    Terminate,
}

impl ServerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PowerOn => "poweron",
            Self::PowerOff => "poweroff",
            Self::Reboot => "reboot",
            Self::Terminate => "terminate",
        }
    }
}

impl fmt::Display for ServerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerActionRequest {
    pub action: ServerAction,
}

/// Acknowledgement for an accepted server action. The transition itself
/// runs asynchronously on the provider side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub href_from: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskResponse {
    pub task: Task,
}

// ── IPs ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ip {
    pub id: String,
    pub address: String,
    #[serde(default)]
    pub server: Option<ServerRef>,
    #[serde(default)]
    pub reverse: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
}

/// Back-reference to a server from an IP or volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateIpRequest {
    pub organization: String,
}

/// Body for `PATCH /ips/{id}`. `server: None` serializes as `null`,
/// which detaches the address.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateIpRequest {
    pub server: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListIpsResponse {
    pub ips: Vec<Ip>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IpResponse {
    pub ip: Ip,
}

// ── Volumes ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Volume {
    pub id: String,
    pub name: String,
    pub volume_type: String,
    #[serde(default)]
    pub server: Option<ServerRef>,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListVolumesResponse {
    pub volumes: Vec<Volume>,
}
