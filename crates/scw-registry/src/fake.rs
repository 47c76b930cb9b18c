//! In-memory stand-in for the compute API, used by unit tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use scw_api::{Ip, Server, ServerAction, ServerPublicIp, ServerRef, ServerState, StatusCode, Task, Volume};

use crate::api::ComputeApi;

pub(crate) fn server(id: &str, name: &str, public_ip: Option<(&str, &str)>) -> Server {
    Server {
        id: id.into(),
        name: name.into(),
        state: ServerState::Stopped,
        state_detail: String::new(),
        public_ip: public_ip.map(|(ip_id, address)| ServerPublicIp {
            id: ip_id.into(),
            address: address.into(),
            dynamic: false,
        }),
        private_ip: None,
        hostname: None,
        commercial_type: None,
        allowed_actions: Vec::new(),
        creation_date: None,
        modification_date: None,
    }
}

pub(crate) fn ip(id: &str, address: &str, server_id: Option<&str>) -> Ip {
    Ip {
        id: id.into(),
        address: address.into(),
        server: server_id.map(server_ref),
        reverse: None,
        organization: None,
    }
}

pub(crate) fn volume(id: &str, name: &str, server_id: Option<&str>) -> Volume {
    Volume {
        id: id.into(),
        name: name.into(),
        volume_type: "l_ssd".into(),
        server: server_id.map(server_ref),
        size: None,
    }
}

fn server_ref(id: &str) -> ServerRef {
    ServerRef {
        id: id.into(),
        name: None,
    }
}

#[derive(Default)]
struct State {
    servers: Vec<Server>,
    ips: Vec<Ip>,
    volumes: Vec<Volume>,
    failing: HashSet<&'static str>,
    calls: Vec<String>,
    created: u32,
}

/// Remote state plus a call log. Operations named in `failing` return a
/// 500 without touching state.
#[derive(Default)]
pub(crate) struct FakeApi {
    state: Mutex<State>,
}

impl FakeApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_servers(self, servers: impl IntoIterator<Item = Server>) -> Self {
        self.state.lock().unwrap().servers = servers.into_iter().collect();
        self
    }

    pub(crate) fn with_ips(self, ips: impl IntoIterator<Item = Ip>) -> Self {
        self.state.lock().unwrap().ips = ips.into_iter().collect();
        self
    }

    pub(crate) fn with_volumes(self, volumes: impl IntoIterator<Item = Volume>) -> Self {
        self.state.lock().unwrap().volumes = volumes.into_iter().collect();
        self
    }

    pub(crate) fn fail(&self, operation: &'static str) {
        self.state.lock().unwrap().failing.insert(operation);
    }

    pub(crate) fn recover(&self, operation: &'static str) {
        self.state.lock().unwrap().failing.remove(operation);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Mutate the remote side directly, as another client would.
    pub(crate) fn edit_server(&self, id: &str, edit: impl FnOnce(&mut Server)) {
        let mut state = self.state.lock().unwrap();
        if let Some(server) = state.servers.iter_mut().find(|s| s.id == id) {
            edit(server);
        }
    }

    pub(crate) fn push_server(&self, server: Server) {
        self.state.lock().unwrap().servers.push(server);
    }

    fn begin(&self, operation: &'static str, call: String) -> scw_api::Result<std::sync::MutexGuard<'_, State>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.failing.contains(operation) {
            return Err(scw_api::Error::Api {
                endpoint: operation,
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "injected failure".into(),
            });
        }
        Ok(state)
    }

    fn not_found(endpoint: &'static str) -> scw_api::Error {
        scw_api::Error::Api {
            endpoint,
            status: StatusCode::NOT_FOUND,
            body: "resource not found".into(),
        }
    }
}

#[async_trait]
impl ComputeApi for FakeApi {
    async fn list_servers(&self) -> scw_api::Result<Vec<Server>> {
        let state = self.begin("list servers", "GET /servers".into())?;
        Ok(state.servers.clone())
    }

    async fn get_server(&self, server_id: &str) -> scw_api::Result<Server> {
        let state = self.begin("get server", format!("GET /servers/{server_id}"))?;
        state
            .servers
            .iter()
            .find(|s| s.id == server_id)
            .cloned()
            .ok_or_else(|| Self::not_found("get server"))
    }

    async fn server_action(&self, server_id: &str, action: ServerAction) -> scw_api::Result<Task> {
        let state = self.begin("server action", format!("POST /servers/{server_id}/action {action}"))?;
        if !state.servers.iter().any(|s| s.id == server_id) {
            return Err(Self::not_found("server action"));
        }
        Ok(Task {
            id: format!("task-{action}-{server_id}"),
            description: Some(format!("server_{action}")),
            status: Some("pending".into()),
            href_from: None,
        })
    }

    async fn list_ips(&self) -> scw_api::Result<Vec<Ip>> {
        let state = self.begin("list ips", "GET /ips".into())?;
        Ok(state.ips.clone())
    }

    async fn create_ip(&self, organization: &str) -> scw_api::Result<Ip> {
        let mut state = self.begin("create ip", format!("POST /ips {organization}"))?;
        state.created += 1;
        let n = state.created;
        let created = ip(&format!("new-{n}"), &format!("10.1.0.{n}"), None);
        state.ips.push(created.clone());
        Ok(created)
    }

    async fn update_ip(&self, ip_id: &str, server_id: Option<&str>) -> scw_api::Result<Ip> {
        let mut state = self.begin(
            "update ip",
            format!("PATCH /ips/{ip_id} {}", server_id.unwrap_or("null")),
        )?;
        let ip = state
            .ips
            .iter_mut()
            .find(|ip| ip.id == ip_id)
            .ok_or_else(|| Self::not_found("update ip"))?;
        ip.server = server_id.map(server_ref);
        Ok(ip.clone())
    }

    async fn delete_ip(&self, ip_id: &str) -> scw_api::Result<()> {
        let mut state = self.begin("delete ip", format!("DELETE /ips/{ip_id}"))?;
        let before = state.ips.len();
        state.ips.retain(|ip| ip.id != ip_id);
        if state.ips.len() == before {
            return Err(Self::not_found("delete ip"));
        }
        Ok(())
    }

    async fn list_volumes(&self) -> scw_api::Result<Vec<Volume>> {
        let state = self.begin("list volumes", "GET /volumes".into())?;
        Ok(state.volumes.clone())
    }
}
