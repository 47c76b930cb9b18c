//! Registry-side entities and relationship resolution.
//!
//! Relationships are stored as identifier fields only and resolved against
//! the registry on demand. A reference that no longer matches anything in
//! the opposite collection resolves to `None`, same as no reference at all.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::api::ComputeApi;
use crate::collection::Resource;
use crate::registry::Registry;
use crate::{Result, ServerPublicIp, ServerState};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Server {
    pub id: String,
    pub name: String,
    pub state: ServerState,
    pub state_detail: String,
    pub public_ip: Option<ServerPublicIp>,
    pub private_ip: Option<String>,
    pub hostname: Option<String>,
    pub commercial_type: Option<String>,
    pub allowed_actions: Vec<String>,
    pub creation_date: Option<DateTime<Utc>>,
    pub modification_date: Option<DateTime<Utc>>,
}

impl Server {
    /// Public address as reported with the server, if any.
    pub fn address(&self) -> Option<&str> {
        self.public_ip.as_ref().map(|ip| ip.address.as_str())
    }

    pub fn attached_ip_id(&self) -> Option<&str> {
        self.public_ip.as_ref().map(|ip| ip.id.as_str())
    }

    /// The reserved IP attached to this server.
    ///
    /// `None` when no public IP is recorded, or when the recorded IP is not
    /// in the registry (dynamic address, or the IP list is stale).
    pub fn resolve_attached_ip<'r, A: ComputeApi>(
        &self,
        registry: &'r Registry<A>,
    ) -> Option<&'r ReservedIp> {
        let ip_id = self.attached_ip_id()?;
        let ip = registry.ips().get(ip_id);
        if ip.is_none() {
            debug!(server_id = %self.id, ip_id, "attached ip not in registry");
        }
        ip
    }

    /// Volumes whose attachment points at this server.
    pub fn volumes<'r, A: ComputeApi>(&self, registry: &'r Registry<A>) -> Vec<&'r Volume> {
        registry
            .volumes()
            .iter()
            .filter(|volume| volume.server_id.as_deref() == Some(self.id.as_str()))
            .collect()
    }

    pub fn is_running(&self) -> bool {
        self.state == ServerState::Running
    }
}

impl Resource for Server {
    fn id(&self) -> &str {
        &self.id
    }
}

impl From<scw_api::Server> for Server {
    fn from(server: scw_api::Server) -> Self {
        Self {
            id: server.id,
            name: server.name,
            state: server.state,
            state_detail: server.state_detail,
            public_ip: server.public_ip,
            private_ip: server.private_ip,
            hostname: server.hostname,
            commercial_type: server.commercial_type,
            allowed_actions: server.allowed_actions,
            creation_date: server.creation_date,
            modification_date: server.modification_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservedIp {
    pub id: String,
    pub address: String,
    pub server_id: Option<String>,
    pub reverse: Option<String>,
    pub organization: Option<String>,
}

impl ReservedIp {
    pub fn is_attached(&self) -> bool {
        self.server_id.is_some()
    }

    /// The server this IP is attached to, `None` if unattached or stale.
    pub fn resolve_attached_server<'r, A: ComputeApi>(
        &self,
        registry: &'r Registry<A>,
    ) -> Option<&'r Server> {
        resolve_server(self.server_id.as_deref(), registry)
    }

    /// Release this IP. Same contract as [`Registry::delete_reserved_ip`].
    pub async fn delete<A: ComputeApi>(self, registry: &mut Registry<A>) -> Result<()> {
        registry.delete_reserved_ip(&self.id).await
    }
}

impl Resource for ReservedIp {
    fn id(&self) -> &str {
        &self.id
    }
}

impl From<scw_api::Ip> for ReservedIp {
    fn from(ip: scw_api::Ip) -> Self {
        Self {
            id: ip.id,
            address: ip.address,
            server_id: ip.server.map(|server| server.id),
            reverse: ip.reverse,
            organization: ip.organization,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Volume {
    pub id: String,
    pub name: String,
    pub volume_type: String,
    pub server_id: Option<String>,
    pub size: Option<u64>,
}

impl Volume {
    pub fn resolve_attached_server<'r, A: ComputeApi>(
        &self,
        registry: &'r Registry<A>,
    ) -> Option<&'r Server> {
        resolve_server(self.server_id.as_deref(), registry)
    }
}

impl Resource for Volume {
    fn id(&self) -> &str {
        &self.id
    }
}

impl From<scw_api::Volume> for Volume {
    fn from(volume: scw_api::Volume) -> Self {
        Self {
            id: volume.id,
            name: volume.name,
            volume_type: volume.volume_type,
            server_id: volume.server.map(|server| server.id),
            size: volume.size,
        }
    }
}

fn resolve_server<'r, A: ComputeApi>(
    server_id: Option<&str>,
    registry: &'r Registry<A>,
) -> Option<&'r Server> {
    let server_id = server_id?;
    let server = registry.servers().get(server_id);
    if server.is_none() {
        debug!(server_id, "referenced server not in registry");
    }
    server
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{self, FakeApi};

    async fn registry() -> Registry<FakeApi> {
        let api = FakeApi::new()
            .with_servers([
                fake::server("s1", "web", Some(("i1", "1.2.3.4"))),
                fake::server("s2", "db", None),
                fake::server("s3", "cache", Some(("dyn", "9.9.9.9"))),
            ])
            .with_ips([
                fake::ip("i1", "1.2.3.4", Some("s1")),
                fake::ip("i2", "5.6.7.8", None),
                fake::ip("i3", "7.7.7.7", Some("gone")),
            ])
            .with_volumes([
                fake::volume("v1", "web-root", Some("s1")),
                fake::volume("v2", "web-data", Some("s1")),
                fake::volume("v3", "spare", None),
            ]);
        Registry::initialize(api, "org-1").await.unwrap()
    }

    #[tokio::test]
    async fn server_resolves_attached_ip_by_id() {
        let registry = registry().await;
        let server = registry.find_server_by_name("web").unwrap();
        let ip = server.resolve_attached_ip(&registry).unwrap();
        assert_eq!(ip.id, "i1");
        assert_eq!(ip.address, "1.2.3.4");
    }

    #[tokio::test]
    async fn no_public_ip_resolves_without_remote_call() {
        let registry = registry().await;
        let calls_before = registry.api().calls().len();

        let server = registry.find_server_by_id("s2").unwrap();
        assert!(server.resolve_attached_ip(&registry).is_none());

        let ip = registry.find_ip_by_id("i2").unwrap();
        assert!(ip.resolve_attached_server(&registry).is_none());

        let volume = registry.find_volume_by_id("v3").unwrap();
        assert!(volume.resolve_attached_server(&registry).is_none());

        assert_eq!(registry.api().calls().len(), calls_before);
    }

    #[tokio::test]
    async fn stale_references_resolve_to_none() {
        let registry = registry().await;

        // dynamic address, never listed under /ips
        let server = registry.find_server_by_id("s3").unwrap();
        assert!(server.resolve_attached_ip(&registry).is_none());

        let ip = registry.find_ip_by_id("i3").unwrap();
        assert!(ip.is_attached());
        assert!(ip.resolve_attached_server(&registry).is_none());
    }

    #[tokio::test]
    async fn ip_and_volume_resolve_server() {
        let registry = registry().await;

        let ip = registry.find_ip_by_address("1.2.3.4").unwrap();
        assert_eq!(ip.resolve_attached_server(&registry).unwrap().name, "web");

        let volume = registry.find_volume_by_name("web-data").unwrap();
        assert_eq!(volume.resolve_attached_server(&registry).unwrap().id, "s1");
    }

    #[tokio::test]
    async fn server_volumes_is_a_filter() {
        let registry = registry().await;

        let web = registry.find_server_by_id("s1").unwrap();
        let ids: Vec<_> = web.volumes(&registry).iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["v1", "v2"]);

        let db = registry.find_server_by_id("s2").unwrap();
        assert!(db.volumes(&registry).is_empty());
    }

    #[test]
    fn wire_ip_maps_server_reference_to_id() {
        let ip = ReservedIp::from(fake::ip("i1", "1.2.3.4", Some("s1")));
        assert_eq!(ip.server_id.as_deref(), Some("s1"));

        let ip = ReservedIp::from(fake::ip("i2", "5.6.7.8", None));
        assert!(!ip.is_attached());
    }
}
