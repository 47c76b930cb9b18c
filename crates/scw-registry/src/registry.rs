use scw_api::{ScwClient, ServerAction, Task};
use tracing::{debug, info, warn};

use crate::api::ComputeApi;
use crate::collection::Collection;
use crate::config::Config;
use crate::model::{ReservedIp, Server, Volume};
use crate::{Error, ResourceKind, Result, ServerPublicIp};

/// Local snapshot of one account's servers, reserved IPs and volumes.
///
/// The registry is the single owner of every entity. Entities are addressed
/// by id across mutations; borrowing rules keep references from outliving a
/// refresh.
///
/// Consistency: `attach_ip`, `detach_ip` and `delete_reserved_ip` update
/// both sides of the affected relationship in memory once the provider has
/// accepted the request. Changes made by other clients are only observed
/// after a `refresh_*` call.
pub struct Registry<A: ComputeApi = ScwClient> {
    api: A,
    organization: String,
    servers: Collection<Server>,
    ips: Collection<ReservedIp>,
    volumes: Collection<Volume>,
}

impl Registry<ScwClient> {
    /// Build a client from `config` and load all three collections.
    pub async fn connect(config: &Config) -> Result<Self> {
        let client = config.client()?;
        info!(endpoint = %config.endpoint(), "connecting to compute api");
        Self::initialize(client, config.organization.clone()).await
    }
}

impl<A: ComputeApi> Registry<A> {
    /// An empty registry bound to `api`. Nothing is fetched until a refresh.
    pub fn new(api: A, organization: impl Into<String>) -> Self {
        Self {
            api,
            organization: organization.into(),
            servers: Collection::new(),
            ips: Collection::new(),
            volumes: Collection::new(),
        }
    }

    pub async fn initialize(api: A, organization: impl Into<String>) -> Result<Self> {
        let mut registry = Self::new(api, organization);
        registry.refresh_all().await?;
        Ok(registry)
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn servers(&self) -> &Collection<Server> {
        &self.servers
    }

    pub fn ips(&self) -> &Collection<ReservedIp> {
        &self.ips
    }

    pub fn volumes(&self) -> &Collection<Volume> {
        &self.volumes
    }

    // ── Refresh ─────────────────────────────────────────────────────

    /// Reload IPs, servers and volumes, in that order. Stops at the first
    /// failure; collections already refreshed keep their new contents.
    pub async fn refresh_all(&mut self) -> Result<()> {
        self.refresh_ips().await?;
        self.refresh_servers().await?;
        self.refresh_volumes().await?;
        Ok(())
    }

    /// Replace the server collection with a fresh listing. On failure the
    /// previous contents are kept.
    pub async fn refresh_servers(&mut self) -> Result<()> {
        let listing = self
            .api
            .list_servers()
            .await
            .map_err(|source| Error::RemoteUnavailable {
                collection: ResourceKind::Server,
                source,
            })?;

        self.servers = Collection::from_listing(listing.into_iter().map(Server::from));
        debug!(count = self.servers.len(), "refreshed servers");
        Ok(())
    }

    pub async fn refresh_ips(&mut self) -> Result<()> {
        let listing = self
            .api
            .list_ips()
            .await
            .map_err(|source| Error::RemoteUnavailable {
                collection: ResourceKind::Ip,
                source,
            })?;

        self.ips = Collection::from_listing(listing.into_iter().map(ReservedIp::from));
        debug!(count = self.ips.len(), "refreshed ips");
        Ok(())
    }

    pub async fn refresh_volumes(&mut self) -> Result<()> {
        let listing = self
            .api
            .list_volumes()
            .await
            .map_err(|source| Error::RemoteUnavailable {
                collection: ResourceKind::Volume,
                source,
            })?;

        self.volumes = Collection::from_listing(listing.into_iter().map(Volume::from));
        debug!(count = self.volumes.len(), "refreshed volumes");
        Ok(())
    }

    // ── Lookups ─────────────────────────────────────────────────────

    /// First server named `name`, in provider listing order.
    ///
    /// Names are not unique; when several servers share one the result is
    /// whichever the provider listed first. Use [`Self::find_servers_by_name`]
    /// to detect that case.
    pub fn find_server_by_name(&self, name: &str) -> Result<&Server> {
        self.servers
            .find(|server| server.name == name)
            .ok_or_else(|| Error::not_found(ResourceKind::Server, name))
    }

    pub fn find_servers_by_name(&self, name: &str) -> Vec<&Server> {
        self.servers.iter().filter(|server| server.name == name).collect()
    }

    pub fn find_server_by_id(&self, id: &str) -> Result<&Server> {
        self.servers
            .get(id)
            .ok_or_else(|| Error::not_found(ResourceKind::Server, id))
    }

    pub fn find_ip_by_id(&self, id: &str) -> Result<&ReservedIp> {
        self.ips
            .get(id)
            .ok_or_else(|| Error::not_found(ResourceKind::Ip, id))
    }

    pub fn find_ip_by_address(&self, address: &str) -> Result<&ReservedIp> {
        self.ips
            .find(|ip| ip.address == address)
            .ok_or_else(|| Error::not_found(ResourceKind::Ip, address))
    }

    pub fn find_volume_by_id(&self, id: &str) -> Result<&Volume> {
        self.volumes
            .get(id)
            .ok_or_else(|| Error::not_found(ResourceKind::Volume, id))
    }

    pub fn find_volume_by_name(&self, name: &str) -> Result<&Volume> {
        self.volumes
            .find(|volume| volume.name == name)
            .ok_or_else(|| Error::not_found(ResourceKind::Volume, name))
    }

    // ── Reserved IPs ────────────────────────────────────────────────

    /// Reserve a new IP for the organization and add it to the registry.
    pub async fn create_reserved_ip(&mut self) -> Result<&ReservedIp> {
        let created = self
            .api
            .create_ip(&self.organization)
            .await
            .map_err(Error::remote("create ip"))?;

        let ip = ReservedIp::from(created);
        let id = ip.id.clone();
        info!(ip_id = %id, address = %ip.address, "reserved new ip");

        self.ips.insert(ip);
        self.find_ip_by_id(&id)
    }

    /// Release a reserved IP.
    ///
    /// The local entry is removed only after the provider confirms the
    /// delete; on a remote failure it stays, since it still exists remotely.
    pub async fn delete_reserved_ip(&mut self, ip_id: &str) -> Result<()> {
        let attached_to = self.find_ip_by_id(ip_id)?.server_id.clone();

        self.api
            .delete_ip(ip_id)
            .await
            .map_err(Error::remote("delete ip"))?;

        self.ips.remove(ip_id);
        if let Some(server_id) = attached_to {
            self.clear_server_ip(&server_id, ip_id);
        }

        info!(ip_id, "released ip");
        Ok(())
    }

    // ── Servers ─────────────────────────────────────────────────────

    /// Request a provider action on a server. Returns the provider's task
    /// acknowledgement; the server state is not polled.
    pub async fn server_action(&self, server_id: &str, action: ServerAction) -> Result<Task> {
        self.find_server_by_id(server_id)?;

        let task = self
            .api
            .server_action(server_id, action)
            .await
            .map_err(Error::remote("server action"))?;

        info!(server_id, %action, task_id = %task.id, "server action accepted");
        Ok(task)
    }

    pub async fn power_on(&self, server_id: &str) -> Result<Task> {
        self.server_action(server_id, ServerAction::PowerOn).await
    }

    pub async fn power_off(&self, server_id: &str) -> Result<Task> {
        self.server_action(server_id, ServerAction::PowerOff).await
    }

    /// Re-fetch one server and overwrite its lifecycle fields in place:
    /// `state`, `state_detail`, `allowed_actions` and `modification_date`.
    /// Other fields and the rest of the collection are left alone.
    pub async fn update_state(&mut self, server_id: &str) -> Result<&Server> {
        self.find_server_by_id(server_id)?;

        let fresh = self
            .api
            .get_server(server_id)
            .await
            .map_err(Error::remote("get server"))?;

        let server = self
            .servers
            .get_mut(server_id)
            .ok_or_else(|| Error::not_found(ResourceKind::Server, server_id))?;

        if server.state != fresh.state {
            debug!(server_id, from = %server.state, to = %fresh.state, "server state changed");
        }
        server.state = fresh.state;
        server.state_detail = fresh.state_detail;
        server.allowed_actions = fresh.allowed_actions;
        server.modification_date = fresh.modification_date;
        Ok(&*server)
    }

    /// Attach a reserved IP to a server.
    ///
    /// On success the IP's server reference and the server's public IP are
    /// updated locally, and any association either side previously had is
    /// cleared.
    pub async fn attach_ip(&mut self, server_id: &str, ip_id: &str) -> Result<()> {
        let previous_ip = self
            .find_server_by_id(server_id)?
            .attached_ip_id()
            .map(str::to_string);
        let ip = self.find_ip_by_id(ip_id)?;
        let previous_server = ip.server_id.clone();
        let address = ip.address.clone();

        self.api
            .update_ip(ip_id, Some(server_id))
            .await
            .map_err(Error::remote("attach ip"))?;

        if let Some(previous_server) = previous_server.filter(|id| id != server_id) {
            self.clear_server_ip(&previous_server, ip_id);
        }
        if let Some(previous_ip) = previous_ip.filter(|id| id != ip_id) {
            if let Some(ip) = self.ips.get_mut(&previous_ip) {
                ip.server_id = None;
            }
        }

        if let Some(ip) = self.ips.get_mut(ip_id) {
            ip.server_id = Some(server_id.to_string());
        }
        if let Some(server) = self.servers.get_mut(server_id) {
            server.public_ip = Some(ServerPublicIp {
                id: ip_id.to_string(),
                address,
                dynamic: false,
            });
        }

        info!(server_id, ip_id, "attached ip");
        Ok(())
    }

    /// Detach whatever reserved IP is attached to the server.
    ///
    /// Fails with `NotFound` if the server has no IP that resolves in the
    /// registry.
    pub async fn detach_ip(&mut self, server_id: &str) -> Result<()> {
        let server = self.find_server_by_id(server_id)?;
        let ip_id = server
            .resolve_attached_ip(self)
            .map(|ip| ip.id.clone())
            .ok_or_else(|| Error::not_found(ResourceKind::Ip, format!("attached to server {server_id}")))?;

        self.api
            .update_ip(&ip_id, None)
            .await
            .map_err(Error::remote("detach ip"))?;

        if let Some(ip) = self.ips.get_mut(&ip_id) {
            ip.server_id = None;
        }
        self.clear_server_ip(server_id, &ip_id);

        info!(server_id, ip_id = %ip_id, "detached ip");
        Ok(())
    }

    fn clear_server_ip(&mut self, server_id: &str, ip_id: &str) {
        match self.servers.get_mut(server_id) {
            Some(server) if server.attached_ip_id() == Some(ip_id) => server.public_ip = None,
            Some(_) => {}
            None => warn!(server_id, ip_id, "ip referenced a server missing from the registry"),
        }
    }
}
