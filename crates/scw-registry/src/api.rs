use async_trait::async_trait;
use scw_api::{Ip, ScwClient, Server, ServerAction, Task, Volume};

/// The remote capability the registry consumes.
///
/// [`ScwClient`] is the production implementation; tests substitute an
/// in-memory fake so registry semantics can be checked without HTTP.
#[async_trait]
pub trait ComputeApi: Send + Sync + 'static {
    async fn list_servers(&self) -> scw_api::Result<Vec<Server>>;

    async fn get_server(&self, server_id: &str) -> scw_api::Result<Server>;

    async fn server_action(&self, server_id: &str, action: ServerAction) -> scw_api::Result<Task>;

    async fn list_ips(&self) -> scw_api::Result<Vec<Ip>>;

    async fn create_ip(&self, organization: &str) -> scw_api::Result<Ip>;

    /// Attach (`Some`) or detach (`None`) a reserved IP.
    async fn update_ip(&self, ip_id: &str, server_id: Option<&str>) -> scw_api::Result<Ip>;

    async fn delete_ip(&self, ip_id: &str) -> scw_api::Result<()>;

    async fn list_volumes(&self) -> scw_api::Result<Vec<Volume>>;
}

#[async_trait]
impl ComputeApi for ScwClient {
    async fn list_servers(&self) -> scw_api::Result<Vec<Server>> {
        ScwClient::list_servers(self).await
    }

    async fn get_server(&self, server_id: &str) -> scw_api::Result<Server> {
        ScwClient::get_server(self, server_id).await
    }

    async fn server_action(&self, server_id: &str, action: ServerAction) -> scw_api::Result<Task> {
        ScwClient::server_action(self, server_id, action).await
    }

    async fn list_ips(&self) -> scw_api::Result<Vec<Ip>> {
        ScwClient::list_ips(self).await
    }

    async fn create_ip(&self, organization: &str) -> scw_api::Result<Ip> {
        ScwClient::create_ip(self, organization).await
    }

    async fn update_ip(&self, ip_id: &str, server_id: Option<&str>) -> scw_api::Result<Ip> {
        ScwClient::update_ip(self, ip_id, server_id).await
    }

    async fn delete_ip(&self, ip_id: &str) -> scw_api::Result<()> {
        ScwClient::delete_ip(self, ip_id).await
    }

    async fn list_volumes(&self) -> scw_api::Result<Vec<Volume>> {
        ScwClient::list_volumes(self).await
    }
}
