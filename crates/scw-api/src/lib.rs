//! Typed Rust client for the Scaleway compute API.
//!
//! Covers the subset needed for managing a small fleet:
//! servers (list, get, power actions), reserved IPs (list, create,
//! attach/detach, delete) and volumes (list).

mod types;

use std::fmt;
use std::time::Duration;

pub use reqwest::StatusCode;
pub use types::*;

/// Default request timeout. The provider API occasionally stalls; a hung
/// call should fail rather than block the caller forever.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const AUTH_HEADER: &str = "X-Auth-Token";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("scaleway api request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("scaleway api {endpoint} returned {status}: {body}")]
    Api {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
}

impl Error {
    /// HTTP status of an API-level failure, if the provider answered at all.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Request(e) => e.status(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Compute API endpoint for a region, e.g. `par1` or `ams1`.
pub fn region_url(region: &str) -> String {
    format!("https://cp-{region}.scaleway.com")
}

/// Client for the Scaleway compute REST API.
#[derive(Clone)]
pub struct ScwClient {
    token: String,
    base_url: String,
    http: reqwest::Client,
}

impl fmt::Debug for ScwClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScwClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ScwClient {
    pub fn new(token: impl Into<String>, region: &str) -> Result<Self> {
        Self::with_base_url(token, region_url(region), DEFAULT_TIMEOUT)
    }

    /// Point the client at an arbitrary endpoint (staging, a local mock).
    pub fn with_base_url(
        token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url: String = base_url.into();

        Ok(Self {
            token: token.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn check(resp: reqwest::Response, endpoint: &'static str) -> Result<reqwest::Response> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                endpoint,
                status,
                body,
            });
        }
        Ok(resp)
    }

    // ── Servers ─────────────────────────────────────────────────────

    pub async fn list_servers(&self) -> Result<Vec<Server>> {
        let resp = self
            .http
            .get(self.url("/servers"))
            .header(AUTH_HEADER, &self.token)
            .send()
            .await?;

        let body: ListServersResponse = Self::check(resp, "list servers").await?.json().await?;
        Ok(body.servers)
    }

    pub async fn get_server(&self, server_id: &str) -> Result<Server> {
        let resp = self
            .http
            .get(self.url(&format!("/servers/{server_id}")))
            .header(AUTH_HEADER, &self.token)
            .send()
            .await?;

        let body: ServerResponse = Self::check(resp, "get server").await?.json().await?;
        Ok(body.server)
    }

    /// Request a power/lifecycle action. Returns once the provider has
    /// accepted the task, not when the transition completes.
    pub async fn server_action(&self, server_id: &str, action: ServerAction) -> Result<Task> {
        let resp = self
            .http
            .post(self.url(&format!("/servers/{server_id}/action")))
            .header(AUTH_HEADER, &self.token)
            .json(&ServerActionRequest { action })
            .send()
            .await?;

        let body: TaskResponse = Self::check(resp, "server action").await?.json().await?;
        Ok(body.task)
    }

    // ── IPs ─────────────────────────────────────────────────────────

    pub async fn list_ips(&self) -> Result<Vec<Ip>> {
        let resp = self
            .http
            .get(self.url("/ips"))
            .header(AUTH_HEADER, &self.token)
            .send()
            .await?;

        let body: ListIpsResponse = Self::check(resp, "list ips").await?.json().await?;
        Ok(body.ips)
    }

    pub async fn create_ip(&self, organization: &str) -> Result<Ip> {
        let resp = self
            .http
            .post(self.url("/ips"))
            .header(AUTH_HEADER, &self.token)
            .json(&CreateIpRequest {
                organization: organization.to_string(),
            })
            .send()
            .await?;

        let body: IpResponse = Self::check(resp, "create ip").await?.json().await?;
        Ok(body.ip)
    }

    /// Attach the IP to `server_id`, or detach it when `server_id` is `None`.
    pub async fn update_ip(&self, ip_id: &str, server_id: Option<&str>) -> Result<Ip> {
        let resp = self
            .http
            .patch(self.url(&format!("/ips/{ip_id}")))
            .header(AUTH_HEADER, &self.token)
            .json(&UpdateIpRequest {
                server: server_id.map(str::to_string),
            })
            .send()
            .await?;

        let body: IpResponse = Self::check(resp, "update ip").await?.json().await?;
        Ok(body.ip)
    }

    pub async fn delete_ip(&self, ip_id: &str) -> Result<()> {
        let resp = self
            .http
            .delete(self.url(&format!("/ips/{ip_id}")))
            .header(AUTH_HEADER, &self.token)
            .send()
            .await?;

        Self::check(resp, "delete ip").await?;
        Ok(())
    }

    // ── Volumes ─────────────────────────────────────────────────────

    pub async fn list_volumes(&self) -> Result<Vec<Volume>> {
        let resp = self
            .http
            .get(self.url("/volumes"))
            .header(AUTH_HEADER, &self.token)
            .send()
            .await?;

        let body: ListVolumesResponse = Self::check(resp, "list volumes").await?.json().await?;
        Ok(body.volumes)
    }
}
