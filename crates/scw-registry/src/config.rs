use std::fmt;
use std::path::Path;
use std::time::Duration;

use scw_api::ScwClient;

use crate::{Error, Result};

pub const DEFAULT_REGION: &str = "par1";

/// Credentials and endpoint settings for reaching the compute API.
#[derive(Clone)]
pub struct Config {
    pub token: String,
    pub organization: String,
    pub region: String,
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("organization", &self.organization)
            .field("region", &self.region)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    pub fn new(
        token: impl Into<String>,
        organization: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            organization: organization.into(),
            region: region.into(),
            base_url: None,
            timeout: scw_api::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load from env vars (and `.env` if present):
    ///
    /// - `SCW_TOKEN` (required)
    /// - `SCW_ORGANIZATION` (required)
    /// - `SCW_REGION` (default: `"par1"`)
    /// - `SCW_API_URL` (optional, overrides the regional endpoint)
    /// - `SCW_TIMEOUT_SECS` (default: `30`)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| lookup(key).ok_or_else(|| Error::MissingEnv(key.into()));

        let token = required("SCW_TOKEN")?;
        let organization = required("SCW_ORGANIZATION")?;
        let region = lookup("SCW_REGION").unwrap_or_else(|| DEFAULT_REGION.into());

        let mut config = Self::new(token, organization, region);
        config.base_url = lookup("SCW_API_URL");

        if let Some(raw) = lookup("SCW_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| Error::InvalidConfig(format!("SCW_TIMEOUT_SECS must be an integer, got {raw:?}")))?;
            if secs == 0 {
                return Err(Error::InvalidConfig("SCW_TIMEOUT_SECS must be greater than zero".into()));
            }
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Read the token and organization id from two files, one value each.
    /// Surrounding whitespace (trailing newline) is ignored.
    pub fn from_files(
        key_path: impl AsRef<Path>,
        org_path: impl AsRef<Path>,
        region: impl Into<String>,
    ) -> Result<Self> {
        let token = read_credential(key_path.as_ref())?;
        let organization = read_credential(org_path.as_ref())?;
        Ok(Self::new(token, organization, region))
    }

    /// Endpoint the client will talk to.
    pub fn endpoint(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| scw_api::region_url(&self.region))
    }

    pub fn client(&self) -> Result<ScwClient> {
        ScwClient::with_base_url(self.token.clone(), self.endpoint(), self.timeout)
            .map_err(|e| Error::InvalidConfig(format!("cannot build http client: {e}")))
    }
}

fn read_credential(path: &Path) -> Result<String> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::Credentials {
        path: path.to_path_buf(),
        source,
    })?;
    let value = raw.trim();
    if value.is_empty() {
        return Err(Error::InvalidConfig(format!("{} is empty", path.display())));
    }
    Ok(value.to_string())
}
