//! Local mirror of a Scaleway compute account.
//!
//! [`Registry`] holds the current snapshot of servers, reserved IPs and
//! volumes, resolves the relationships between them by identifier, and
//! applies remote mutations while keeping the snapshot consistent.

pub mod api;
pub mod collection;
pub mod config;
pub mod model;
pub mod registry;

#[cfg(test)]
pub(crate) mod fake;

use std::fmt;
use std::path::PathBuf;

pub use api::ComputeApi;
pub use collection::{Collection, Resource};
pub use config::Config;
pub use model::{ReservedIp, Server, Volume};
pub use registry::Registry;
pub use scw_api::{ServerAction, ServerPublicIp, ServerState, Task};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{kind} not found: {key}")]
    NotFound { kind: ResourceKind, key: String },

    #[error("{operation} failed: {source}")]
    RemoteRequestFailed {
        operation: &'static str,
        #[source]
        source: scw_api::Error,
    },

    #[error("could not refresh {collection} listing: {source}")]
    RemoteUnavailable {
        collection: ResourceKind,
        #[source]
        source: scw_api::Error,
    },

    #[error("missing env var: {0}")]
    MissingEnv(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("cannot read credentials from {}: {source}", path.display())]
    Credentials {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn not_found(kind: ResourceKind, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }

    pub(crate) fn remote(operation: &'static str) -> impl FnOnce(scw_api::Error) -> Self {
        move |source| Self::RemoteRequestFailed { operation, source }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// The three resource kinds mirrored by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Server,
    Ip,
    Volume,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Ip => "ip",
            Self::Volume => "volume",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
