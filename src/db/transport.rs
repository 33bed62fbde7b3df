//! Seam between the connection manager and a concrete database driver.

use std::fmt;

use async_trait::async_trait;

use crate::db::config::{ConnectOptions, ConnectionTarget};

/// Opens client connections to the document store.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    type Client: TransportClient;

    /// Opens a connection and verifies it with one round-trip.
    async fn open(
        &self,
        target: &ConnectionTarget,
        options: &ConnectOptions,
    ) -> Result<Self::Client, TransportError>;
}

/// A live client connection.
#[async_trait]
pub trait TransportClient: Send + Sync + 'static {
    type Database: Send + Sync + 'static;

    fn database(&self, name: &str) -> Self::Database;

    /// Lightweight liveness round-trip.
    async fn ping(&self) -> Result<(), TransportError>;

    /// Shuts the client down. Clones held elsewhere stop working too.
    async fn close(&self);
}

/// Coarse failure classes with an operator-facing remedy each.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureKind {
    Refused,
    Timeout,
    ServerSelection,
    Authentication,
    Other,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Refused         => "connection refused",
            Self::Timeout         => "connection timed out",
            Self::ServerSelection => "server selection timed out",
            Self::Authentication  => "authentication failed",
            Self::Other           => "connection failed",
        }
    }

    /// What to check next.
    pub fn hint(self) -> &'static str {
        match self {
            Self::Refused => {
                "check that the database server is running and that DATABASE_HOST / DATABASE_PORT point at it"
            }
            Self::Timeout => {
                "check network reachability and firewall rules between this host and the database"
            }
            Self::ServerSelection => {
                "check that DATABASE_URL is valid and that this host's IP address is on the cluster's access list"
            }
            Self::Authentication => {
                "check DATABASE_USER / DATABASE_PASSWORD, or the credentials embedded in DATABASE_URL"
            }
            Self::Other => "check the database target and the driver error above",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified driver failure.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }
}
