//! Connection manager: one memoized, self-healing connection per process.

use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::db::config::{ConnectOptions, ConnectionConfig};
use crate::db::transport::{FailureKind, Transport, TransportClient, TransportError};

/// Failures surfaced by [`ConnectionManager::connect`].
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database configuration error: {0}")]
    Configuration(String),

    #[error("cannot connect to {target}: {source} ({})", .source.kind.hint())]
    Connection {
        target: String,
        #[source]
        source: TransportError,
    },
}

impl DbError {
    /// Failure class of a connection error.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::Configuration(_) => None,
            Self::Connection { source, .. } => Some(source.kind),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

type Database<T> = <<T as Transport>::Client as TransportClient>::Database;

/// Client and database handle; present together or not at all.
struct Connection<T: Transport> {
    client: T::Client,
    database: Arc<Database<T>>,
}

/// Owns the process's database connection.
///
/// Construct once at boot, share behind an `Arc`, and call
/// [`connect`](Self::connect) wherever a database handle is needed: the first
/// call opens the connection, later calls verify it with a ping and reuse it,
/// and a failed ping triggers a transparent reconnect.
///
/// Reuse is lock-free apart from copying the cached `Arc` out of its slot;
/// liveness pings run concurrently. Only opening and closing go through
/// `opening`, so callers racing on a cold or broken connection wait for the
/// one in-flight attempt instead of starting their own.
pub struct ConnectionManager<T: Transport> {
    transport: T,
    config: ConnectionConfig,
    options: ConnectOptions,
    current: StdMutex<Option<Arc<Connection<T>>>>,
    opening: Mutex<()>,
}

impl<T: Transport> ConnectionManager<T> {
    pub fn new(transport: T, config: ConnectionConfig) -> Self {
        Self::with_options(transport, config, ConnectOptions::default())
    }

    pub fn with_options(transport: T, config: ConnectionConfig, options: ConnectOptions) -> Self {
        Self {
            transport,
            config,
            options,
            current: StdMutex::new(None),
            opening: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &ConnectionConfig { &self.config }

    pub fn state(&self) -> ConnectionState {
        match self.cached() {
            Some(_) => ConnectionState::Connected,
            None => ConnectionState::Disconnected,
        }
    }

    /// Returns the database handle, connecting or reconnecting as needed.
    pub async fn connect(&self) -> Result<Arc<Database<T>>, DbError> {
        // Ping without holding any lock; healthy reuse never waits on others.
        let stale = match self.cached() {
            Some(live) => match live.client.ping().await {
                Ok(()) => {
                    debug!("reusing database connection");
                    return Ok(Arc::clone(&live.database));
                }
                Err(e) => {
                    warn!(error = %e, "database liveness probe failed, reconnecting");
                    Some(live)
                }
            },
            None => None,
        };

        let _opening = self.opening.lock().await;

        // Someone else may have (re)connected while we waited.
        if let Some(now) = self.cached() {
            let replaced = stale.as_ref().is_none_or(|old| !Arc::ptr_eq(old, &now));
            if replaced {
                debug!("using connection opened by a concurrent caller");
                return Ok(Arc::clone(&now.database));
            }
        }

        let target = self.config.target().ok_or_else(|| {
            DbError::Configuration(
                "no database target: set DATABASE_URL or DATABASE_HOST".to_owned(),
            )
        })?;
        let name = self.config.database_name().ok_or_else(|| {
            DbError::Configuration("DATABASE_NAME is not set".to_owned())
        })?;
        let options = self.options.for_target(&target, &self.config);

        let client = match self.transport.open(&target, &options).await {
            Ok(client) => client,
            Err(source) => {
                self.replace(None);
                error!(
                    endpoint = %target,
                    kind = %source.kind,
                    error = %source.message,
                    hint = source.kind.hint(),
                    "database connection failed",
                );
                return Err(DbError::Connection { target: target.to_string(), source });
            }
        };

        let database = Arc::new(client.database(name));
        // The stale connection is dropped, not closed: in-flight requests may
        // still hold its handles.
        self.replace(Some(Arc::new(Connection { client, database: Arc::clone(&database) })));
        info!(endpoint = %target, database = name, "database connected");

        if !self.config.is_production && self.config.credentials().is_none() {
            warn!("database connection is not authenticated: set DATABASE_USER and DATABASE_PASSWORD");
        }

        Ok(database)
    }

    /// Closes the connection. A no-op when nothing is connected.
    pub async fn disconnect(&self) {
        let _opening = self.opening.lock().await;
        let Some(connection) = self.replace(None) else {
            debug!("database already disconnected");
            return;
        };
        connection.client.close().await;
        info!("database disconnected");
    }

    fn cached(&self) -> Option<Arc<Connection<T>>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn replace(&self, next: Option<Arc<Connection<T>>>) -> Option<Arc<Connection<T>>> {
        std::mem::replace(&mut *self.current.lock().unwrap_or_else(PoisonError::into_inner), next)
    }
}
