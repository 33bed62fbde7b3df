//! Connection parameters and pool tuning.

use std::fmt;
use std::time::Duration;

/// Port used when a host is configured without one.
pub const DEFAULT_PORT: u16 = 27017;

/// Connection parameters, resolved once from the environment at boot.
#[derive(Clone, Debug, Default)]
pub struct ConnectionConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database_name: Option<String>,
    pub is_production: bool,
    /// Full connection string, credentials embedded.
    pub url: Option<String>,
}

impl ConnectionConfig {
    /// Picks where to connect.
    ///
    /// Production prefers the full URL and falls back to host/port;
    /// everywhere else host/port wins and the URL is the fallback. `None`
    /// when neither is set.
    pub fn target(&self) -> Option<ConnectionTarget> {
        let url = non_empty(&self.url).map(|url| ConnectionTarget::Url(url.to_owned()));
        let host_port = non_empty(&self.host).map(|host| ConnectionTarget::HostPort {
            host: host.to_owned(),
            port: self.port.unwrap_or(DEFAULT_PORT),
        });

        if self.is_production {
            url.or(host_port)
        } else {
            host_port.or(url)
        }
    }

    pub fn database_name(&self) -> Option<&str> {
        non_empty(&self.database_name)
    }

    /// Username and password, only when both are set.
    pub fn credentials(&self) -> Option<Credentials> {
        match (non_empty(&self.username), non_empty(&self.password)) {
            (Some(username), Some(password)) => Some(Credentials {
                username: username.to_owned(),
                password: password.to_owned(),
            }),
            _ => None,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Where the transport connects.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionTarget {
    HostPort { host: String, port: u16 },
    Url(String),
}

/// Safe for logs: userinfo in a URL is masked.
impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HostPort { host, port } => write!(f, "{host}:{port}"),
            Self::Url(url) => f.write_str(&redact(url)),
        }
    }
}

fn redact(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_owned();
    };
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => {
            let user = rest[..at].split(':').next().unwrap_or_default();
            format!("{scheme}://{user}:***@{}", &rest[at + 1..])
        }
        None => url.to_owned(),
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Driver options for short-lived, bursty execution environments.
///
/// Timeouts are generous to ride out cold-start network latency; the pool
/// is small and allowed to drain to zero between bursts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectOptions {
    pub server_selection_timeout: Duration,
    pub connect_timeout: Duration,
    /// Idle socket timeout. Informational only: the `mongodb` driver has no
    /// such setting, so the MongoDB transport does not apply it.
    pub socket_timeout: Duration,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub max_idle_time: Duration,
    pub retry_writes: bool,
    pub retry_reads: bool,
    pub heartbeat_frequency: Duration,
    /// Only set for host/port targets; a URL carries its own.
    pub credentials: Option<Credentials>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            server_selection_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(30),
            socket_timeout: Duration::from_secs(45),
            max_pool_size: 10,
            min_pool_size: 0,
            max_idle_time: Duration::from_secs(30),
            retry_writes: true,
            retry_reads: true,
            heartbeat_frequency: Duration::from_secs(10),
            credentials: None,
        }
    }
}

impl ConnectOptions {
    /// These options, with credentials attached when `target` needs them.
    pub fn for_target(&self, target: &ConnectionTarget, config: &ConnectionConfig) -> Self {
        let credentials = match target {
            ConnectionTarget::HostPort { .. } => config.credentials(),
            ConnectionTarget::Url(_) => None,
        };
        Self { credentials, ..self.clone() }
    }
}
