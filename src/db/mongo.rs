//! MongoDB transport backed by the official `mongodb` driver.

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::options::{ClientOptions, Credential};
use mongodb::{Client, Database};

use crate::db::config::{ConnectOptions, ConnectionTarget};
use crate::db::transport::{FailureKind, Transport, TransportClient, TransportError};

#[derive(Clone, Copy, Debug, Default)]
pub struct MongoTransport;

#[async_trait]
impl Transport for MongoTransport {
    type Client = MongoClient;

    async fn open(
        &self,
        target: &ConnectionTarget,
        options: &ConnectOptions,
    ) -> Result<MongoClient, TransportError> {
        let uri = match target {
            ConnectionTarget::Url(url) => url.clone(),
            ConnectionTarget::HostPort { host, port } => format!("mongodb://{host}:{port}"),
        };

        let mut client_options = ClientOptions::parse(&uri).await.map_err(classify)?;
        apply(&mut client_options, options);

        let client = Client::with_options(client_options).map_err(classify)?;
        let client = MongoClient(client);
        // The driver connects lazily; force a round-trip so bad targets fail here.
        client.ping().await?;
        Ok(client)
    }
}

/// The driver has no socket idle timeout; `socket_timeout` is not applied.
fn apply(client_options: &mut ClientOptions, options: &ConnectOptions) {
    client_options.server_selection_timeout = Some(options.server_selection_timeout);
    client_options.connect_timeout = Some(options.connect_timeout);
    client_options.max_pool_size = Some(options.max_pool_size);
    client_options.min_pool_size = Some(options.min_pool_size);
    client_options.max_idle_time = Some(options.max_idle_time);
    client_options.retry_writes = Some(options.retry_writes);
    client_options.retry_reads = Some(options.retry_reads);
    client_options.heartbeat_freq = Some(options.heartbeat_frequency);

    if let Some(creds) = &options.credentials {
        client_options.credential = Some(
            Credential::builder()
                .username(creds.username.clone())
                .password(creds.password.clone())
                .build(),
        );
    }
}

pub struct MongoClient(Client);

#[async_trait]
impl TransportClient for MongoClient {
    type Database = Database;

    fn database(&self, name: &str) -> Database {
        self.0.database(name)
    }

    async fn ping(&self) -> Result<(), TransportError> {
        self.0
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(classify)
    }

    async fn close(&self) {
        // `Client` clones share one pool; outstanding handles must not hold
        // the shutdown open.
        self.0.clone().shutdown().immediate(true).await;
    }
}

fn classify(err: MongoError) -> TransportError {
    let kind = match err.kind.as_ref() {
        ErrorKind::Io(io) => match io.kind() {
            std::io::ErrorKind::ConnectionRefused => FailureKind::Refused,
            std::io::ErrorKind::TimedOut => FailureKind::Timeout,
            _ => FailureKind::Other,
        },
        ErrorKind::ServerSelection { message, .. } => server_selection_kind(message),
        ErrorKind::Authentication { .. } => FailureKind::Authentication,
        _ => FailureKind::Other,
    };
    TransportError::new(kind, err.to_string())
}

/// Selection timeouts embed the last heartbeat error. A refused socket in
/// there is reported as `Refused`.
fn server_selection_kind(message: &str) -> FailureKind {
    if message.contains("refused") {
        FailureKind::Refused
    } else {
        FailureKind::ServerSelection
    }
}
