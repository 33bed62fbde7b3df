//! In-memory transport for exercising the connection manager.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing::subscriber::DefaultGuard;
use keel::db::{
    ConnectOptions, ConnectionConfig, ConnectionTarget, FailureKind, Transport, TransportClient,
    TransportError,
};

#[derive(Default)]
pub struct FakeState {
    pub opens: AtomicUsize,
    pub closes: AtomicUsize,
    pub pings: AtomicUsize,
    /// Pings left to fail before the transport recovers.
    pub failing_pings: AtomicUsize,
    pub fail_open: Mutex<Option<FailureKind>>,
    pub open_delay: Mutex<Duration>,
    pub ping_delay: Mutex<Duration>,
    pub last_target: Mutex<Option<ConnectionTarget>>,
    pub last_options: Mutex<Option<ConnectOptions>>,
}

impl FakeState {
    pub fn opens(&self) -> usize { self.opens.load(Ordering::SeqCst) }
    pub fn closes(&self) -> usize { self.closes.load(Ordering::SeqCst) }
    pub fn pings(&self) -> usize { self.pings.load(Ordering::SeqCst) }

    pub fn fail_next_pings(&self, n: usize) {
        self.failing_pings.store(n, Ordering::SeqCst);
    }

    pub fn fail_opens_with(&self, kind: Option<FailureKind>) {
        *self.fail_open.lock().unwrap() = kind;
    }
}

#[derive(Clone, Default)]
pub struct FakeTransport {
    pub state: Arc<FakeState>,
}

impl FakeTransport {
    pub fn with_open_delay(delay: Duration) -> Self {
        let transport = Self::default();
        *transport.state.open_delay.lock().unwrap() = delay;
        transport
    }

    pub fn with_ping_delay(delay: Duration) -> Self {
        let transport = Self::default();
        *transport.state.ping_delay.lock().unwrap() = delay;
        transport
    }
}

#[async_trait]
impl Transport for FakeTransport {
    type Client = FakeClient;

    async fn open(
        &self,
        target: &ConnectionTarget,
        options: &ConnectOptions,
    ) -> Result<FakeClient, TransportError> {
        let generation = self.state.opens.fetch_add(1, Ordering::SeqCst) + 1;
        *self.state.last_target.lock().unwrap() = Some(target.clone());
        *self.state.last_options.lock().unwrap() = Some(options.clone());

        let delay = *self.state.open_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let fail = *self.state.fail_open.lock().unwrap();
        if let Some(kind) = fail {
            return Err(TransportError::new(kind, "fake open failure"));
        }
        Ok(FakeClient { generation, state: Arc::clone(&self.state) })
    }
}

pub struct FakeClient {
    generation: usize,
    state: Arc<FakeState>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct FakeDatabase {
    pub name: String,
    pub generation: usize,
}

#[async_trait]
impl TransportClient for FakeClient {
    type Database = FakeDatabase;

    fn database(&self, name: &str) -> FakeDatabase {
        FakeDatabase { name: name.to_owned(), generation: self.generation }
    }

    async fn ping(&self) -> Result<(), TransportError> {
        self.state.pings.fetch_add(1, Ordering::SeqCst);

        let delay = *self.state.ping_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let failed = self.state.failing_pings
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(TransportError::new(FailureKind::Timeout, "fake ping failure"));
        }
        Ok(())
    }

    async fn close(&self) {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn host_config() -> ConnectionConfig {
    ConnectionConfig {
        host: Some("localhost".into()),
        port: Some(27017),
        database_name: Some("app".into()),
        ..Default::default()
    }
}

/// Log lines written while the returned guard is alive, on this thread only.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}
