//! Per-route completion records.
//!
//! Every handler bound through the registry is wrapped by [`instrument`].
//! The wrapper stamps the start time, subscribes to the request's finish
//! signal, and hands the request to the real handler untouched. When the
//! router finalizes the response, the hook reports a [`Completion`] to the
//! configured [`CompletionSink`].
//!
//! The record is keyed to the response lifecycle, not to the handler's
//! return: a handler that awaits a slow query is timed until its response is
//! actually finished.

use std::sync::Arc;
use std::time::{Duration, Instant};

use http::StatusCode;
use tracing::{error, info, warn};

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::method::Method;
use crate::request::Request;

/// One finished request on a bound route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Completion {
    pub method: Method,
    /// The resolved route pattern (`/api/users/:id`), not the concrete URL.
    pub path: Arc<str>,
    pub status: StatusCode,
    pub duration: Duration,
}

impl Completion {
    pub fn duration_ms(&self) -> u64 {
        u64::try_from(self.duration.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Destination for completion records.
///
/// Any `Fn(&Completion)` closure is a sink, which is how tests collect them.
pub trait CompletionSink: Send + Sync + 'static {
    fn record(&self, completion: &Completion);
}

impl<F> CompletionSink for F
where
    F: Fn(&Completion) + Send + Sync + 'static,
{
    fn record(&self, completion: &Completion) {
        self(completion)
    }
}

/// Default sink: one structured `tracing` event per request, leveled by
/// status class.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl CompletionSink for TracingSink {
    fn record(&self, c: &Completion) {
        let method = c.method.as_str();
        let path = &*c.path;
        let status = c.status.as_u16();
        let duration_ms = c.duration_ms();

        if c.status.is_server_error() {
            error!(method, path, status, duration_ms, "request completed");
        } else if c.status.is_client_error() {
            warn!(method, path, status, duration_ms, "request completed");
        } else {
            info!(method, path, status, duration_ms, "request completed");
        }
    }
}

/// Wraps `inner` so that each call reports a [`Completion`] for
/// `method` + `path` to `sink` once the response is finished.
pub fn instrument(
    inner: BoxedHandler,
    method: Method,
    path: &str,
    sink: Arc<dyn CompletionSink>,
) -> BoxedHandler {
    Arc::new(Instrumented { inner, method, path: Arc::from(path), sink })
}

struct Instrumented {
    inner: BoxedHandler,
    method: Method,
    path: Arc<str>,
    sink: Arc<dyn CompletionSink>,
}

impl ErasedHandler for Instrumented {
    fn call(&self, req: Request) -> BoxFuture {
        let started = Instant::now();
        let method = self.method;
        let path = Arc::clone(&self.path);
        let sink = Arc::clone(&self.sink);

        req.on_finish(move |status| {
            sink.record(&Completion { method, path, status, duration: started.elapsed() });
        });

        self.inner.call(req)
    }
}
