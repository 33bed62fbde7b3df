//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, StatusCode};

use crate::method::Method;
use crate::response::FinishSignal;

/// An incoming HTTP request, matched to a route.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
    pub(crate) finish: FinishSignal,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        path: String,
        headers: HeaderMap,
        body: Bytes,
        params: HashMap<String, String>,
        finish: FinishSignal,
    ) -> Self {
        Self { method, path, headers, body, params, finish }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Header lookup. Values that are not visible ASCII yield `None`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/:id`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Runs `hook` once with the final status after the response to this
    /// request is finished, which may be well after the handler's future
    /// was first polled.
    pub fn on_finish(&self, hook: impl FnOnce(StatusCode) + Send + 'static) {
        self.finish.subscribe(Box::new(hook));
    }
}
