//! Radix-tree request router: the host routing target.
//!
//! One tree per HTTP method, keyed by [`Method`]. Routes are not added here
//! directly; the [`RouteRegistry`](crate::RouteRegistry) binds them through
//! [`MountTarget::register`] when it is mounted.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use matchit::{InsertError, Router as MatchitRouter};
use serde_json::json;
use tracing::warn;

use crate::handler::BoxedHandler;
use crate::method::Method;
use crate::registry::MountTarget;
use crate::request::Request;
use crate::response::{FinishSignal, Response};

/// The application router.
///
/// Build it once at startup, hand it to
/// [`RouteRegistry::mount`](crate::RouteRegistry::mount), then pass the
/// mounted target to [`Server::serve`](crate::Server::serve).
#[derive(Default)]
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    len: usize,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of method + path pairs that are actually routable.
    pub fn len(&self) -> usize { self.len }
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Whether `path` (a concrete URL path) resolves for `method`.
    pub fn contains(&self, method: Method, path: &str) -> bool {
        self.lookup(method, path).is_some()
    }

    /// Routes one request and produces its final response.
    ///
    /// Unroutable methods get `405`, unknown paths a JSON `404`. Once the
    /// response is final the request's finish signal fires with its status.
    pub async fn respond(&self, req: http::Request<Bytes>) -> Response {
        let (parts, body) = req.into_parts();
        let path = parts.uri.path().to_owned();

        let Some(method) = Method::from_http(&parts.method) else {
            return Response::status(StatusCode::METHOD_NOT_ALLOWED);
        };

        let Some((handler, params)) = self.lookup(method, &path) else {
            return not_found(method, &path);
        };

        let finish = FinishSignal::default();
        let req = Request::new(method, path, parts.headers, body, params, finish.clone());
        let response = handler.call(req).await;
        finish.fire(response.status_code());
        response
    }

    fn lookup(&self, method: Method, path: &str) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl MountTarget for Router {
    /// Inserts `handler` under `path`, translating `:name` / `*name`
    /// segments into the tree's `{name}` / `{*name}` syntax.
    ///
    /// A pattern that collides with an earlier one for the same method keeps
    /// the earlier handler: first registration wins.
    ///
    /// # Panics
    ///
    /// Panics on a malformed pattern (e.g. an unnamed parameter). Routes are
    /// bound at startup, so this surfaces as a boot failure.
    fn register(&mut self, method: Method, path: &str, handler: BoxedHandler) {
        let pattern = tree_pattern(path);
        match self.routes.entry(method).or_default().insert(pattern, handler) {
            Ok(()) => self.len += 1,
            Err(InsertError::Conflict { with }) => {
                warn!(%method, path, existing = %with, "route shadowed by an earlier registration");
            }
            Err(e) => panic!("invalid route `{path}`: {e}"),
        }
    }
}

fn not_found(method: Method, path: &str) -> Response {
    warn!(%method, path, "route not found");
    let message = format!("Route {method} {path} not found");
    let body = json!({ "error": { "message": message, "statusCode": 404 } });
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .json(body.to_string().into_bytes())
}

fn tree_pattern(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if let Some(name) = segment.strip_prefix(':') {
                format!("{{{name}}}")
            } else if let Some(name) = segment.strip_prefix('*') {
                let name = if name.is_empty() { "rest" } else { name };
                format!("{{*{name}}}")
            } else {
                segment.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
