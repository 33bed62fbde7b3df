//! Route registry: declare routes anywhere at startup, bind them once.
//!
//! Registration is two-phase. Application modules declare routes on a
//! [`RouteRegistry`] before any host router exists. [`RouteRegistry::mount`]
//! consumes the registry, binds every declared route on the target in
//! insertion order, and yields a [`MountedRegistry`] that binds any later
//! registration immediately.
//!
//! ```rust
//! use keel::{Request, RouteRegistry, Router, Routes};
//!
//! async fn list_users(_req: Request) -> &'static str { "[]" }
//! async fn create_user(_req: Request) -> &'static str { "{}" }
//! async fn show_user(_req: Request) -> &'static str { "{}" }
//!
//! let mut registry = RouteRegistry::new("api");
//! registry.route("/users")
//!     .get(list_users)
//!     .post(create_user)
//!     .get_at("/:id", show_user);
//!
//! let mounted = registry.mount(Router::new());
//! assert_eq!(mounted.target().len(), 3);
//! ```
//!
//! A declared route holds its handler; binding consumes it and leaves a
//! [`BoundRoute`] behind, so no route is ever bound twice.

mod builder;

use std::sync::Arc;

use tracing::{debug, info, warn};

pub use builder::RouteBuilder;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::trace::{self, CompletionSink, TracingSink};

/// A host routing table routes can be bound to.
pub trait MountTarget {
    /// Registers `handler` for `method` at the fully resolved `path`.
    fn register(&mut self, method: Method, path: &str, handler: BoxedHandler);
}

/// Registration surface shared by both registry phases.
pub trait Routes: Sized {
    /// Adds a route at `path`, relative to the registry prefix.
    fn add_route(&mut self, method: Method, path: &str, handler: impl Handler) -> &mut Self;

    fn get(&mut self, path: &str, handler: impl Handler) -> &mut Self {
        self.add_route(Method::Get, path, handler)
    }

    fn post(&mut self, path: &str, handler: impl Handler) -> &mut Self {
        self.add_route(Method::Post, path, handler)
    }

    fn put(&mut self, path: &str, handler: impl Handler) -> &mut Self {
        self.add_route(Method::Put, path, handler)
    }

    fn patch(&mut self, path: &str, handler: impl Handler) -> &mut Self {
        self.add_route(Method::Patch, path, handler)
    }

    fn delete(&mut self, path: &str, handler: impl Handler) -> &mut Self {
        self.add_route(Method::Delete, path, handler)
    }

    /// Opens a fluent scope for several methods under one base path.
    fn route(&mut self, base_path: &str) -> RouteBuilder<'_, Self> {
        RouteBuilder::new(base_path, self)
    }
}

/// A route that has been declared but not yet bound.
pub struct DeclaredRoute {
    method: Method,
    path: String,
    handler: BoxedHandler,
}

impl DeclaredRoute {
    pub fn method(&self) -> Method { self.method }

    /// Path relative to the registry prefix.
    pub fn path(&self) -> &str { &self.path }
}

/// A route that has been registered on the mount target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundRoute {
    method: Method,
    path: String,
}

impl BoundRoute {
    pub fn method(&self) -> Method { self.method }

    /// Fully resolved path, prefix included.
    pub fn path(&self) -> &str { &self.path }
}

/// Collection phase: buffers declared routes until a target exists.
pub struct RouteRegistry {
    prefix: String,
    declared: Vec<DeclaredRoute>,
    sink: Arc<dyn CompletionSink>,
}

impl RouteRegistry {
    /// Registry whose routes all resolve under `prefix` (`"api"` and `"/api/"`
    /// both become `/api`). Completion records go to [`TracingSink`].
    pub fn new(prefix: &str) -> Self {
        Self::with_sink(prefix, Arc::new(TracingSink))
    }

    pub fn with_sink(prefix: &str, sink: Arc<dyn CompletionSink>) -> Self {
        Self { prefix: normalize_prefix(prefix), declared: Vec::new(), sink }
    }

    pub fn prefix(&self) -> &str { &self.prefix }

    /// Declared routes, in insertion order.
    pub fn entries(&self) -> &[DeclaredRoute] { &self.declared }

    /// Binds every declared route on `target`, in insertion order, and
    /// switches to immediate binding for anything registered afterwards.
    pub fn mount<T: MountTarget>(self, target: T) -> MountedRegistry<T> {
        let mut mounted = MountedRegistry {
            prefix: self.prefix,
            bound: Vec::with_capacity(self.declared.len()),
            sink: self.sink,
            target,
        };
        for route in self.declared {
            mounted.bind(route);
        }
        info!(prefix = %mounted.prefix, routes = mounted.bound.len(), "routes mounted");
        mounted
    }
}

impl Routes for RouteRegistry {
    fn add_route(&mut self, method: Method, path: &str, handler: impl Handler) -> &mut Self {
        if self.declared.iter().any(|r| r.method == method && r.path == path) {
            warn!(%method, path = %resolve(&self.prefix, path), "duplicate route declared; first registration wins");
        }
        debug!(%method, path, "route declared");
        self.declared.push(DeclaredRoute {
            method,
            path: path.to_owned(),
            handler: handler.into_boxed_handler(),
        });
        self
    }
}

/// Bind phase: owns the mount target and binds registrations immediately.
pub struct MountedRegistry<T> {
    prefix: String,
    bound: Vec<BoundRoute>,
    sink: Arc<dyn CompletionSink>,
    target: T,
}

impl<T: MountTarget> MountedRegistry<T> {
    pub fn prefix(&self) -> &str { &self.prefix }

    /// Bound routes, in binding order.
    pub fn entries(&self) -> &[BoundRoute] { &self.bound }

    pub fn target(&self) -> &T { &self.target }

    /// Releases the target, e.g. to hand the router to the server.
    pub fn into_target(self) -> T { self.target }

    fn bind(&mut self, route: DeclaredRoute) {
        let path = resolve(&self.prefix, &route.path);
        let handler = trace::instrument(route.handler, route.method, &path, Arc::clone(&self.sink));
        self.target.register(route.method, &path, handler);
        debug!(method = %route.method, path = %path, "route bound");
        self.bound.push(BoundRoute { method: route.method, path });
    }
}

impl<T: MountTarget> Routes for MountedRegistry<T> {
    fn add_route(&mut self, method: Method, path: &str, handler: impl Handler) -> &mut Self {
        let resolved = resolve(&self.prefix, path);
        if self.bound.iter().any(|r| r.method == method && r.path == resolved) {
            warn!(%method, path = %resolved, "duplicate route declared; first registration wins");
        }
        self.bind(DeclaredRoute {
            method,
            path: path.to_owned(),
            handler: handler.into_boxed_handler(),
        });
        self
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

fn resolve(prefix: &str, path: &str) -> String {
    format!("{prefix}{path}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;

    #[derive(Default)]
    struct Recorder(Vec<(Method, String)>);

    impl MountTarget for Recorder {
        fn register(&mut self, method: Method, path: &str, _handler: BoxedHandler) {
            self.0.push((method, path.to_owned()));
        }
    }

    async fn h(_req: Request) -> &'static str { "" }

    #[test]
    fn normalizes_prefix() {
        assert_eq!(RouteRegistry::new("api").prefix(), "/api");
        assert_eq!(RouteRegistry::new("/api/").prefix(), "/api");
        assert_eq!(RouteRegistry::new("/v1/api").prefix(), "/v1/api");
        assert_eq!(RouteRegistry::new("").prefix(), "");
        assert_eq!(RouteRegistry::new("/").prefix(), "");
    }

    #[test]
    fn declared_routes_wait_for_mount() {
        let mut registry = RouteRegistry::new("api");
        registry.get("/users", h).post("/users", h);

        assert_eq!(registry.entries().len(), 2);
        assert_eq!(registry.entries()[0].method(), Method::Get);
        assert_eq!(registry.entries()[1].path(), "/users");
    }

    #[test]
    fn mount_binds_in_insertion_order_exactly_once() {
        let mut registry = RouteRegistry::new("api");
        registry
            .delete("/users/:id", h)
            .get("/users", h)
            .put("/users/:id", h)
            .patch("/users/:id", h);

        let mounted = registry.mount(Recorder::default());

        assert_eq!(mounted.target().0, vec![
            (Method::Delete, "/api/users/:id".to_owned()),
            (Method::Get, "/api/users".to_owned()),
            (Method::Put, "/api/users/:id".to_owned()),
            (Method::Patch, "/api/users/:id".to_owned()),
        ]);
        assert_eq!(mounted.entries().len(), 4);
    }

    #[test]
    fn registration_after_mount_binds_immediately() {
        let mut registry = RouteRegistry::new("api");
        registry.get("/users", h);
        let mut mounted = registry.mount(Recorder::default());
        assert_eq!(mounted.target().0.len(), 1);

        mounted.post("/users", h);

        assert_eq!(mounted.target().0.len(), 2);
        assert_eq!(mounted.target().0[1], (Method::Post, "/api/users".to_owned()));
        assert_eq!(mounted.entries()[1].path(), "/api/users");
    }

    #[test]
    fn duplicates_are_passed_through_in_order() {
        let mut registry = RouteRegistry::new("api");
        registry.get("/users", h).get("/users", h);
        let mut mounted = registry.mount(Recorder::default());
        mounted.get("/users", h);

        assert_eq!(mounted.target().0.len(), 3);
        assert!(mounted.target().0.iter().all(|(m, p)| *m == Method::Get && p == "/api/users"));
    }

    #[test]
    fn empty_registry_mounts_nothing() {
        let mounted = RouteRegistry::new("api").mount(Recorder::default());
        assert!(mounted.target().0.is_empty());
        assert!(mounted.entries().is_empty());
    }
}
