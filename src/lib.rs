//! # keel
//!
//! The orchestration layer between application modules and the two systems
//! every backend service leans on: the HTTP router and the document store.
//!
//! ## Routes
//!
//! Modules declare routes on a [`RouteRegistry`] whenever they are loaded,
//! before any router exists. Bootstrap mounts the registry once; from then on
//! registrations bind straight away. Every bound handler is wrapped so each
//! finished request emits one completion record (method, route, status,
//! latency).
//!
//! ## Database
//!
//! A [`ConnectionManager`](db::ConnectionManager) holds the one client
//! connection. `connect()` pings before reuse, reconnects when the ping
//! fails, and lets concurrent callers share a single connection attempt.
//!
//! ## Boot sequence
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use keel::db::{ConnectionManager, mongo::MongoTransport};
//! use keel::{AppConfig, Request, Response, RouteRegistry, Router, Routes, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), keel::Error> {
//!     let config = AppConfig::from_env()?;
//!     let db = Arc::new(ConnectionManager::new(MongoTransport, config.database.clone()));
//!     db.connect().await?;
//!
//!     let mut registry = RouteRegistry::new(&config.api_prefix);
//!     registry.route("/users").get(list_users).get_at("/:id", get_user);
//!
//!     let mounted = registry.mount(Router::new());
//!     Server::bind(config.listen_addr()).serve(mounted.into_target()).await?;
//!     db.disconnect().await;
//!     Ok(())
//! }
//!
//! async fn list_users(_req: Request) -> Response {
//!     Response::json(b"[]".to_vec())
//! }
//!
//! async fn get_user(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;

pub mod config;
pub mod db;
pub mod health;
pub mod logging;
pub mod middleware;
pub mod registry;

pub use config::AppConfig;
pub use error::Error;
pub use handler::{BoxedHandler, Handler};
pub use method::Method;
pub use registry::{BoundRoute, DeclaredRoute, MountTarget, MountedRegistry, RouteBuilder, RouteRegistry, Routes};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
