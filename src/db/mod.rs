//! Document-store connection lifecycle.
//!
//! # Data Flow
//! ```text
//! ConnectionConfig (resolved once at boot)
//!     → ConnectionManager::connect()
//!         cached? → ping → reuse handle
//!         else    → resolve target → ConnectOptions → Transport::open
//!     → Arc<Database> handed to data-access code
//! ```
//!
//! # Design Decisions
//! - One manager per process, constructed by bootstrap and shared via `Arc`
//! - Transport and database handles live and die together
//! - Reuse pings run unlocked; opens are serialized so racing callers share one
//! - Pool tuned for bursty, short-lived workloads (min pool 0)

mod config;
mod manager;
mod transport;

#[cfg(feature = "mongodb")]
pub mod mongo;

pub use config::{ConnectOptions, ConnectionConfig, ConnectionTarget, Credentials, DEFAULT_PORT};
pub use manager::{ConnectionManager, ConnectionState, DbError};
pub use transport::{FailureKind, Transport, TransportClient, TransportError};
