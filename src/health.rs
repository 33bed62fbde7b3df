//! Built-in Kubernetes health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the database be reached? Failure → pulled from load-balancer. |
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use keel::db::{ConnectionConfig, ConnectionManager, mongo::MongoTransport};
//! use keel::{health, RouteRegistry, Routes};
//!
//! let db = Arc::new(ConnectionManager::new(MongoTransport, ConnectionConfig::default()));
//! let mut registry = RouteRegistry::new("");
//! registry
//!     .get("/healthz", health::liveness)
//!     .get("/readyz", health::readiness(db));
//! ```

use std::sync::Arc;

use http::StatusCode;
use tracing::warn;

use crate::db::{ConnectionManager, Transport};
use crate::handler::Handler;
use crate::{Request, Response};

/// Liveness probe. Always `200 OK` with body `"ok"`: no dependencies.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// Readiness probe gated on the database.
///
/// Goes through [`ConnectionManager::connect`], so a probe against a dropped
/// connection also heals it. `503` while the database is unreachable.
pub fn readiness<T: Transport>(db: Arc<ConnectionManager<T>>) -> impl Handler {
    move |_req: Request| {
        let db = Arc::clone(&db);
        async move {
            match db.connect().await {
                Ok(_) => Response::text("ready"),
                Err(e) => {
                    warn!(error = %e, "readiness check failed");
                    Response::status(StatusCode::SERVICE_UNAVAILABLE)
                }
            }
        }
    }
}
