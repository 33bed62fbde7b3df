//! Service entry point.
//!
//! Run with:
//!   DATABASE_HOST=localhost DATABASE_NAME=app cargo run
//!
//! Try:
//!   curl http://localhost:3000/api/
//!   curl http://localhost:3000/healthz
//!   curl http://localhost:3000/readyz

use std::process::ExitCode;
use std::sync::Arc;

use keel::db::mongo::MongoTransport;
use keel::db::ConnectionManager;
use keel::{health, logging, AppConfig, Request, Response, RouteRegistry, Router, Routes, Server};
use serde_json::json;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            logging::init("info", false);
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    logging::init(&config.log_level, config.is_production);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "startup failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), keel::Error> {
    let db = Arc::new(ConnectionManager::new(MongoTransport, config.database.clone()));
    db.connect().await?;

    let mut registry = RouteRegistry::new(&config.api_prefix);
    registry.get("/", hello);

    let mounted = registry.mount(Router::new());
    // Probes live outside the API prefix.
    let mut probes = RouteRegistry::new("");
    probes
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness(Arc::clone(&db)));
    let router = probes.mount(mounted.into_target()).into_target();
    info!("Registered {} route(s)", router.len());

    let served = Server::bind(config.listen_addr()).serve(router).await;
    db.disconnect().await;
    served
}

async fn hello(_req: Request) -> Response {
    Response::json(json!({ "message": "Hello World" }).to_string().into_bytes())
}
