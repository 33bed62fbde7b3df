mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use common::{host_config, FakeTransport};
use http::StatusCode;
use keel::db::ConnectionManager;
use keel::middleware::trace::{Completion, CompletionSink};
use keel::{health, Method, Request, Response, RouteRegistry, Router, Routes};

fn collector() -> (Arc<Mutex<Vec<Completion>>>, Arc<dyn CompletionSink>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = Arc::clone(&seen);
    let sink: Arc<dyn CompletionSink> =
        Arc::new(move |c: &Completion| sink_seen.lock().unwrap().push(c.clone()));
    (seen, sink)
}

fn request(method: http::Method, uri: &str) -> http::Request<Bytes> {
    http::Request::builder().method(method).uri(uri).body(Bytes::new()).unwrap()
}

async fn list_users(_req: Request) -> Response {
    Response::json(b"[]".to_vec())
}

async fn create_user(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }
    Response::builder().status(StatusCode::CREATED).json(req.body().to_vec())
}

async fn get_user(req: Request) -> String {
    req.param("id").unwrap_or("unknown").to_owned()
}

#[tokio::test]
async fn deferred_route_is_bound_once_under_prefix() {
    let mut registry = RouteRegistry::new("api");
    registry.add_route(Method::Get, "/users", list_users);

    let mounted = registry.mount(Router::new());

    assert_eq!(mounted.entries().len(), 1);
    assert_eq!(mounted.entries()[0].method(), Method::Get);
    assert_eq!(mounted.entries()[0].path(), "/api/users");
    let router = mounted.into_target();
    assert_eq!(router.len(), 1);
    assert!(router.contains(Method::Get, "/api/users"));
    assert!(!router.contains(Method::Get, "/users"));
}

#[tokio::test]
async fn builder_paths_compose_with_prefix() {
    let mut registry = RouteRegistry::new("/api");
    registry.route("/users").get(list_users).post(create_user).get_at("/:id", get_user);
    let router = registry.mount(Router::new()).into_target();

    let res = router.respond(request(http::Method::GET, "/api/users/42")).await;

    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.body(), b"42");
}

#[tokio::test]
async fn completion_records_carry_route_and_final_status() {
    let (seen, sink) = collector();
    let mut registry = RouteRegistry::with_sink("api", sink);
    registry.route("/users").post(create_user).get_at("/:id", get_user);
    let router = registry.mount(Router::new()).into_target();

    router.respond(request(http::Method::GET, "/api/users/7")).await;
    router.respond(request(http::Method::POST, "/api/users")).await;
    let created = http::Request::post("/api/users").body(Bytes::from_static(b"{}")).unwrap();
    router.respond(created).await;

    let seen = seen.lock().unwrap();
    let summary: Vec<_> = seen.iter().map(|c| (c.method, &*c.path, c.status)).collect();
    assert_eq!(summary, vec![
        (Method::Get, "/api/users/:id", StatusCode::OK),
        (Method::Post, "/api/users", StatusCode::BAD_REQUEST),
        (Method::Post, "/api/users", StatusCode::CREATED),
    ]);
}

#[tokio::test]
async fn unrouted_requests_emit_no_completion() {
    let (seen, sink) = collector();
    let mut registry = RouteRegistry::with_sink("api", sink);
    registry.get("/users", list_users);
    let router = registry.mount(Router::new()).into_target();

    let res = router.respond(request(http::Method::GET, "/api/missing")).await;

    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn completion_times_the_whole_handler() {
    async fn slow(_req: Request) -> StatusCode {
        tokio::time::sleep(Duration::from_millis(30)).await;
        StatusCode::NO_CONTENT
    }

    let (seen, sink) = collector();
    let mut registry = RouteRegistry::with_sink("", sink);
    registry.delete("/jobs/:id", slow);
    let router = registry.mount(Router::new()).into_target();

    router.respond(request(http::Method::DELETE, "/jobs/1")).await;

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].status, StatusCode::NO_CONTENT);
    assert!(seen[0].duration_ms() >= 30);
}

#[tokio::test]
async fn routes_added_after_mount_are_live_immediately() {
    let mut registry = RouteRegistry::new("api");
    registry.get("/users", list_users);
    let mut mounted = registry.mount(Router::new());

    mounted.route("/users").delete_at("/:id", |_req: Request| async { StatusCode::NO_CONTENT });

    assert_eq!(mounted.entries().len(), 2);
    assert_eq!(mounted.target().len(), 2);
    let res = mounted.target().respond(request(http::Method::DELETE, "/api/users/3")).await;
    assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn duplicate_routes_keep_first_handler() {
    let mut registry = RouteRegistry::new("api");
    registry
        .get("/users", |_req: Request| async { "first" })
        .get("/users", |_req: Request| async { "second" });
    let mounted = registry.mount(Router::new());

    assert_eq!(mounted.entries().len(), 2);
    let res = mounted.target().respond(request(http::Method::GET, "/api/users")).await;
    assert_eq!(res.body(), b"first");
}

#[tokio::test]
async fn readiness_follows_the_database() {
    let transport = FakeTransport::default();
    let db = Arc::new(ConnectionManager::new(transport.clone(), host_config()));
    let mut registry = RouteRegistry::new("");
    registry
        .get("/healthz", health::liveness)
        .get("/readyz", health::readiness(Arc::clone(&db)));
    let router = registry.mount(Router::new()).into_target();

    let res = router.respond(request(http::Method::GET, "/readyz")).await;
    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(transport.state.opens(), 1);

    transport.state.fail_next_pings(1);
    transport.state.fail_opens_with(Some(keel::db::FailureKind::Timeout));
    let res = router.respond(request(http::Method::GET, "/readyz")).await;
    assert_eq!(res.status_code(), StatusCode::SERVICE_UNAVAILABLE);

    let res = router.respond(request(http::Method::GET, "/healthz")).await;
    assert_eq!(res.body(), b"ok");
}
