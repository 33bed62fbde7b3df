//! Handler trait and type erasure.
//!
//! Routes of different handler types share one table, so every handler is
//! erased behind [`ErasedHandler`] once, at declaration time:
//!
//! ```text
//! async fn get_users(req: Request) -> Response { … }   ← module writes this
//!        ↓ registry.get("/users", get_users)
//! get_users.into_boxed_handler()                       ← Handler blanket impl
//!        ↓ Arc<dyn ErasedHandler>                      ← DeclaredRoute
//! middleware::trace::instrument(handler, …)            ← at bind time
//!        ↓ Arc<dyn ErasedHandler>                      ← stored by the Router
//! handler.call(req)                                    ← per request
//! ```
//!
//! Per request that is one `Arc` clone and two virtual calls.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Erased types ──────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// Boxed because every handler's future has a different type; pinned because
/// the runtime polls it in place once started. `Send + 'static` lets tokio
/// move it between worker threads.
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Object-safe dispatch interface shared by user handlers and wrappers.
///
/// Public (but hidden) so [`middleware::trace`](crate::middleware::trace) and
/// the [`Handler`] return type can name it.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
///
/// This is what a [`MountTarget`](crate::MountTarget) receives at bind time.
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is satisfied for any function or
/// closure shaped like:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// The trait is sealed so only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

// Private, so nothing outside this crate can name `Sealed`.
mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Bridges a concrete handler `F` into the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        // Run the handler to get its concrete future, then box it together
        // with the `IntoResponse` conversion so every handler returns the
        // same `BoxFuture`.
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}
