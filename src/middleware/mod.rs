//! Middleware layer.
//!
//! Wrappers that sit between the router and a bound handler. They see every
//! request and every final status but never alter either.
//!
//! - [`trace`]: per-route completion record with method, path, status, latency

pub mod trace;
