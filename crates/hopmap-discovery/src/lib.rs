//! HTTP client for the venue discovery service.
//!
//! The service is an opaque generative-AI capability with two operations:
//! free-text venue search and a per-venue health check. Its replies are
//! untrusted input — this crate validates and coerces them into typed
//! [`hopmap_core::Venue`] candidates so the payload shape never leaks
//! further into the application.

pub mod client;
mod coerce;
pub mod error;
mod retry;
pub mod types;

pub use client::DiscoveryClient;
pub use error::DiscoveryError;
pub use types::{DiscoveryReply, HealthReport};
