//! Typed results of discovery operations, plus the raw wire shapes.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use hopmap_core::{AliveStatus, Venue};

/// The validated outcome of a search: a human-readable summary, the venue
/// candidates that survived coercion, and the service's source citations.
#[derive(Debug, Clone)]
pub struct DiscoveryReply {
    pub summary: String,
    pub candidates: Vec<Venue>,
    pub sources: Vec<String>,
}

/// The outcome of a health check. `checked_at` is stamped when the check
/// completes, never earlier.
#[derive(Debug, Clone)]
pub struct HealthReport {
    pub status: AliveStatus,
    pub reason: Option<String>,
    pub checked_at: DateTime<Utc>,
}

/// Expected shape of a search reply. The service is free-text-first, so any
/// 2xx body that does not parse as this is treated as a summary-only reply,
/// not an error.
#[derive(Debug, Deserialize)]
pub(crate) struct RawSearchReply {
    pub(crate) message: String,
    #[serde(default)]
    pub(crate) breweries: Vec<serde_json::Value>,
    #[serde(default)]
    pub(crate) sources: Vec<String>,
}

/// Expected shape of a health-check reply.
#[derive(Debug, Deserialize)]
pub(crate) struct RawHealthReply {
    pub(crate) status: String,
    #[serde(default)]
    pub(crate) reason: Option<String>,
}
