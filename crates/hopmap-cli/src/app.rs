//! The application controller.
//!
//! Owns all mutable state — the committed collection, the transient
//! found-set, in-flight health-check markers and the search fence — and
//! exposes the pure reconciliation operations as its only mutation surface.
//! Each action reads the current collections, computes replacement values
//! and swaps them in one step; the store and discovery calls are the only
//! await points.

use std::collections::HashSet;
use std::path::Path;

use chrono::Local;
use uuid::Uuid;

use hopmap_core::reconcile::{
    apply_edit, discard, health_update, merge_imported, promote, stage_discovered,
};
use hopmap_core::{AliveStatus, CoreError, Venue, VenuePatch};
use hopmap_discovery::{DiscoveryClient, DiscoveryReply};
use hopmap_kml::{parse_kml, write_kml, KmlError};
use hopmap_store::VenueStore;

/// What a search attempt produced.
#[derive(Debug)]
pub enum SearchOutcome {
    /// Candidates were staged into the found-set.
    Staged {
        summary: String,
        staged: usize,
        sources: Vec<String>,
    },
    /// The gateway failed; nothing was staged.
    Failed { advisory: String },
    /// The reply belonged to a superseded search and was discarded.
    Stale,
}

/// What a health check produced.
#[derive(Debug)]
pub enum CheckOutcome {
    Updated {
        status: AliveStatus,
        reason: Option<String>,
    },
    /// A check for this id is already in flight.
    AlreadyRunning,
    NotFound,
    /// The gateway failed; the record was left untouched.
    Failed { advisory: String },
}

pub struct App<S: VenueStore> {
    store: S,
    discovery: Option<DiscoveryClient>,
    committed: Vec<Venue>,
    found: Vec<Venue>,
    checks_in_flight: HashSet<Uuid>,
    /// Monotonic search ticket; only a reply carrying the newest ticket may
    /// replace the found-set.
    search_seq: u64,
    last_summary: Option<String>,
}

impl<S: VenueStore> App<S> {
    #[must_use]
    pub fn new(store: S, discovery: Option<DiscoveryClient>) -> Self {
        Self {
            store,
            discovery,
            committed: Vec::new(),
            found: Vec::new(),
            checks_in_flight: HashSet::new(),
            search_seq: 0,
            last_summary: None,
        }
    }

    #[must_use]
    pub fn committed(&self) -> &[Venue] {
        &self.committed
    }

    #[must_use]
    pub fn found(&self) -> &[Venue] {
        &self.found
    }

    #[must_use]
    pub fn last_summary(&self) -> Option<&str> {
        self.last_summary.as_deref()
    }

    /// Loads the committed collection from the store, then silently merges
    /// the default KML resource. Neither step is fatal: a load failure
    /// starts empty, a missing or unparseable bootstrap file leaves the
    /// collection as loaded.
    pub async fn bootstrap(&mut self, bootstrap_kml: &Path) {
        self.committed = match self.store.load().await {
            Ok(venues) => venues,
            Err(e) => {
                tracing::warn!(error = %e, "could not load persisted venues; starting empty");
                Vec::new()
            }
        };

        match tokio::fs::read_to_string(bootstrap_kml).await {
            Ok(text) => match parse_kml(&text) {
                Ok(incoming) => {
                    let (merged, added) = merge_imported(&self.committed, incoming);
                    if added > 0 {
                        self.committed = merged;
                        self.persist().await;
                        tracing::info!(added, "bootstrap import merged new venues");
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "bootstrap KML did not parse; skipping");
                }
            },
            Err(e) => {
                tracing::debug!(
                    path = %bootstrap_kml.display(),
                    error = %e,
                    "no bootstrap KML; skipping"
                );
            }
        }
    }

    /// Imports a KML document into the committed collection and returns how
    /// many records were added (name collisions are dropped silently).
    ///
    /// # Errors
    ///
    /// Returns [`KmlError`] when the document itself is malformed XML;
    /// individually invalid placemarks are skipped by the codec instead.
    pub async fn import_kml(&mut self, text: &str) -> Result<usize, KmlError> {
        let incoming = parse_kml(text)?;
        let (merged, added) = merge_imported(&self.committed, incoming);
        if added > 0 {
            self.committed = merged;
            self.persist().await;
        }
        Ok(added)
    }

    /// Serializes the committed collection. The filename encodes the record
    /// count and the current date.
    #[must_use]
    pub fn export_kml(&self) -> (String, String) {
        let filename = format!(
            "venues_{}_{}.kml",
            self.committed.len(),
            Local::now().format("%Y-%m-%d")
        );
        (filename, write_kml(&self.committed))
    }

    /// Adds a venue to the committed collection. Returns `false` when its
    /// name collides with an existing record.
    pub async fn add_venue(&mut self, venue: Venue) -> bool {
        let (merged, added) = merge_imported(&self.committed, vec![venue]);
        if added > 0 {
            self.committed = merged;
            self.persist().await;
            true
        } else {
            false
        }
    }

    /// Permanently removes a committed venue. Returns `false` when the id
    /// is unknown.
    pub async fn delete_venue(&mut self, id: Uuid) -> bool {
        let before = self.committed.len();
        self.committed.retain(|v| v.id != id);
        if self.committed.len() < before {
            self.persist().await;
            true
        } else {
            false
        }
    }

    /// Applies a patch to whichever collection currently holds `id`. A
    /// rejected edit leaves both collections untouched.
    ///
    /// # Errors
    ///
    /// Propagates [`CoreError::EditRejected`] / [`CoreError::UnknownId`]
    /// from the reconciliation engine.
    pub async fn edit_venue(&mut self, id: Uuid, patch: VenuePatch) -> Result<(), CoreError> {
        if self.committed.iter().any(|v| v.id == id) {
            self.committed = apply_edit(&self.committed, id, patch)?;
            self.persist().await;
            Ok(())
        } else if self.found.iter().any(|v| v.id == id) {
            // The found-set is transient and never persisted.
            self.found = apply_edit(&self.found, id, patch)?;
            Ok(())
        } else {
            Err(CoreError::UnknownId(id))
        }
    }

    /// Moves a staged find into the committed collection. Returns `false`
    /// when the id is not staged.
    pub async fn promote(&mut self, id: Uuid) -> bool {
        let before = self.committed.len();
        let (committed, found) = promote(
            std::mem::take(&mut self.committed),
            std::mem::take(&mut self.found),
            id,
        );
        self.committed = committed;
        self.found = found;
        if self.committed.len() > before {
            self.persist().await;
            true
        } else {
            false
        }
    }

    /// Drops a staged find without a trace. Returns `false` when the id is
    /// not staged.
    pub fn discard_found(&mut self, id: Uuid) -> bool {
        let before = self.found.len();
        self.found = discard(std::mem::take(&mut self.found), id);
        self.found.len() < before
    }

    /// Runs a discovery search and stages the surviving candidates as the
    /// new found-set. A gateway failure stages nothing and reports an
    /// advisory; a reply from a superseded search is discarded.
    pub async fn search(&mut self, query: &str, origin: Option<(f64, f64)>) -> SearchOutcome {
        let ticket = self.begin_search();
        let Some(client) = self.discovery.as_ref() else {
            return SearchOutcome::Failed {
                advisory: "discovery is not configured (set HOPMAP_DISCOVERY_URL)".to_string(),
            };
        };

        let result = client.search(query, origin).await;
        match result {
            Ok(reply) => self.apply_search_reply(ticket, reply),
            Err(e) => {
                tracing::warn!(error = %e, "discovery search failed");
                SearchOutcome::Failed {
                    advisory: format!("search failed: {e}"),
                }
            }
        }
    }

    /// Checks whether a committed venue still operates and records the
    /// result. Re-entry for an id already being checked is refused; checks
    /// for different ids may overlap freely since each writes only its own
    /// record.
    pub async fn check_health(&mut self, id: Uuid) -> CheckOutcome {
        let Some(name) = self
            .committed
            .iter()
            .find(|v| v.id == id)
            .map(|v| v.name.clone())
        else {
            return CheckOutcome::NotFound;
        };
        if self.checks_in_flight.contains(&id) {
            return CheckOutcome::AlreadyRunning;
        }
        let Some(client) = self.discovery.as_ref() else {
            return CheckOutcome::Failed {
                advisory: "discovery is not configured (set HOPMAP_DISCOVERY_URL)".to_string(),
            };
        };
        self.checks_in_flight.insert(id);

        let result = client.check_health(&name).await;
        self.checks_in_flight.remove(&id);

        match result {
            Ok(report) => {
                self.committed =
                    health_update(&self.committed, id, report.status, report.checked_at);
                self.persist().await;
                CheckOutcome::Updated {
                    status: report.status,
                    reason: report.reason,
                }
            }
            Err(e) => {
                tracing::warn!(venue = %name, error = %e, "health check failed");
                CheckOutcome::Failed {
                    advisory: format!("health check failed: {e}; status remains unknown"),
                }
            }
        }
    }

    /// Takes the next search ticket. Issuing a newer ticket fences out every
    /// reply still in flight for older ones.
    fn begin_search(&mut self) -> u64 {
        self.search_seq += 1;
        self.search_seq
    }

    /// Applies a search reply if its ticket is still the newest.
    fn apply_search_reply(&mut self, ticket: u64, reply: DiscoveryReply) -> SearchOutcome {
        if ticket != self.search_seq {
            tracing::debug!(
                ticket,
                newest = self.search_seq,
                "discarding reply from a superseded search"
            );
            return SearchOutcome::Stale;
        }

        self.found = stage_discovered(&self.committed, reply.candidates);
        self.last_summary = Some(reply.summary.clone());
        SearchOutcome::Staged {
            summary: reply.summary,
            staged: self.found.len(),
            sources: reply.sources,
        }
    }

    /// Fire-and-forget persistence after every committed-collection change;
    /// a failed save is an advisory, never an abort.
    async fn persist(&self) {
        if let Err(e) = self.store.save(&self.committed).await {
            tracing::warn!(error = %e, "failed to persist venues; continuing with in-memory state");
        }
    }
}
