//! Reconciliation of venue collections.
//!
//! Two collections share one identity space: the committed collection
//! (persisted) and the found-set (transient, pending user acceptance).
//! Every operation here is a pure function over collection values — no
//! mutation in place, no I/O — so each user action reads the current state,
//! computes a replacement, and swaps it in one step.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::venue::{name_key, AliveStatus, Venue, VenuePatch};
use crate::CoreError;

/// Appends every `incoming` record whose name (case-insensitive) does not
/// already appear in `existing`. Colliding records are dropped silently;
/// only the aggregate count of added records is reported.
///
/// Duplicate names *within* `incoming` collapse to the first occurrence.
#[must_use]
pub fn merge_imported(existing: &[Venue], incoming: Vec<Venue>) -> (Vec<Venue>, usize) {
    let mut seen: HashSet<String> = existing.iter().map(|v| name_key(&v.name)).collect();
    let mut merged = existing.to_vec();
    let mut added = 0usize;

    for venue in incoming {
        if seen.insert(name_key(&venue.name)) {
            merged.push(venue);
            added += 1;
        }
    }

    (merged, added)
}

/// Filters `incoming` by the same name-collision rule as [`merge_imported`],
/// but the survivors become the new found-set instead of being appended to
/// `existing`. The result replaces any prior found-set outright; staged
/// records do not accumulate across searches.
#[must_use]
pub fn stage_discovered(existing: &[Venue], incoming: Vec<Venue>) -> Vec<Venue> {
    let mut seen: HashSet<String> = existing.iter().map(|v| name_key(&v.name)).collect();
    incoming
        .into_iter()
        .filter(|venue| seen.insert(name_key(&venue.name)))
        .collect()
}

/// Moves the record with matching `id` out of `staged` and appends it to
/// `existing`. A no-op returning both inputs unchanged when `staged` has no
/// such record, so promoting the same id twice is harmless.
#[must_use]
pub fn promote(
    existing: Vec<Venue>,
    staged: Vec<Venue>,
    id: Uuid,
) -> (Vec<Venue>, Vec<Venue>) {
    let Some(pos) = staged.iter().position(|v| v.id == id) else {
        return (existing, staged);
    };

    let mut staged = staged;
    let venue = staged.remove(pos);
    let mut existing = existing;
    existing.push(venue);
    (existing, staged)
}

/// Removes the record with matching `id` from `staged`; a no-op when absent.
#[must_use]
pub fn discard(staged: Vec<Venue>, id: Uuid) -> Vec<Venue> {
    staged.into_iter().filter(|v| v.id != id).collect()
}

/// Replaces the record whose `id` matches with the result of overlaying
/// `patch` onto it. The *resulting* record must still carry a non-blank name
/// and finite coordinates; otherwise the edit is rejected and the collection
/// is returned unchanged (the caller keeps its original value). Behaves
/// identically against the committed collection and the found-set.
///
/// # Errors
///
/// - [`CoreError::UnknownId`] when no record carries `id`.
/// - [`CoreError::EditRejected`] when the patched record fails validation.
pub fn apply_edit(
    collection: &[Venue],
    id: Uuid,
    patch: VenuePatch,
) -> Result<Vec<Venue>, CoreError> {
    let Some(pos) = collection.iter().position(|v| v.id == id) else {
        return Err(CoreError::UnknownId(id));
    };

    let mut updated = collection[pos].clone();
    if let Some(name) = patch.name {
        updated.name = name;
    }
    if let Some(description) = patch.description {
        updated.description = description;
    }
    if let Some(category) = patch.category {
        updated.category = category;
    }
    if let Some(coordinates) = patch.coordinates {
        updated.coordinates = coordinates;
    }
    if let Some(address) = patch.address {
        updated.address = Some(address);
    }
    if let Some(website) = patch.website {
        updated.website = Some(website);
    }
    if let Some(maps_uri) = patch.maps_uri {
        updated.maps_uri = Some(maps_uri);
    }

    if updated.name.trim().is_empty() {
        return Err(CoreError::EditRejected {
            id,
            reason: "name must not be blank".to_string(),
        });
    }
    if !updated.coordinates.latitude.is_finite() || !updated.coordinates.longitude.is_finite() {
        return Err(CoreError::EditRejected {
            id,
            reason: "coordinates must be finite".to_string(),
        });
    }

    let mut result = collection.to_vec();
    result[pos] = updated;
    Ok(result)
}

/// Updates only `alive_status` and `last_checked_at` on the matching record;
/// every other field is untouched. A no-op when `id` is absent.
#[must_use]
pub fn health_update(
    collection: &[Venue],
    id: Uuid,
    status: AliveStatus,
    checked_at: DateTime<Utc>,
) -> Vec<Venue> {
    collection
        .iter()
        .map(|v| {
            if v.id == id {
                let mut updated = v.clone();
                updated.alive_status = status;
                updated.last_checked_at = Some(checked_at);
                updated
            } else {
                v.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::venue::{Category, Coordinates};

    fn venue(name: &str) -> Venue {
        Venue::new(name, Coordinates::new(40.4, -3.7).unwrap())
    }

    // -----------------------------------------------------------------------
    // merge_imported
    // -----------------------------------------------------------------------

    #[test]
    fn merge_appends_new_names_only() {
        let existing = vec![venue("Row 44")];
        let incoming = vec![venue("ROW 44"), venue("New Place")];

        let (merged, added) = merge_imported(&existing, incoming);

        assert_eq!(added, 1, "case difference alone is a collision");
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name, "Row 44");
        assert_eq!(merged[1].name, "New Place");
    }

    #[test]
    fn merge_into_itself_adds_nothing() {
        let existing = vec![venue("A"), venue("B")];
        let (seeded, _) = merge_imported(&[], existing.clone());
        let (merged, added) = merge_imported(&existing, seeded);

        assert_eq!(added, 0);
        assert_eq!(merged.len(), existing.len());
    }

    #[test]
    fn merge_collapses_duplicates_within_incoming() {
        let incoming = vec![venue("Same"), venue("same "), venue("Other")];
        let (merged, added) = merge_imported(&[], incoming);

        assert_eq!(added, 2);
        assert_eq!(merged[0].name, "Same", "first occurrence wins");
        assert_eq!(merged[1].name, "Other");
    }

    // -----------------------------------------------------------------------
    // stage_discovered
    // -----------------------------------------------------------------------

    #[test]
    fn stage_filters_collisions_without_touching_existing() {
        let existing = vec![venue("Known Bar")];
        let staged = stage_discovered(&existing, vec![venue("known bar"), venue("Fresh Find")]);

        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].name, "Fresh Find");
    }

    #[test]
    fn stage_replaces_rather_than_accumulates() {
        let existing: Vec<Venue> = vec![];
        let first = stage_discovered(&existing, vec![venue("First Wave")]);
        let second = stage_discovered(&existing, vec![venue("Second Wave")]);

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].name, "Second Wave");
    }

    // -----------------------------------------------------------------------
    // promote / discard
    // -----------------------------------------------------------------------

    #[test]
    fn promote_moves_record_exactly_once() {
        let target = venue("Target");
        let id = target.id;
        let existing = vec![venue("Already Here")];
        let staged = vec![target, venue("Left Behind")];

        let (existing, staged) = promote(existing, staged, id);

        assert_eq!(existing.iter().filter(|v| v.id == id).count(), 1);
        assert_eq!(staged.iter().filter(|v| v.id == id).count(), 0);
        assert_eq!(staged.len(), 1);

        // Promoting the same id again is a no-op.
        let (existing2, staged2) = promote(existing.clone(), staged.clone(), id);
        assert_eq!(existing2, existing);
        assert_eq!(staged2, staged);
    }

    #[test]
    fn discard_removes_without_trace_and_is_idempotent() {
        let target = venue("Doomed");
        let id = target.id;
        let staged = vec![target, venue("Survivor")];

        let staged = discard(staged, id);
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].name, "Survivor");

        let staged = discard(staged, id);
        assert_eq!(staged.len(), 1);
    }

    // -----------------------------------------------------------------------
    // apply_edit
    // -----------------------------------------------------------------------

    #[test]
    fn edit_with_blank_name_is_rejected_unchanged() {
        let original = vec![venue("Keeper")];
        let id = original[0].id;

        let patch = VenuePatch {
            name: Some(String::new()),
            ..VenuePatch::default()
        };
        let err = apply_edit(&original, id, patch).unwrap_err();

        assert!(matches!(err, CoreError::EditRejected { .. }));
        assert_eq!(original[0].name, "Keeper");
    }

    #[test]
    fn edit_address_only_changes_only_address() {
        let original = vec![venue("Stable")];
        let id = original[0].id;

        let patch = VenuePatch {
            address: Some("New Rd".to_string()),
            ..VenuePatch::default()
        };
        let edited = apply_edit(&original, id, patch).unwrap();

        assert_eq!(edited[0].address.as_deref(), Some("New Rd"));
        assert_eq!(edited[0].name, original[0].name);
        assert_eq!(edited[0].coordinates, original[0].coordinates);
        assert_eq!(edited[0].category, original[0].category);
        assert_eq!(edited[0].id, original[0].id);
    }

    #[test]
    fn edit_unknown_id_is_an_error() {
        let original = vec![venue("Only One")];
        let err = apply_edit(&original, Uuid::new_v4(), VenuePatch::default()).unwrap_err();
        assert!(matches!(err, CoreError::UnknownId(_)));
    }

    #[test]
    fn edit_overlays_all_present_fields() {
        let original = vec![venue("Before")];
        let id = original[0].id;

        let patch = VenuePatch {
            name: Some("After".to_string()),
            description: Some("Updated".to_string()),
            category: Some(Category::Gold),
            coordinates: Some(Coordinates::new(41.0, -4.0).unwrap()),
            address: None,
            website: Some("https://example.com".to_string()),
            maps_uri: None,
        };
        let edited = apply_edit(&original, id, patch).unwrap();

        assert_eq!(edited[0].name, "After");
        assert_eq!(edited[0].description, "Updated");
        assert_eq!(edited[0].category, Category::Gold);
        assert!((edited[0].coordinates.latitude - 41.0).abs() < 1e-9);
        assert_eq!(edited[0].website.as_deref(), Some("https://example.com"));
        assert!(edited[0].address.is_none(), "omitted field left untouched");
    }

    // -----------------------------------------------------------------------
    // health_update
    // -----------------------------------------------------------------------

    #[test]
    fn health_update_touches_only_status_fields() {
        let original = vec![venue("Checked"), venue("Unchecked")];
        let id = original[0].id;
        let checked_at = Utc::now();

        let updated = health_update(&original, id, AliveStatus::Inactive, checked_at);

        assert_eq!(updated[0].alive_status, AliveStatus::Inactive);
        assert_eq!(updated[0].last_checked_at, Some(checked_at));
        assert_eq!(updated[0].name, original[0].name);
        assert_eq!(updated[1], original[1], "other records untouched");
    }

    #[test]
    fn health_update_with_unknown_id_is_a_noop() {
        let original = vec![venue("Lone")];
        let updated = health_update(&original, Uuid::new_v4(), AliveStatus::Active, Utc::now());
        assert_eq!(updated, original);
    }
}
