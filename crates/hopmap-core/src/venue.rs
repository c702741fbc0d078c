//! The venue domain entity and its category/status vocabularies.
//!
//! External sources (KML folder labels, discovery-service category hints)
//! carry free-text labels in English or Spanish; [`Category::from_label`] and
//! [`AliveStatus::from_label`] are the single normalization points for both.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

/// The closed five-tier category set, in fixed display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Mythic,
    Gold,
    Silver,
    Common,
    TapRoom,
}

impl Category {
    /// All categories in the fixed order used for KML folder grouping.
    pub const ORDERED: [Category; 5] = [
        Category::Mythic,
        Category::Gold,
        Category::Silver,
        Category::Common,
        Category::TapRoom,
    ];

    /// Human label used as the KML folder name.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Mythic => "Mythic",
            Category::Gold => "Gold",
            Category::Silver => "Silver",
            Category::Common => "Common",
            Category::TapRoom => "Tap Room",
        }
    }

    /// Maps an arbitrary free-text label to the closest category.
    ///
    /// Case-insensitive substring match against known synonyms per category
    /// (English and Spanish tier names), defaulting to [`Category::Common`]
    /// when nothing matches. Total and deterministic: any input produces
    /// exactly one category.
    #[must_use]
    pub fn from_label(label: &str) -> Category {
        let lower = label.to_lowercase();
        let matches_any = |synonyms: &[&str]| synonyms.iter().any(|s| lower.contains(s));

        if matches_any(&["mythic", "mítico", "mitico"]) {
            Category::Mythic
        } else if matches_any(&["gold", "oro"]) {
            Category::Gold
        } else if matches_any(&["silver", "plata"]) {
            Category::Silver
        } else if matches_any(&["tap", "room"]) {
            Category::TapRoom
        } else {
            Category::Common
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a venue is believed to still be operating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AliveStatus {
    Active,
    Inactive,
    #[default]
    Unknown,
}

impl AliveStatus {
    /// Parses a free-text status label. Total: unrecognized input is
    /// [`AliveStatus::Unknown`].
    ///
    /// Tokens are matched exactly (not by substring) so that `"inactive"`
    /// is never mistaken for `"active"`.
    #[must_use]
    pub fn from_label(label: &str) -> AliveStatus {
        match label.trim().to_lowercase().as_str() {
            "active" | "alive" | "true" | "yes" | "open" => AliveStatus::Active,
            "inactive" | "dead" | "closed" | "false" | "no" => AliveStatus::Inactive,
            _ => AliveStatus::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AliveStatus::Active => "active",
            AliveStatus::Inactive => "inactive",
            AliveStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for AliveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated (latitude, longitude) pair in decimal degrees.
///
/// Both axes are finite by construction; a venue with unparseable or
/// non-finite coordinates cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinates`] if either axis is NaN or
    /// infinite.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoreError> {
        if latitude.is_finite() && longitude.is_finite() {
            Ok(Coordinates {
                latitude,
                longitude,
            })
        } else {
            Err(CoreError::InvalidCoordinates {
                latitude,
                longitude,
            })
        }
    }
}

/// A craft-beer venue: a point of interest with location, category and
/// operating status. This is the persisted shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    /// Generated client-side on creation; immutable; never reused.
    pub id: Uuid,
    /// Display name; also the case-insensitive de-duplication key.
    pub name: String,
    /// Plain text. HTML sources are stripped before storage.
    pub description: String,
    pub category: Category,
    pub coordinates: Coordinates,
    pub address: Option<String>,
    pub website: Option<String>,
    pub maps_uri: Option<String>,
    pub alive_status: AliveStatus,
    /// Set only when a health check completes.
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl Venue {
    /// Creates a venue with a fresh id and all optional fields empty.
    #[must_use]
    pub fn new(name: impl Into<String>, coordinates: Coordinates) -> Venue {
        Venue {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            category: Category::Common,
            coordinates,
            address: None,
            website: None,
            maps_uri: None,
            alive_status: AliveStatus::Unknown,
            last_checked_at: None,
        }
    }
}

/// A partial update overlaid onto an existing [`Venue`] by
/// [`crate::reconcile::apply_edit`]. `None` fields are left untouched;
/// optional string fields can be set but not cleared.
#[derive(Debug, Clone, Default)]
pub struct VenuePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub coordinates: Option<Coordinates>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub maps_uri: Option<String>,
}

/// The de-duplication key for a venue name: trimmed and case-folded.
#[must_use]
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Category::from_label
    // -----------------------------------------------------------------------

    #[test]
    fn category_matches_english_tier_names() {
        assert_eq!(Category::from_label("Mythic"), Category::Mythic);
        assert_eq!(Category::from_label("gold"), Category::Gold);
        assert_eq!(Category::from_label("SILVER"), Category::Silver);
        assert_eq!(Category::from_label("Taproom"), Category::TapRoom);
    }

    #[test]
    fn category_matches_spanish_tier_names() {
        assert_eq!(Category::from_label("Lúpulo Mítico"), Category::Mythic);
        assert_eq!(Category::from_label("Lúpulo de Oro"), Category::Gold);
        assert_eq!(Category::from_label("Lúpulo de Plata"), Category::Silver);
    }

    #[test]
    fn category_matches_by_substring() {
        assert_eq!(Category::from_label("The Gold Standard"), Category::Gold);
        assert_eq!(Category::from_label("tap rooms of madrid"), Category::TapRoom);
    }

    #[test]
    fn category_defaults_to_common() {
        assert_eq!(Category::from_label(""), Category::Common);
        assert_eq!(Category::from_label("Misc venues"), Category::Common);
        assert_eq!(Category::from_label("común"), Category::Common);
    }

    #[test]
    fn category_ordered_covers_all_variants() {
        assert_eq!(Category::ORDERED.len(), 5);
        assert_eq!(Category::ORDERED[0], Category::Mythic);
        assert_eq!(Category::ORDERED[4], Category::TapRoom);
    }

    // -----------------------------------------------------------------------
    // AliveStatus::from_label
    // -----------------------------------------------------------------------

    #[test]
    fn status_parses_active_tokens() {
        assert_eq!(AliveStatus::from_label("active"), AliveStatus::Active);
        assert_eq!(AliveStatus::from_label(" ACTIVE "), AliveStatus::Active);
        assert_eq!(AliveStatus::from_label("yes"), AliveStatus::Active);
    }

    #[test]
    fn status_inactive_is_not_mistaken_for_active() {
        assert_eq!(AliveStatus::from_label("inactive"), AliveStatus::Inactive);
        assert_eq!(AliveStatus::from_label("Closed"), AliveStatus::Inactive);
    }

    #[test]
    fn status_unrecognized_is_unknown() {
        assert_eq!(AliveStatus::from_label(""), AliveStatus::Unknown);
        assert_eq!(AliveStatus::from_label("maybe"), AliveStatus::Unknown);
    }

    // -----------------------------------------------------------------------
    // Coordinates
    // -----------------------------------------------------------------------

    #[test]
    fn coordinates_accept_finite_values() {
        let c = Coordinates::new(40.4168, -3.7038).unwrap();
        assert!((c.latitude - 40.4168).abs() < 1e-9);
        assert!((c.longitude - (-3.7038)).abs() < 1e-9);
    }

    #[test]
    fn coordinates_reject_nan_and_infinite() {
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
        assert!(Coordinates::new(0.0, f64::NAN).is_err());
        assert!(Coordinates::new(f64::INFINITY, 0.0).is_err());
    }

    // -----------------------------------------------------------------------
    // name_key / serialization
    // -----------------------------------------------------------------------

    #[test]
    fn name_key_trims_and_folds_case() {
        assert_eq!(name_key("  Row 44 "), "row 44");
        assert_eq!(name_key("ROW 44"), name_key("row 44"));
    }

    #[test]
    fn venue_serializes_with_lowercase_vocabularies() {
        let mut venue = Venue::new("Fábrica Maravillas", Coordinates::new(40.42, -3.70).unwrap());
        venue.category = Category::TapRoom;
        venue.alive_status = AliveStatus::Active;

        let json = serde_json::to_value(&venue).unwrap();
        assert_eq!(json["category"], "taproom");
        assert_eq!(json["alive_status"], "active");
        assert!(json["last_checked_at"].is_null());
    }
}
