//! Coercion of untrusted candidate objects into typed venues.

use uuid::Uuid;

use hopmap_core::{AliveStatus, Category, Coordinates, Venue};

/// Converts one raw candidate object into a [`Venue`], or drops it.
///
/// The service promises `{name, description, address, lat, lng, category}`
/// but the payload is generated text: `lat`/`lng` may arrive as numbers or
/// numeric strings, the category is a free-text hint, and any field may be
/// missing. A candidate without a usable name or finite coordinates yields
/// `None`.
pub(crate) fn candidate_to_venue(item: &serde_json::Value) -> Option<Venue> {
    let name = item.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }

    let latitude = number_field(item, &["lat", "latitude"])?;
    let longitude = number_field(item, &["lng", "lon", "longitude"])?;
    let coordinates = Coordinates::new(latitude, longitude).ok()?;

    let description = item
        .get("description")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();
    let address = item
        .get("address")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let category = item
        .get("category")
        .and_then(serde_json::Value::as_str)
        .map_or(Category::Common, Category::from_label);

    Some(Venue {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description,
        category,
        coordinates,
        address,
        website: None,
        maps_uri: None,
        alive_status: AliveStatus::Unknown,
        last_checked_at: None,
    })
}

/// Reads the first present key as an `f64`, accepting numbers and numeric
/// strings — both appear in the wild.
fn number_field(item: &serde_json::Value, keys: &[&str]) -> Option<f64> {
    let value = keys.iter().find_map(|k| item.get(*k))?;
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn well_formed_candidate_is_coerced() {
        let item = json!({
            "name": "La Tape",
            "description": "Craft bar near Bilbao metro",
            "address": "Calle San Bernardo 88",
            "lat": 40.4269,
            "lng": -3.7038,
            "category": "gold"
        });

        let venue = candidate_to_venue(&item).expect("candidate should coerce");
        assert_eq!(venue.name, "La Tape");
        assert_eq!(venue.category, Category::Gold);
        assert_eq!(venue.address.as_deref(), Some("Calle San Bernardo 88"));
        assert_eq!(venue.alive_status, AliveStatus::Unknown);
    }

    #[test]
    fn string_coordinates_are_accepted() {
        let item = json!({"name": "Stringy", "lat": "40.1", "lng": "-3.5"});
        let venue = candidate_to_venue(&item).unwrap();
        assert!((venue.coordinates.latitude - 40.1).abs() < 1e-9);
        assert!((venue.coordinates.longitude - (-3.5)).abs() < 1e-9);
    }

    #[test]
    fn missing_or_bad_coordinates_drop_the_candidate() {
        assert!(candidate_to_venue(&json!({"name": "No Coords"})).is_none());
        assert!(candidate_to_venue(&json!({"name": "Bad", "lat": "x", "lng": 1.0})).is_none());
    }

    #[test]
    fn blank_name_drops_the_candidate() {
        assert!(candidate_to_venue(&json!({"name": "  ", "lat": 1.0, "lng": 2.0})).is_none());
        assert!(candidate_to_venue(&json!({"lat": 1.0, "lng": 2.0})).is_none());
    }

    #[test]
    fn unrecognized_category_hint_defaults_to_common() {
        let item = json!({"name": "Plain", "lat": 1.0, "lng": 2.0, "category": "whatever"});
        assert_eq!(candidate_to_venue(&item).unwrap().category, Category::Common);
    }
}
