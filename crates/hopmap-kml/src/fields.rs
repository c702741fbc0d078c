//! Alias tables for the legacy extension-data field names.
//!
//! Documents in the wild name the same field several ways (`website` vs
//! `web` vs `gx_media_links`, `address` vs `direccion`). Each alias maps to
//! exactly one canonical field; the first value offered for a field wins and
//! later offers abstain.

use hopmap_core::AliveStatus;

const WEBSITE_ALIASES: [&str; 5] = ["website", "web", "url", "site", "gx_media_links"];
const MAPS_ALIASES: [&str; 5] = [
    "googlemapsuri",
    "google_maps_uri",
    "maps_link",
    "map_link",
    "google_maps",
];
const ADDRESS_ALIASES: [&str; 4] = ["address", "direccion", "dirección", "location"];
const STATUS_ALIASES: [&str; 3] = ["alivestatus", "status", "active"];

/// Substrings that mark an anchor href as a maps link rather than a website.
const MAPS_DOMAINS: [&str; 4] = [
    "google.com/maps",
    "maps.google",
    "maps.app.goo.gl",
    "goo.gl/maps",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldKind {
    Website,
    MapsLink,
    Address,
    Status,
}

/// Resolves an extension-data entry name to its canonical field,
/// case-insensitively. Unknown names abstain.
pub(crate) fn field_for_alias(name: &str) -> Option<FieldKind> {
    let lower = name.trim().to_lowercase();
    let lower = lower.as_str();
    if WEBSITE_ALIASES.contains(&lower) {
        Some(FieldKind::Website)
    } else if MAPS_ALIASES.contains(&lower) {
        Some(FieldKind::MapsLink)
    } else if ADDRESS_ALIASES.contains(&lower) {
        Some(FieldKind::Address)
    } else if STATUS_ALIASES.contains(&lower) {
        Some(FieldKind::Status)
    } else {
        None
    }
}

pub(crate) fn is_maps_link(url: &str) -> bool {
    let lower = url.to_lowercase();
    MAPS_DOMAINS.iter().any(|d| lower.contains(d))
}

/// Accumulates the optional fields of one placemark across the extraction
/// strategies. First-found wins; empty values abstain.
#[derive(Debug, Default)]
pub(crate) struct FieldSet {
    pub(crate) website: Option<String>,
    pub(crate) maps_uri: Option<String>,
    pub(crate) address: Option<String>,
    status_raw: Option<String>,
}

impl FieldSet {
    pub(crate) fn offer(&mut self, name: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        match field_for_alias(name) {
            Some(FieldKind::Website) if self.website.is_none() => {
                self.website = Some(value.to_string());
            }
            Some(FieldKind::MapsLink) if self.maps_uri.is_none() => {
                self.maps_uri = Some(value.to_string());
            }
            Some(FieldKind::Address) if self.address.is_none() => {
                self.address = Some(value.to_string());
            }
            Some(FieldKind::Status) if self.status_raw.is_none() => {
                self.status_raw = Some(value.to_string());
            }
            _ => {}
        }
    }

    pub(crate) fn status(&self) -> AliveStatus {
        self.status_raw
            .as_deref()
            .map_or(AliveStatus::Unknown, AliveStatus::from_label)
    }
}
