//! KML encoding: one folder per category, CDATA-wrapped text blocks.

use quick_xml::escape::escape;

use hopmap_core::{AliveStatus, Category, Venue};

/// Serializes venues as a KML 2.2 document.
///
/// Folders appear in the fixed category order with empty folders omitted.
/// Name and description are emitted as CDATA so embedded markup passes
/// through as opaque text. The extension block carries one entry per present
/// optional field; absent fields are omitted rather than emitted empty, and
/// an `unknown` status is omitted because decoding restores it by default.
#[must_use]
pub fn write_kml(venues: &[Venue]) -> String {
    let mut out = String::with_capacity(venues.len() * 512 + 256);
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<kml xmlns=\"http://www.opengis.net/kml/2.2\">\n");
    out.push_str("  <Document>\n");
    out.push_str("    <name>hopmap venues</name>\n");

    for category in Category::ORDERED {
        let group: Vec<&Venue> = venues.iter().filter(|v| v.category == category).collect();
        if group.is_empty() {
            continue;
        }

        out.push_str("    <Folder>\n");
        out.push_str(&format!("      <name>{}</name>\n", escape(category.label())));
        for venue in group {
            write_placemark(&mut out, venue);
        }
        out.push_str("    </Folder>\n");
    }

    out.push_str("  </Document>\n");
    out.push_str("</kml>\n");
    out
}

fn write_placemark(out: &mut String, venue: &Venue) {
    out.push_str("      <Placemark>\n");
    out.push_str(&format!(
        "        <name><![CDATA[{}]]></name>\n",
        cdata(&venue.name)
    ));
    if !venue.description.is_empty() {
        out.push_str(&format!(
            "        <description><![CDATA[{}]]></description>\n",
            cdata(&venue.description)
        ));
    }

    let status = (venue.alive_status != AliveStatus::Unknown)
        .then(|| venue.alive_status.as_str().to_string());
    let entries: [(&str, Option<&String>); 4] = [
        ("address", venue.address.as_ref()),
        ("website", venue.website.as_ref()),
        ("google_maps_uri", venue.maps_uri.as_ref()),
        ("status", status.as_ref()),
    ];
    if entries.iter().any(|(_, v)| v.is_some()) {
        out.push_str("        <ExtendedData>\n");
        for (name, value) in entries {
            if let Some(value) = value {
                out.push_str(&format!(
                    "          <Data name=\"{name}\"><value>{}</value></Data>\n",
                    escape(value.as_str())
                ));
            }
        }
        out.push_str("        </ExtendedData>\n");
    }

    out.push_str("        <Point>\n");
    out.push_str(&format!(
        "          <coordinates>{},{},0</coordinates>\n",
        venue.coordinates.longitude, venue.coordinates.latitude
    ));
    out.push_str("        </Point>\n");
    out.push_str("      </Placemark>\n");
}

/// CDATA cannot contain the terminator `]]>`; split it across two sections.
fn cdata(text: &str) -> String {
    text.replace("]]>", "]]]]><![CDATA[>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::parse_kml;
    use hopmap_core::Coordinates;

    fn venue(name: &str, category: Category) -> Venue {
        let mut v = Venue::new(name, Coordinates::new(40.4168, -3.7038).unwrap());
        v.category = category;
        v
    }

    // -----------------------------------------------------------------------
    // Document shape
    // -----------------------------------------------------------------------

    #[test]
    fn folders_follow_fixed_order_and_skip_empty() {
        let venues = vec![
            venue("Taproom Bar", Category::TapRoom),
            venue("Golden One", Category::Gold),
        ];
        let kml = write_kml(&venues);

        let gold = kml.find("<name>Gold</name>").expect("gold folder");
        let tap = kml.find("<name>Tap Room</name>").expect("tap room folder");
        assert!(gold < tap, "Gold folder precedes Tap Room");
        assert!(!kml.contains("<name>Silver</name>"), "empty folder omitted");
        assert!(!kml.contains("<name>Mythic</name>"));
    }

    #[test]
    fn absent_optional_fields_are_omitted() {
        let kml = write_kml(&[venue("Bare", Category::Common)]);
        assert!(!kml.contains("<ExtendedData>"));
        assert!(!kml.contains("name=\"address\""));
        assert!(!kml.contains("name=\"status\""), "unknown status omitted");
    }

    #[test]
    fn coordinates_serialize_as_lon_lat_zero() {
        let kml = write_kml(&[venue("Located", Category::Common)]);
        assert!(kml.contains("<coordinates>-3.7038,40.4168,0</coordinates>"));
    }

    #[test]
    fn markup_in_text_is_treated_as_opaque() {
        let mut v = venue("名前 <b>& más</b>", Category::Common);
        v.description = "contains ]]> terminator".to_string();
        let kml = write_kml(&[v]);

        assert!(kml.contains("<![CDATA[名前 <b>& más</b>]]>"));
        assert!(!kml.contains("contains ]]> terminator</description>"));
    }

    // -----------------------------------------------------------------------
    // Round-trip
    // -----------------------------------------------------------------------

    #[test]
    fn fully_populated_venue_round_trips() {
        let mut original = venue("Cervecera Península", Category::Mythic);
        original.description = "Two floors, local taps".to_string();
        original.address = Some("Calle Nueva 10, Madrid".to_string());
        original.website = Some("https://peninsula.example".to_string());
        original.maps_uri = Some("https://maps.google.com/?q=peninsula".to_string());
        original.alive_status = AliveStatus::Active;

        let decoded = parse_kml(&write_kml(std::slice::from_ref(&original))).unwrap();
        assert_eq!(decoded.len(), 1);
        let got = &decoded[0];

        assert_eq!(got.name, original.name);
        assert_eq!(got.category, original.category);
        assert_eq!(got.coordinates, original.coordinates);
        assert_eq!(got.description, original.description);
        assert_eq!(got.address, original.address);
        assert_eq!(got.website, original.website);
        assert_eq!(got.maps_uri, original.maps_uri);
        assert_eq!(got.alive_status, original.alive_status);
        assert_ne!(got.id, original.id, "decode always mints a fresh id");
    }

    #[test]
    fn unknown_status_round_trips_via_default() {
        let original = venue("Quiet Place", Category::Silver);
        let decoded = parse_kml(&write_kml(&[original])).unwrap();
        assert_eq!(decoded[0].alive_status, AliveStatus::Unknown);
    }

    #[test]
    fn every_category_round_trips() {
        let venues: Vec<Venue> = Category::ORDERED
            .iter()
            .enumerate()
            .map(|(i, &c)| venue(&format!("Venue {i}"), c))
            .collect();

        let decoded = parse_kml(&write_kml(&venues)).unwrap();
        assert_eq!(decoded.len(), venues.len());
        for (got, want) in decoded.iter().zip(&venues) {
            assert_eq!(got.category, want.category, "category of {}", want.name);
        }
    }
}
