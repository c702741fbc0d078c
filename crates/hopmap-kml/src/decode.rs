//! KML decoding: one tolerant event-driven pass over the document.
//!
//! Placemarks are decoded independently; a bad record is skipped and the
//! rest of the document continues. Field extraction tries an ordered list of
//! strategies per field — typed `<Data>` pairs, then `<SimpleData>` pairs,
//! then anchors scraped from the description HTML — each producing a value
//! or abstaining, never overwriting an earlier strategy's result.

use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use uuid::Uuid;

use hopmap_core::{Category, Coordinates, Venue};

use crate::error::KmlError;
use crate::fields::{is_maps_link, FieldSet};
use crate::sanitize::sanitize_description;

/// Accumulates the raw pieces of one `<Placemark>` while its events stream by.
#[derive(Debug, Default)]
struct PlacemarkBuilder {
    name: String,
    description: String,
    coordinates: String,
    /// `<ExtendedData><Data name="…"><value>` pairs, in document order.
    data_pairs: Vec<(String, String)>,
    /// `<SchemaData><SimpleData name="…">` pairs, in document order.
    simple_pairs: Vec<(String, String)>,
}

/// Decodes a KML 2.2 document into venues.
///
/// Folder display names map to categories via [`Category::from_label`]
/// (Spanish and English tier names both work). When the document has no
/// folders at all, every placemark decodes ungrouped as
/// [`Category::Common`] — a fallback pass, not a merge: in a foldered
/// document, stray placemarks outside any folder are not included.
///
/// Every decoded record receives a freshly generated id; ids from the source
/// document are never reused.
///
/// # Errors
///
/// Returns [`KmlError::Xml`] only for malformed XML at the document level.
/// Individually invalid placemarks (missing name, unparseable coordinates)
/// are skipped, never fatal.
#[allow(clippy::too_many_lines)]
pub fn parse_kml(text: &str) -> Result<Vec<Venue>, KmlError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    // Element path from the document root to the current position.
    let mut path: Vec<String> = Vec::new();
    // Folder labels by index; the stack holds indices of open folders.
    let mut folder_labels: Vec<String> = Vec::new();
    let mut folder_stack: Vec<usize> = Vec::new();

    let mut placemark: Option<PlacemarkBuilder> = None;
    let mut pending_data: Option<(String, String)> = None;
    let mut pending_simple: Option<(String, String)> = None;

    // Decoded placemarks with the index of their innermost folder, if any.
    let mut decoded: Vec<(Option<usize>, Venue)> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match name.as_str() {
                    "Folder" => {
                        folder_labels.push(String::new());
                        folder_stack.push(folder_labels.len() - 1);
                    }
                    "Placemark" => placemark = Some(PlacemarkBuilder::default()),
                    "Data" if placemark.is_some() => {
                        pending_data = name_attribute(&e).map(|n| (n, String::new()));
                    }
                    "SimpleData" if placemark.is_some() => {
                        pending_simple = name_attribute(&e).map(|n| (n, String::new()));
                    }
                    "br" => {
                        if let Some(pm) = placemark.as_mut() {
                            if path.iter().any(|p| p == "description") {
                                pm.description.push('\n');
                            }
                        }
                    }
                    _ => {}
                }
                path.push(name);
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if name == "br" {
                    if let Some(pm) = placemark.as_mut() {
                        if path.iter().any(|p| p == "description") {
                            pm.description.push('\n');
                        }
                    }
                }
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default().into_owned();
                route_text(
                    &text,
                    &path,
                    placemark.as_mut(),
                    pending_data.as_mut(),
                    pending_simple.as_mut(),
                    &folder_stack,
                    &mut folder_labels,
                );
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                route_text(
                    &text,
                    &path,
                    placemark.as_mut(),
                    pending_data.as_mut(),
                    pending_simple.as_mut(),
                    &folder_stack,
                    &mut folder_labels,
                );
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                match name.as_str() {
                    "Data" => {
                        if let (Some(pair), Some(pm)) = (pending_data.take(), placemark.as_mut()) {
                            pm.data_pairs.push(pair);
                        }
                    }
                    "SimpleData" => {
                        if let (Some(pair), Some(pm)) = (pending_simple.take(), placemark.as_mut())
                        {
                            pm.simple_pairs.push(pair);
                        }
                    }
                    "Placemark" => {
                        if let Some(pm) = placemark.take() {
                            if let Some(venue) = finish_placemark(pm) {
                                decoded.push((folder_stack.last().copied(), venue));
                            }
                        }
                    }
                    "Folder" => {
                        folder_stack.pop();
                    }
                    _ => {}
                }
                path.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(KmlError::Xml(e)),
            _ => {}
        }
    }

    let folders_seen = !folder_labels.is_empty();
    let venues = decoded
        .into_iter()
        .filter_map(|(folder_idx, mut venue)| {
            if folders_seen {
                let idx = folder_idx?;
                venue.category = Category::from_label(&folder_labels[idx]);
            } else {
                venue.category = Category::Common;
            }
            Some(venue)
        })
        .collect();

    Ok(venues)
}

/// Directs one text/CDATA chunk to whichever accumulator the current element
/// path selects.
#[allow(clippy::too_many_arguments)]
fn route_text(
    text: &str,
    path: &[String],
    placemark: Option<&mut PlacemarkBuilder>,
    pending_data: Option<&mut (String, String)>,
    pending_simple: Option<&mut (String, String)>,
    folder_stack: &[usize],
    folder_labels: &mut [String],
) {
    let last = path.last().map(String::as_str);

    if let Some(pm) = placemark {
        if last == Some("value") {
            if let Some((_, value)) = pending_data {
                value.push_str(text);
            }
        } else if last == Some("SimpleData") {
            if let Some((_, value)) = pending_simple {
                value.push_str(text);
            }
        } else if path.iter().any(|p| p == "description") {
            pm.description.push_str(text);
        } else if last == Some("name") {
            pm.name.push_str(text);
        } else if last == Some("coordinates") {
            pm.coordinates.push_str(text);
        }
    } else if last == Some("name") && path.len() >= 2 && path[path.len() - 2] == "Folder" {
        if let Some(&idx) = folder_stack.last() {
            folder_labels[idx].push_str(text);
        }
    }
}

/// Reads the `name` attribute of a `<Data>`/`<SimpleData>` element,
/// abstaining on anything malformed.
fn name_attribute(e: &quick_xml::events::BytesStart<'_>) -> Option<String> {
    e.try_get_attribute("name")
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok())
        .map(std::borrow::Cow::into_owned)
}

/// Validates and assembles one placemark; `None` drops it.
fn finish_placemark(pm: PlacemarkBuilder) -> Option<Venue> {
    let name = pm.name.trim().to_string();
    if name.is_empty() {
        tracing::debug!("skipping placemark without a name");
        return None;
    }

    let Some(coordinates) = parse_point_coordinates(&pm.coordinates) else {
        tracing::debug!(placemark = %name, raw = %pm.coordinates, "skipping placemark without a valid point");
        return None;
    };

    let mut fields = FieldSet::default();
    for (key, value) in pm.data_pairs.iter().chain(pm.simple_pairs.iter()) {
        fields.offer(key, value);
    }

    // Last-resort strategy: links buried in the description HTML.
    if fields.website.is_none() || fields.maps_uri.is_none() {
        let (website, maps_uri) = scrape_description_links(&pm.description);
        if fields.website.is_none() {
            fields.website = website;
        }
        if fields.maps_uri.is_none() {
            fields.maps_uri = maps_uri;
        }
    }

    let alive_status = fields.status();
    Some(Venue {
        id: Uuid::new_v4(),
        name,
        description: sanitize_description(&pm.description),
        category: Category::Common,
        coordinates,
        address: fields.address,
        website: fields.website,
        maps_uri: fields.maps_uri,
        alive_status,
        last_checked_at: None,
    })
}

/// Parses a `<Point><coordinates>` value: `longitude,latitude[,altitude]`.
/// Altitude is ignored. Both axes must parse as finite numbers or the
/// placemark is dropped.
fn parse_point_coordinates(raw: &str) -> Option<Coordinates> {
    let mut parts = raw.trim().split(',');
    let longitude = parts.next()?.trim().parse::<f64>().ok()?;
    let latitude = parts.next()?.trim().parse::<f64>().ok()?;
    Coordinates::new(latitude, longitude).ok()
}

/// Scans anchor tags in the raw description HTML. The first maps-domain
/// target becomes the maps link, the first other target the website;
/// first-found wins for each.
fn scrape_description_links(html: &str) -> (Option<String>, Option<String>) {
    let href_re = Regex::new(r#"(?i)<a\s[^>]*href\s*=\s*["']([^"']+)["']"#).expect("valid regex");

    let mut website = None;
    let mut maps_uri = None;
    for cap in href_re.captures_iter(html) {
        let Some(href) = cap.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if is_maps_link(href) {
            if maps_uri.is_none() {
                maps_uri = Some(href.to_string());
            }
        } else if website.is_none() {
            website = Some(href.to_string());
        }
        if website.is_some() && maps_uri.is_some() {
            break;
        }
    }
    (website, maps_uri)
}
