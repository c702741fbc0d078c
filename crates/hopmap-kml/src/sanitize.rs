//! HTML-to-plain-text sanitization for placemark descriptions.

use regex::Regex;

/// Strips a description down to plain text for storage: `<br>` variants
/// become newlines, all other tags are removed, common entities are decoded
/// and the result is trimmed.
pub(crate) fn sanitize_description(html: &str) -> String {
    let br_re = Regex::new(r"(?i)<br\s*/?\s*>").expect("valid regex");
    let with_breaks = br_re.replace_all(html, "\n");

    let mut stripped = String::with_capacity(with_breaks.len());
    let mut in_tag = false;
    for ch in with_breaks.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            '\r' => {}
            _ if !in_tag => stripped.push(ch),
            _ => {}
        }
    }

    decode_entities(&stripped).trim().to_string()
}

/// Decodes the handful of entities that show up in exported descriptions.
/// Decoding happens after tag stripping so `&lt;b&gt;` survives as text.
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
