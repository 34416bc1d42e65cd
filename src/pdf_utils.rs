//! Shared PDF parsing utilities used across multiple modules.

use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeSet;

/// Extract a string value from a PDF dictionary for a given key.
///
/// Returns `Some(String)` if the key exists and contains a valid non-empty string,
/// `None` otherwise.
pub fn extract_string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key)
        .ok()
        .and_then(decode_text)
        .filter(|s| !s.is_empty())
}

/// Decode a PDF text string (PDFDocEncoding, UTF-16BE or UTF-8). A leading
/// byte-order mark is not part of the text.
pub fn decode_text(value: &Object) -> Option<String> {
    let text = lopdf::decode_text_string(value).ok()?;
    match text.strip_prefix('\u{feff}') {
        Some(rest) => Some(rest.to_string()),
        None => Some(text),
    }
}

/// Follow an indirect reference (if any) and return the dictionary.
pub fn resolve_dict<'a>(document: &'a Document, value: &'a Object) -> Option<&'a Dictionary> {
    match value.as_reference() {
        Ok(id) => document.get_object(id).ok()?.as_dict().ok(),
        Err(_) => value.as_dict().ok(),
    }
}

/// Follow an indirect reference (if any) and return the array.
pub fn resolve_array<'a>(document: &'a Document, value: &'a Object) -> Option<&'a Vec<Object>> {
    match value.as_reference() {
        Ok(id) => document.get_object(id).ok()?.as_array().ok(),
        Err(_) => value.as_array().ok(),
    }
}

/// Render a field value object (`/V`) as text. Names lose their leading
/// slash; arrays (multi-select choices) are joined with `", "`.
pub fn object_to_text(document: &Document, value: &Object) -> Option<String> {
    render(document, value, &mut BTreeSet::new())
}

fn render(document: &Document, value: &Object, visited: &mut BTreeSet<ObjectId>) -> Option<String> {
    match value {
        Object::String(..) => decode_text(value),
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        Object::Integer(n) => Some(n.to_string()),
        Object::Real(r) => Some(r.to_string()),
        Object::Boolean(b) => Some(b.to_string()),
        Object::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|item| render(document, item, visited))
                .collect();
            Some(parts.join(", "))
        }
        Object::Reference(id) => {
            if !visited.insert(*id) {
                tracing::warn!("reference cycle at {} {} R in field value", id.0, id.1);
                return None;
            }
            let target = document.get_object(*id).ok()?;
            render(document, target, visited)
        }
        _ => None,
    }
    .filter(|s| !s.is_empty())
}
