//! Low-level object graph helpers for the PDF inspector.

use lopdf::{Dictionary, Document, Object, ObjectId};

const MAX_PAGE_TREE_DEPTH: usize = 64;

/// Follow an indirect reference, returning the object itself otherwise.
pub(crate) fn resolve<'a>(document: &'a Document, value: &'a Object) -> Option<&'a Object> {
    match value {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Resolve a value that might be inline or a reference to a dictionary.
pub(crate) fn resolve_dict<'a>(document: &'a Document, value: &'a Object) -> Option<&'a Dictionary> {
    resolve(document, value).and_then(|o| o.as_dict().ok())
}

/// Look up `key` in `dict`, following an indirect reference if needed.
pub(crate) fn dict_entry<'a>(
    document: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    dict.get(key).ok().and_then(|v| resolve(document, v))
}

/// Look up `key` in `dict` and return it when it resolves to a dictionary.
pub(crate) fn dict_entry_dict<'a>(
    document: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Dictionary> {
    dict_entry(document, dict, key).and_then(|o| o.as_dict().ok())
}

/// Look up `key` in `dict` and return it when it resolves to an array.
pub(crate) fn dict_entry_array<'a>(
    document: &'a Document,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Vec<Object>> {
    dict_entry(document, dict, key).and_then(|o| o.as_array().ok())
}

/// Decode a PDF name to a `String`.
pub(crate) fn name_to_string(value: &Object) -> Option<String> {
    value
        .as_name()
        .ok()
        .map(|n| String::from_utf8_lossy(n).into_owned())
}

/// The resource dictionary of a page, walking up the page tree through
/// `/Parent` when the page inherits it.
pub(crate) fn page_resources(document: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut current = document.get_object(page_id).ok()?.as_dict().ok()?;
    // Bounded so a /Parent cycle cannot spin forever.
    for _ in 0..MAX_PAGE_TREE_DEPTH {
        if let Some(resources) = dict_entry_dict(document, current, b"Resources") {
            return Some(resources);
        }
        let parent = current.get(b"Parent").ok()?;
        current = resolve_dict(document, parent)?;
    }
    None
}
