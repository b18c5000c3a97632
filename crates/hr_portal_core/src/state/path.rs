//! Dot-separated path walking over a JSON document.
//!
//! Array segments are addressed by decimal index (`requests.0.status`).

use serde_json::{Map, Value};

/// Splits a path into its segments. An empty path yields one empty segment.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('.').collect()
}

/// Returns the value at `path`, or `None` when any segment is missing or a
/// non-container value is reached before the last segment.
pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments(path) {
        current = child(current, segment)?;
    }
    Some(current)
}

/// Mutable variant of [`lookup`].
pub fn lookup_mut<'a>(root: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in segments(path) {
        current = child_mut(current, segment)?;
    }
    Some(current)
}

/// Index gap an assignment may pad with nulls past the end of an array.
const MAX_INDEX_GAP: usize = 1024;

/// Assigns `value` at `path`, creating intermediate objects.
///
/// Scalars met on the way are replaced by empty objects; arrays never are.
/// An index at or past the end of an array extends it, padding with nulls.
/// Returns `false`, leaving the document untouched, when a segment cannot
/// address an array (not an index, or too far past its end).
pub fn assign(root: &mut Value, path: &str, value: Value) -> bool {
    let parts = segments(path);
    let Some((last, intermediates)) = parts.split_last() else {
        return false;
    };
    if !addressable(root, intermediates, last) {
        return false;
    }

    let mut current = root;
    for segment in intermediates {
        current = descend_or_create(current, segment);
    }
    match current {
        Value::Array(items) => *array_entry(items, last) = value,
        other => {
            ensure_object(other).insert((*last).to_string(), value);
        }
    }
    true
}

/// Checks every array met along the existing part of the path before any
/// write happens, so a rejected assignment changes nothing.
fn addressable(root: &Value, intermediates: &[&str], last: &str) -> bool {
    let mut current = Some(root);
    for segment in intermediates.iter().copied().chain(std::iter::once(last)) {
        let Some(value) = current else {
            return true;
        };
        if let Value::Array(items) = value {
            if array_index(segment, items.len()).is_none() {
                return false;
            }
        }
        current = child(value, segment);
    }
    true
}

fn descend_or_create<'a>(current: &'a mut Value, segment: &str) -> &'a mut Value {
    let entry = match current {
        Value::Array(items) => array_entry(items, segment),
        other => ensure_object(other)
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new())),
    };
    if !entry.is_object() && !entry.is_array() {
        *entry = Value::Object(Map::new());
    }
    entry
}

/// Slot for an index already accepted by [`array_index`], growing the array
/// when needed.
fn array_entry<'a>(items: &'a mut Vec<Value>, segment: &str) -> &'a mut Value {
    let index = array_index(segment, items.len()).unwrap_or(items.len());
    if index >= items.len() {
        items.resize(index + 1, Value::Null);
    }
    &mut items[index]
}

fn array_index(segment: &str, len: usize) -> Option<usize> {
    segment
        .parse::<usize>()
        .ok()
        .filter(|index| *index <= len.saturating_add(MAX_INDEX_GAP))
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}

fn child<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => parse_index(segment, items.len()).map(|index| &items[index]),
        _ => None,
    }
}

fn child_mut<'a>(value: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => {
            let index = parse_index(segment, items.len())?;
            items.get_mut(index)
        }
        _ => None,
    }
}

fn parse_index(segment: &str, len: usize) -> Option<usize> {
    segment.parse::<usize>().ok().filter(|index| *index < len)
}
