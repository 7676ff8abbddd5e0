//! Dot-notation access into nested values
//!
//! Paths such as `"a.b.c"` address one nesting level per segment. Reads walk
//! maps by key and lists by numeric index and never fail: a missing segment
//! or a null along the way yields the caller's default. Writes only ever
//! create maps, so `set(target, "bar.0.item", v)` produces
//! `{"bar": {"0": {"item": v}}}`.
//!
//! There is no escaping mechanism: a key containing a literal `.` cannot be
//! addressed.
//!
//! Copyright (c) 2025 Reshaper Team
//! Licensed under the Apache-2.0 license

use crate::value::{Map, Value};

/// Split a path into its segments; the empty path has none
pub fn split_path(path: &str) -> Vec<&str> {
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('.').collect()
    }
}

/// Borrow the value at `path`, or `None` when any segment is missing
///
/// A null found at the end of the path is returned as `Some(&Value::Null)`;
/// use [`get`] for default substitution.
pub fn get_ref<'a>(container: &'a Value, path: &str) -> Option<&'a Value> {
    let segments = split_path(path);
    if segments.is_empty() {
        return None;
    }

    let mut current = container;
    for segment in segments {
        current = match current {
            Value::Map(map) => map.get(segment)?,
            Value::List(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Read the value at `path`, falling back to `default`
///
/// The empty path always yields `default`, never the whole container. A
/// present but null value also yields `default`.
pub fn get(container: &Value, path: &str, default: &Value) -> Value {
    match get_ref(container, path) {
        Some(value) if !value.is_null() => value.clone(),
        _ => default.clone(),
    }
}

/// Write `value` at `path`, creating intermediate maps as needed
///
/// Whatever sits at the final segment is overwritten. Intermediate values
/// that are not containers are replaced by empty maps. An existing list is
/// descended into when the segment is an index inside its bounds; any other
/// segment turns it into a map keyed `"0"`, `"1"`, ... that keeps its
/// elements. The empty path is a no-op.
pub fn set(container: &mut Value, path: &str, value: Value) {
    let segments = split_path(path);
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = container;
    for segment in parents {
        current = child_mut(current, segment);
    }

    let index = match &*current {
        Value::List(items) => list_index(items, last),
        _ => None,
    };
    if index.is_none() {
        promote_to_map(current);
    }
    match (current, index) {
        (Value::List(items), Some(index)) => items[index] = value,
        (Value::Map(map), _) => {
            map.insert(last.to_string(), value);
        }
        _ => {}
    }
}

/// Descend one level for writing, creating an empty map where needed
fn child_mut<'a>(current: &'a mut Value, segment: &str) -> &'a mut Value {
    let index = match &*current {
        Value::List(items) => list_index(items, segment),
        _ => None,
    };
    if index.is_none() {
        promote_to_map(current);
    }
    match (current, index) {
        (Value::List(items), Some(index)) => &mut items[index],
        (Value::Map(map), _) => {
            let child = map.entry(segment.to_string()).or_insert(Value::Null);
            if !matches!(child, Value::Map(_) | Value::List(_)) {
                *child = Value::map();
            }
            child
        }
        (other, _) => other,
    }
}

/// Make `current` a map, keeping list elements under their index keys
fn promote_to_map(current: &mut Value) {
    match current {
        Value::Map(_) => {}
        Value::List(items) => {
            let items = std::mem::take(items);
            let map: Map = items
                .into_iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), item))
                .collect();
            *current = Value::Map(map);
        }
        _ => *current = Value::map(),
    }
}

fn list_index(items: &[Value], segment: &str) -> Option<usize> {
    segment.parse::<usize>().ok().filter(|index| *index < items.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proptest_strategies::{path_strategy, scalar_strategy, value_strategy};
    use proptest::prelude::*;
    use serde_json::json;

    fn value(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn test_get_nested_map() {
        let source = value(json!({"sub1": {"sub2": "v"}}));
        assert_eq!(get(&source, "sub1.sub2", &Value::Null), Value::from("v"));
    }

    #[test]
    fn test_get_through_list_index() {
        let source = value(json!({"foo": {"bar2": ["Test 0", "Test 1"]}}));
        assert_eq!(get(&source, "foo.bar2.1", &Value::Null), Value::from("Test 1"));
        assert_eq!(get(&source, "foo.bar2.2", &Value::Null), Value::Null);
        assert_eq!(get(&source, "foo.bar2.x", &Value::Null), Value::Null);
    }

    #[test]
    fn test_get_missing_returns_default() {
        let source = value(json!({"a": {"b": 1}}));
        let default = Value::from("fallback");
        assert_eq!(get(&source, "a.c", &default), default);
        assert_eq!(get(&source, "a.b.c", &default), default);
        assert_eq!(get(&source, "x.y", &default), default);
    }

    #[test]
    fn test_get_null_returns_default() {
        let source = value(json!({"phone": null}));
        assert_eq!(get(&source, "phone", &Value::from(0)), Value::from(0));
        assert_eq!(get_ref(&source, "phone"), Some(&Value::Null));
    }

    #[test]
    fn test_get_empty_path_returns_default() {
        let source = value(json!({"a": 1}));
        assert_eq!(get(&source, "", &Value::from(7)), Value::from(7));
        assert_eq!(get_ref(&source, ""), None);
    }

    #[test]
    fn test_set_creates_maps_for_numeric_segments() {
        let mut target = Value::map();
        set(&mut target, "bar.0.item", Value::from("default-value"));
        set(&mut target, "bar.0.item2", Value::from("default-value2"));
        assert_eq!(
            target,
            value(json!({"bar": {"0": {"item": "default-value", "item2": "default-value2"}}}))
        );
    }

    #[test]
    fn test_set_overwrites_scalars_and_containers() {
        let mut target = value(json!({"a": "scalar", "b": {"c": 1}}));
        set(&mut target, "a.x", Value::from(1));
        set(&mut target, "b", Value::from(2));
        assert_eq!(target, value(json!({"a": {"x": 1}, "b": 2})));
    }

    #[test]
    fn test_set_descends_into_existing_list() {
        let mut target = value(json!({"items": [{"id": 1}, {"id": 2}]}));
        set(&mut target, "items.1.name", Value::from("second"));
        assert_eq!(
            target,
            value(json!({"items": [{"id": 1}, {"id": 2, "name": "second"}]}))
        );
    }

    #[test]
    fn test_set_keeps_list_elements_for_non_index_segments() {
        let mut target = value(json!({"tags": ["a", "b"]}));
        set(&mut target, "tags.extra", Value::from("x"));
        assert_eq!(target, value(json!({"tags": {"0": "a", "1": "b", "extra": "x"}})));

        let mut target = value(json!({"tags": ["a", "b"]}));
        set(&mut target, "tags.5.x", Value::from("y"));
        assert_eq!(target, value(json!({"tags": {"0": "a", "1": "b", "5": {"x": "y"}}})));
    }

    #[test]
    fn test_set_empty_path_is_noop() {
        let mut target = value(json!({"a": 1}));
        set(&mut target, "", Value::from(2));
        assert_eq!(target, value(json!({"a": 1})));
    }

    proptest! {
        #[test]
        fn prop_set_then_get_round_trips(
            mut container in value_strategy(),
            path in path_strategy(),
            written in scalar_strategy(),
        ) {
            set(&mut container, &path, written.clone());
            let sentinel = Value::from("sentinel");
            let expected = if written.is_null() { sentinel.clone() } else { written };
            prop_assert_eq!(get(&container, &path, &sentinel), expected);
        }
    }
}
