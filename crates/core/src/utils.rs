//! Small helpers for loosely-typed JSON.

use serde_json::{Map, Value};

/// Returns `true` if the value is a string with at least one character.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use stac_entity::utils::has_text;
///
/// assert!(has_text(&json!(" ")));
/// assert!(!has_text(&json!("")));
/// assert!(!has_text(&json!(123)));
/// ```
pub fn has_text(value: &Value) -> bool {
    value.as_str().is_some_and(|s| !s.is_empty())
}

/// Returns `true` if the optional string is present and not empty.
pub(crate) fn is_text(s: Option<&str>) -> bool {
    s.is_some_and(|s| !s.is_empty())
}

/// Checks that a value is a number in `[min, max]` and returns it.
///
/// Numbers that lie outside of the range by at most `epsilon` are clamped to
/// the nearest boundary, anything further out (or anything that isn't a
/// number) is `None`.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use stac_entity::utils::ensure_number;
///
/// assert_eq!(ensure_number(&json!(1), 1.0, 2.0, 0.0), Some(1.0));
/// assert_eq!(ensure_number(&json!(0.99), 1.0, 2.0, 0.01), Some(1.0));
/// assert_eq!(ensure_number(&json!(3), 1.0, 2.0, 0.0), None);
/// assert_eq!(ensure_number(&json!("a"), 1.0, 2.0, 0.0), None);
/// ```
pub fn ensure_number(value: &Value, min: f64, max: f64, epsilon: f64) -> Option<f64> {
    clamp(value.as_f64()?, min, max, epsilon)
}

pub(crate) fn clamp(n: f64, min: f64, max: f64, epsilon: f64) -> Option<f64> {
    if !n.is_finite() || n < min - epsilon || n > max + epsilon {
        None
    } else {
        Some(n.clamp(min, max))
    }
}

/// Merges arrays of objects by their position.
///
/// The object at index `i` of the result contains the keys of the objects at
/// index `i` of every array, with later arrays overwriting earlier ones.
/// Values that are not arrays are ignored. A single array is returned
/// unchanged.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use stac_entity::utils::merge_arrays_of_objects;
///
/// let merged = merge_arrays_of_objects(&[
///     &json!([{"a": 1}, {"b": 1}]),
///     &json!([{"a": 2}, {"c": 3}]),
/// ]);
/// assert_eq!(merged, vec![json!({"a": 2}), json!({"b": 1, "c": 3})]);
/// ```
pub fn merge_arrays_of_objects(arrays: &[&Value]) -> Vec<Value> {
    let arrays: Vec<&Vec<Value>> = arrays.iter().filter_map(|v| v.as_array()).collect();
    match arrays.as_slice() {
        [] => Vec::new(),
        [array] => array.to_vec(),
        _ => {
            let length = arrays.iter().map(|a| a.len()).max().unwrap_or(0);
            (0..length)
                .map(|i| {
                    let mut merged = Map::new();
                    for object in arrays.iter().filter_map(|a| a.get(i)?.as_object()) {
                        for (key, value) in object {
                            let _ = merged.insert(key.clone(), value.clone());
                        }
                    }
                    Value::Object(merged)
                })
                .collect()
        }
    }
}
