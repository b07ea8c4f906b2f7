//! Key ordering and leaf flattening for the record tree.

use super::path::TreePath;
use super::{StoreError, StoreResult};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Orders record keys: canonical 32-bit integer keys first (numerically),
/// then every other key lexicographically.
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    match (integer_key(a), integer_key(b)) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Orders child values: missing/null, `false`, `true`, numbers, strings,
/// then objects and arrays.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let rank_a = value_rank(a);
    let rank_b = value_rank(b);
    if rank_a != rank_b {
        return rank_a.cmp(&rank_b);
    }
    match (a, b) {
        (Some(Value::Number(left)), Some(Value::Number(right))) => {
            let left = left.as_f64().unwrap_or(0.0);
            let right = right.as_f64().unwrap_or(0.0);
            left.partial_cmp(&right).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(left)), Some(Value::String(right))) => left.cmp(right),
        _ => Ordering::Equal,
    }
}

fn value_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(false)) => 1,
        Some(Value::Bool(true)) => 2,
        Some(Value::Number(_)) => 3,
        Some(Value::String(_)) => 4,
        Some(Value::Object(_)) | Some(Value::Array(_)) => 5,
    }
}

fn integer_key(key: &str) -> Option<i32> {
    let parsed = key.parse::<i32>().ok()?;
    // "007" and "+7" are plain string keys.
    (parsed.to_string() == key).then_some(parsed)
}

/// Flattens `value` into scalar leaves rooted at `base`.
///
/// `null` leaves and empty containers produce no rows.
pub fn flatten(base: &TreePath, value: &Value, out: &mut Vec<(TreePath, Value)>) -> StoreResult<()> {
    match value {
        Value::Null => Ok(()),
        Value::Object(map) => {
            for (key, child) in map {
                flatten(&base.child(key)?, child, out)?;
            }
            Ok(())
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten(&base.child(&index.to_string())?, child, out)?;
            }
            Ok(())
        }
        scalar => {
            out.push((base.clone(), scalar.clone()));
            Ok(())
        }
    }
}

/// Rebuilds a subtree from leaves given as paths relative to its root.
///
/// Returns `None` when there are no leaves. Objects whose keys are exactly
/// `0..n` are returned as arrays.
pub fn assemble(leaves: Vec<(Vec<String>, Value)>) -> StoreResult<Option<Value>> {
    if leaves.is_empty() {
        return Ok(None);
    }

    let mut root = Map::new();
    for (segments, value) in leaves {
        let Some((last, parents)) = segments.split_last() else {
            return Err(StoreError::InvalidData(
                "leaf stored at the subtree root alongside children".to_string(),
            ));
        };
        let mut cursor = &mut root;
        for segment in parents {
            let slot = cursor
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            cursor = slot.as_object_mut().ok_or_else(|| {
                StoreError::InvalidData(format!("node `{segment}` is not an object"))
            })?;
        }
        cursor.insert(last.clone(), value);
    }

    Ok(Some(restore_arrays(Value::Object(root))))
}

fn restore_arrays(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let dense = !map.is_empty()
                && (0..map.len()).all(|index| map.contains_key(&index.to_string()));
            if dense {
                let mut items: Vec<(usize, Value)> = map
                    .into_iter()
                    .filter_map(|(key, child)| key.parse::<usize>().ok().map(|i| (i, child)))
                    .collect();
                items.sort_by_key(|(index, _)| *index);
                Value::Array(
                    items
                        .into_iter()
                        .map(|(_, child)| restore_arrays(child))
                        .collect(),
                )
            } else {
                Value::Object(
                    map.into_iter()
                        .map(|(key, child)| (key, restore_arrays(child)))
                        .collect(),
                )
            }
        }
        other => other,
    }
}
