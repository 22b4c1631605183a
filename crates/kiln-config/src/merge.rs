//! Deep merge of partial configuration trees
//!
//! Configuration layers are merged as JSON trees with these rules, applied
//! per key of the overlay:
//!
//! - `null` in the overlay means "not set": the base value survives
//! - two arrays produce their union, base elements first, deduplicated by
//!   deep value equality and stable on first occurrence
//! - two objects are merged recursively
//! - anything else is replaced by the overlay value
//!
//! The base is never mutated; a fresh tree is returned.

use crate::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Merge `overlay` on top of `base`, returning a new tree.
pub fn merge_configuration(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (_, Value::Null) => base.clone(),
        (Value::Array(base_items), Value::Array(overlay_items)) => {
            Value::Array(union(base_items, overlay_items))
        }
        (_, Value::Array(overlay_items)) => Value::Array(union(&[], overlay_items)),
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            Value::Object(merge_maps(base_map, overlay_map))
        }
        // A fresh map drops the overlay's unset keys
        (_, Value::Object(overlay_map)) => Value::Object(merge_maps(&Map::new(), overlay_map)),
        (_, other) => other.clone(),
    }
}

fn merge_maps(base: &Map<String, Value>, overlay: &Map<String, Value>) -> Map<String, Value> {
    let mut result = base.clone();
    for (key, value) in overlay {
        if value.is_null() {
            continue;
        }
        let merged = match result.get(key) {
            Some(existing) => merge_configuration(existing, value),
            None => merge_configuration(&Value::Null, value),
        };
        result.insert(key.clone(), merged);
    }
    result
}

/// Order-stable union of two sequences.
fn union(base: &[Value], overlay: &[Value]) -> Vec<Value> {
    let mut result: Vec<Value> = Vec::with_capacity(base.len() + overlay.len());
    for item in base.iter().chain(overlay) {
        if !result.contains(item) {
            result.push(item.clone());
        }
    }
    result
}

/// Merge two typed configuration layers through their JSON representation.
///
/// Fields that serialize to nothing (or `null`) in `overlay` leave the
/// corresponding `base` fields untouched.
pub fn merge_typed<T>(base: &T, overlay: &T) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let merged = merge_configuration(&serde_json::to_value(base)?, &serde_json::to_value(overlay)?);
    Ok(serde_json::from_value(merged)?)
}
