//! Priority-biased deep merge of JSON-shaped parameter trees (§4.4).
//!
//! Two values `a` (winner) and `b` (loser): if both are objects, union
//! keys, recursing on intersecting keys; else `a` wins whole. Arrays are
//! opaque (no element-wise merging). Types must match to recurse; on a
//! type mismatch the winner is preserved whole.

use serde_json::{Map, Value};

/// Merge `loser` into `winner` in place: `winner`'s keys always survive a
/// conflict; `loser`'s keys not present in `winner` are added.
pub fn merge_into(winner: &mut Value, loser: &Value) {
    match (winner.as_object_mut(), loser.as_object()) {
        (Some(winner_obj), Some(loser_obj)) => merge_objects(winner_obj, loser_obj),
        // Type mismatch, or either side isn't an object: winner is
        // preserved whole, nothing to do.
        _ => {}
    }
}

fn merge_objects(winner: &mut Map<String, Value>, loser: &Map<String, Value>) {
    for (key, loser_value) in loser {
        match winner.get_mut(key) {
            Some(winner_value) => merge_into(winner_value, loser_value),
            None => {
                winner.insert(key.clone(), loser_value.clone());
            }
        }
    }
}
