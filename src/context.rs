//! Execution context: the variables visible to actions and condition expressions

use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;

/// Mapping of variable names to JSON-compatible values
pub type Context = HashMap<String, JsonValue>;

/// 0-based loop counter injected by `LoopAction`
pub const LOOP_INDEX: &str = "loopIndex";

/// 1-based loop counter injected by `LoopAction`
pub const LOOP_ITERATION: &str = "loopIteration";

/// Build the context for one loop iteration
///
/// Returns a fresh shallow copy of `context` with `loopIndex` and
/// `loopIteration` set, overwriting any outer values of the same name.
pub fn with_loop_counters(context: &Context, index: i64) -> Context {
    let mut derived = context.clone();
    derived.insert(LOOP_INDEX.to_string(), JsonValue::from(index));
    derived.insert(LOOP_ITERATION.to_string(), JsonValue::from(index + 1));
    derived
}

/// Convert a JSON object into a context; `None` for any other JSON kind
pub fn from_json(value: &JsonValue) -> Option<Context> {
    value
        .as_object()
        .map(|obj| obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
}

pub fn to_json(context: &Context) -> JsonValue {
    let map: Map<String, JsonValue> = context
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    JsonValue::Object(map)
}
