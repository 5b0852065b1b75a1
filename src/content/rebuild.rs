use serde_json::{Map, Value};

use crate::config;
use crate::content::cast::cast_tracked;
use crate::schema::node::SchemaNode;

/// Degradation counters for one rebuild; the caller logs/aggregates these.
/// Rebuild anomalies are never errors, so this is the only evidence of loss.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildStats {
    /// Primitive values that could not be coerced and fell back to defaults
    pub casts_degraded: usize,
    /// Arrays demoted to objects, dropping every element after the first
    pub arrays_truncated: usize,
    /// Values whose field no longer exists in the new schema
    pub keys_dropped: usize,
}

impl RebuildStats {
    pub fn degraded(&self) -> bool {
        self.casts_degraded > 0 || self.arrays_truncated > 0 || self.keys_dropped > 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RebuildOutcome {
    pub shared: Option<Value>,
    pub translation: Option<Value>,
    pub stats: RebuildStats,
}

/// Re-derive a valid shared/translation pair after a schema change.
///
/// The old pair is union-merged into one logical value (translation winning
/// per leaf, since the old schema is gone), then re-split against the new
/// schema with every primitive leaf routed through the caster. Values whose
/// field survived structurally keep their data; everything else defaults or
/// drops. Idempotent, and total over structurally-absent data.
pub fn rebuild(
    old_shared: Option<&Value>,
    old_translation: Option<&Value>,
    new_schema: &SchemaNode,
) -> RebuildOutcome {
    let merged = union_merge(old_shared, old_translation);
    let mut stats = RebuildStats::default();
    let (shared, translation) = resplit(merged.as_ref(), new_schema, &mut stats);

    if stats.degraded() && config::config().rebuild.log_degradations {
        tracing::warn!(
            "Rebuild degraded content: {} casts defaulted, {} arrays truncated, {} keys dropped",
            stats.casts_degraded,
            stats.arrays_truncated,
            stats.keys_dropped
        );
    }

    RebuildOutcome {
        shared,
        translation,
        stats,
    }
}

/// Schema-less deep union of the old pair. The old schema no longer exists,
/// so localizable routing cannot be replayed; the translation side wins
/// wherever both halves carry a leaf.
fn union_merge(shared: Option<&Value>, translation: Option<&Value>) -> Option<Value> {
    let shared = shared.filter(|v| !v.is_null());
    let translation = translation.filter(|v| !v.is_null());

    match (shared, translation) {
        (Some(Value::Object(s)), Some(Value::Object(t))) => {
            let mut out = Map::new();
            for (key, value) in s {
                out.insert(key.clone(), value.clone());
            }
            for (key, value) in t {
                let merged = match s.get(key) {
                    Some(existing) => {
                        union_merge(Some(existing), Some(value)).unwrap_or(Value::Null)
                    }
                    None => value.clone(),
                };
                out.insert(key.clone(), merged);
            }
            Some(Value::Object(out))
        }
        (Some(Value::Array(s)), Some(Value::Array(t))) => {
            let len = s.len().max(t.len());
            let mut out = Vec::with_capacity(len);
            for i in 0..len {
                if let Some(merged) = union_merge(s.get(i), t.get(i)) {
                    out.push(merged);
                }
            }
            Some(Value::Array(out))
        }
        (_, Some(t)) => Some(t.clone()),
        (Some(s), None) => Some(s.clone()),
        (None, None) => None,
    }
}

fn resplit(
    value: Option<&Value>,
    schema: &SchemaNode,
    stats: &mut RebuildStats,
) -> (Option<Value>, Option<Value>) {
    let value = value.filter(|v| !v.is_null());

    match schema {
        SchemaNode::Primitive(prim) => {
            let (cast_value, degraded) = cast_tracked(value, prim.kind, prim.default.as_ref());
            if degraded {
                stats.casts_degraded += 1;
            }
            if prim.localizable {
                (None, Some(cast_value))
            } else {
                (Some(cast_value), None)
            }
        }
        SchemaNode::Object(obj) => {
            let map = match value {
                // Absent containers stay absent; rebuild never synthesizes
                // phantom objects
                None => return (None, None),
                Some(Value::Object(map)) => map.clone(),
                // Array -> object demotion: first element survives, the rest
                // is a deliberate loss surfaced through stats
                Some(Value::Array(items)) => {
                    if items.len() > 1 {
                        stats.arrays_truncated += 1;
                    }
                    match items.first() {
                        Some(Value::Object(map)) => map.clone(),
                        Some(_) => {
                            stats.keys_dropped += 1;
                            return (None, None);
                        }
                        None => return (None, None),
                    }
                }
                Some(_) => {
                    stats.keys_dropped += 1;
                    return (None, None);
                }
            };

            let mut shared = Map::new();
            let mut translation = Map::new();

            for (key, child_schema) in &obj.properties {
                let (s, t) = resplit(map.get(key), child_schema, stats);
                if let Some(s) = s {
                    shared.insert(key.clone(), s);
                }
                if let Some(t) = t {
                    translation.insert(key.clone(), t);
                }
            }

            // Fields removed from the schema do not survive a rebuild
            for key in map.keys() {
                if !obj.has_property(key) {
                    stats.keys_dropped += 1;
                }
            }

            (non_empty_object(shared), non_empty_object(translation))
        }
        SchemaNode::Array(arr) => {
            let items: Vec<Value> = match value {
                None => return (None, None),
                Some(Value::Array(items)) => items.clone(),
                // Component became repeatable: a bare value wraps as a
                // one-element array
                Some(other) => vec![other.clone()],
            };

            let mut shared = Vec::new();
            let mut translation = Vec::new();

            for item in &items {
                let (s, t) = resplit(Some(item), &arr.items, stats);
                if let Some(s) = s {
                    shared.push(s);
                }
                if let Some(t) = t {
                    translation.push(t);
                }
            }

            (non_empty_array(shared), non_empty_array(translation))
        }
    }
}

fn non_empty_object(map: Map<String, Value>) -> Option<Value> {
    if map.is_empty() {
        None
    } else {
        Some(Value::Object(map))
    }
}

fn non_empty_array(items: Vec<Value>) -> Option<Value> {
    if items.is_empty() {
        None
    } else {
        Some(Value::Array(items))
    }
}
