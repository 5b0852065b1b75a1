use serde_json::{Number, Value};

use crate::schema::node::PrimitiveKind;

/// Best-effort coercion of a value to a primitive kind. Total: never fails.
///
/// Missing or null values resolve to the declared default, else the kind's
/// zero value. Present values of the wrong native type are coerced rather
/// than rejected, degrading to the default/zero value where no sensible
/// coercion exists. The rebuilder relies on this totality to always
/// terminate with a valid document after a primitive kind change.
pub fn cast(value: Option<&Value>, kind: PrimitiveKind, default: Option<&Value>) -> Value {
    cast_tracked(value, kind, default).0
}

/// As `cast`, additionally reporting whether the value was lossily degraded
/// (for rebuild-stats accounting; absence resolving to a default does not
/// count as a degradation)
pub fn cast_tracked(
    value: Option<&Value>,
    kind: PrimitiveKind,
    default: Option<&Value>,
) -> (Value, bool) {
    match value {
        None | Some(Value::Null) => (fallback(kind, default), false),
        Some(present) => coerce(present, kind, default),
    }
}

fn fallback(kind: PrimitiveKind, default: Option<&Value>) -> Value {
    match default {
        // The default itself is coerced so a stale declared default can
        // never smuggle a wrong-kinded value into a document
        Some(d) if !d.is_null() => coerce(d, kind, None).0,
        _ => kind.zero_value(),
    }
}

fn coerce(value: &Value, kind: PrimitiveKind, default: Option<&Value>) -> (Value, bool) {
    match kind {
        PrimitiveKind::String => match value {
            Value::String(_) => (value.clone(), false),
            Value::Number(n) => (Value::String(n.to_string()), false),
            Value::Bool(b) => (Value::String(b.to_string()), false),
            _ => (fallback(kind, default), true),
        },
        PrimitiveKind::Number => match value {
            Value::Number(_) => (value.clone(), false),
            Value::String(s) => parse_number(s),
            Value::Bool(b) => (Value::from(if *b { 1 } else { 0 }), false),
            _ => (fallback(kind, default), true),
        },
        PrimitiveKind::Boolean => match value {
            Value::Bool(_) => (value.clone(), false),
            Value::String(s) => (Value::Bool(!s.is_empty()), false),
            Value::Number(n) => {
                let truthy = n.as_f64().map(|f| f != 0.0).unwrap_or(false);
                (Value::Bool(truthy), false)
            }
            // Containers are truthy
            Value::Array(_) | Value::Object(_) => (Value::Bool(true), false),
            Value::Null => (fallback(kind, default), false),
        },
    }
}

/// Numeric parse with NaN-to-zero semantics; integers stay integers
fn parse_number(s: &str) -> (Value, bool) {
    let trimmed = s.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return (Value::from(i), false);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() => match Number::from_f64(f) {
            Some(n) => (Value::Number(n), false),
            None => (Value::from(0), true),
        },
        _ => (Value::from(0), true),
    }
}
