//! Coercion and comparison rules for the dynamic value model.
//!
//! Values are `serde_json::Value`s. Bindings compare and convert them the way
//! a browser form would: `"1"` loosely equals `1`, `null` stands for "absent",
//! and composites are compared by content.

use serde_json::{Number, Value};

use crate::display::to_js_string;

/// Whether the value is a mapping or a sequence.
#[inline]
pub fn is_composite(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// Truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numeric coercion. `None` means the value is not a number (`NaN`).
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        Value::Array(items) => match items.as_slice() {
            [] => Some(0.0),
            [single] if !is_composite(single) => match single {
                Value::Null => Some(0.0),
                other => to_number(other),
            },
            _ => None,
        },
        Value::Object(_) => None,
    }
}

/// Parse a string the way numeric coercion does: surrounding whitespace is
/// ignored and the empty string is zero.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    match trimmed {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    // Rust accepts "inf"/"nan" spellings that are not numbers here.
    if trimmed
        .bytes()
        .any(|b| !(b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E')))
    {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Build a number value, keeping integral results integral.
///
/// Non-finite results have no representation in the value model and become
/// `null`.
pub fn from_number(number: f64) -> Value {
    if number.is_finite() && number.fract() == 0.0 && number.abs() < 9_007_199_254_740_992.0 {
        Value::Number(Number::from(number as i64))
    } else {
        Number::from_f64(number).map_or(Value::Null, Value::Number)
    }
}

/// Loose equality (`==`).
///
/// Scalars of different kinds are compared numerically; composites are
/// compared by content, which is what reference identity amounts to for
/// values that are copied rather than shared.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
        (Value::Array(_) | Value::Object(_), Value::Array(_) | Value::Object(_)) => a == b,
        (Value::Array(_) | Value::Object(_), scalar) => {
            loose_eq(&Value::String(to_js_string(a)), scalar)
        }
        (scalar, Value::Array(_) | Value::Object(_)) => {
            loose_eq(scalar, &Value::String(to_js_string(b)))
        }
        _ => match (to_number(a), to_number(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
    }
}

/// Structural equality used to detect model-side changes.
///
/// Every own entry of `a` must loosely equal the same entry of `b`. Entries
/// present only on `b` are not looked at, so `{a: 1}` equals `{a: 1, b: 2}`
/// but not the other way around.
pub fn structural_eq(a: &Value, b: &Value) -> bool {
    if loose_eq(a, b) {
        return true;
    }
    if a.is_null() || b.is_null() {
        return false;
    }
    match (a, b) {
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| loose_eq(l, r))
        }
        (Value::Array(x), Value::Object(y)) => x
            .iter()
            .enumerate()
            .all(|(i, l)| loose_eq(l, y.get(&i.to_string()).unwrap_or(&Value::Null))),
        (Value::Object(x), Value::Object(_) | Value::Array(_)) => x
            .iter()
            .all(|(key, l)| loose_eq(l, entry(b, key).unwrap_or(&Value::Null))),
        _ => false,
    }
}

/// Own entry of a composite by key. Sequence entries are addressed by their
/// decimal index.
pub fn entry<'v>(value: &'v Value, key: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Member access with the coercions of the expression language: sequences and
/// strings expose `length` and numeric indices, mappings their keys, and
/// everything else yields `null`.
pub fn member(value: &Value, key: &Value) -> Value {
    match value {
        Value::Object(map) => map.get(&to_js_string(key)).cloned().unwrap_or(Value::Null),
        Value::Array(items) => match key {
            Value::String(s) if s == "length" => Value::from(items.len()),
            _ => index_of(key)
                .and_then(|i| items.get(i))
                .cloned()
                .unwrap_or(Value::Null),
        },
        Value::String(s) => match key {
            Value::String(k) if k == "length" => Value::from(s.chars().count()),
            _ => index_of(key)
                .and_then(|i| s.chars().nth(i))
                .map(|c| Value::String(c.to_string()))
                .unwrap_or(Value::Null),
        },
        _ => Value::Null,
    }
}

fn index_of(key: &Value) -> Option<usize> {
    match key {
        Value::Number(n) => n.as_u64().map(|i| i as usize),
        Value::String(s) => s.parse::<usize>().ok(),
        _ => None,
    }
}

/// Human-readable kind of a value, for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
    }

    #[test]
    fn test_to_number() {
        assert_eq!(to_number(&json!(" 42 ")), Some(42.0));
        assert_eq!(to_number(&json!("")), Some(0.0));
        assert_eq!(to_number(&json!(true)), Some(1.0));
        assert_eq!(to_number(&json!("abc")), None);
        assert_eq!(to_number(&json!("inf")), None);
        assert_eq!(to_number(&json!([7])), Some(7.0));
        assert_eq!(to_number(&json!({"a": 1})), None);
    }

    #[test]
    fn test_from_number_keeps_integers() {
        assert_eq!(from_number(3.0), json!(3));
        assert_eq!(from_number(2.5), json!(2.5));
        assert_eq!(from_number(f64::NAN), Value::Null);
    }

    #[test]
    fn test_loose_eq_coerces_scalars() {
        assert!(loose_eq(&json!("1"), &json!(1)));
        assert!(loose_eq(&json!(1), &json!(true)));
        assert!(loose_eq(&json!("1.0"), &json!(1)));
        assert!(!loose_eq(&json!(""), &json!(null)));
        assert!(!loose_eq(&json!("a"), &json!(0)));
        assert!(loose_eq(&json!([1, 2]), &json!("1,2")));
    }

    #[test]
    fn test_structural_eq_is_asymmetric() {
        let small = json!({"a": 1});
        let large = json!({"a": 1, "b": 2});
        assert!(structural_eq(&small, &large));
        assert!(!structural_eq(&large, &small));
    }

    #[test]
    fn test_structural_eq_sequences() {
        assert!(structural_eq(&json!([1, "2"]), &json!([1, 2])));
        assert!(!structural_eq(&json!([1, 2]), &json!([1, 2, 3])));
        assert!(!structural_eq(&json!([]), &json!([1])));
        assert!(!structural_eq(&json!({"a": 1}), &json!(null)));
        assert!(!structural_eq(&json!({"a": 1}), &json!("x")));
    }

    #[test]
    fn test_member_access() {
        assert_eq!(member(&json!([10, 20]), &json!(1)), json!(20));
        assert_eq!(member(&json!([10, 20]), &json!("length")), json!(2));
        assert_eq!(member(&json!("héllo"), &json!("length")), json!(5));
        assert_eq!(member(&json!({"1": "x"}), &json!(1)), json!("x"));
        assert_eq!(member(&json!(5), &json!("a")), Value::Null);
    }
}
