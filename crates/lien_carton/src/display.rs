//! String conversion for values.
//!
//! Two flavours exist: [`to_js_string`] is the general conversion used by
//! filters and string concatenation (`null` becomes `"null"`), while
//! [`to_display_string`] is what gets written into an element, where an
//! absent value clears the element instead.

use serde_json::{Number, Value};

/// Convert a value to a string the way string coercion does.
pub fn to_js_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_string(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => join_items(items),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Convert a value to the text shown by an element. `null` renders empty.
pub fn to_display_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => to_js_string(other),
    }
}

/// Format a number without a trailing `.0` for integral values.
pub fn number_to_string(number: &Number) -> String {
    if let Some(i) = number.as_i64() {
        return i.to_string();
    }
    if let Some(u) = number.as_u64() {
        return u.to_string();
    }
    match number.as_f64() {
        Some(f) => f64_to_string(f),
        None => number.to_string(),
    }
}

/// Format a float in its shortest round-tripping form.
pub fn f64_to_string(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if f == 0.0 {
        "0".to_string()
    } else if f.fract() == 0.0 && f.abs() < 1e21 {
        format!("{f:.0}")
    } else {
        format!("{f}")
    }
}

fn join_items(items: &[Value]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&to_display_string(item));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_js_string() {
        assert_eq!(to_js_string(&json!(null)), "null");
        assert_eq!(to_js_string(&json!(3.0)), "3");
        assert_eq!(to_js_string(&json!(0.25)), "0.25");
        assert_eq!(to_js_string(&json!([1, null, "a"])), "1,,a");
        assert_eq!(to_js_string(&json!({"a": 1})), "[object Object]");
    }

    #[test]
    fn test_display_string_clears_null() {
        assert_eq!(to_display_string(&json!(null)), "");
        assert_eq!(to_display_string(&json!(false)), "false");
        assert_eq!(to_display_string(&json!(-12)), "-12");
    }
}
