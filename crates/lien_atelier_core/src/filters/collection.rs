//! Collection filters: `filter`, `orderBy` and `limitTo`.
//!
//! None of them mutate their input; each returns a new value, or the input
//! itself when there is nothing to do.

use std::cmp::Ordering;

use lien_carton::value::{is_truthy, member, to_number};
use lien_carton::{to_js_string, Map, Value};
use lien_relief::{BinderOptions, EvaluationError};

use super::arg;

/// What `filter` keeps
pub enum Criterion<'a> {
    /// Substring of any own property value, or of a scalar item itself
    Text(String),
    /// Per-field substrings; the `$` field matches any property
    Fields(Map<String, Value>),
    /// Arbitrary predicate
    Predicate(&'a dyn Fn(&Value) -> bool),
}

impl Criterion<'_> {
    /// Interpret a filter argument. `None` means "keep everything".
    pub fn from_value(value: &Value) -> Option<Criterion<'static>> {
        match value {
            Value::Null | Value::Array(_) => None,
            Value::Object(fields) => Some(Criterion::Fields(fields.clone())),
            scalar if !is_truthy(scalar) => None,
            scalar => Some(Criterion::Text(to_js_string(scalar))),
        }
    }

    pub fn matches(&self, item: &Value) -> bool {
        match self {
            Self::Text(needle) => any_field_contains(item, needle),
            Self::Fields(fields) => fields.iter().all(|(field, wanted)| {
                let needle = to_js_string(wanted);
                if field == "$" {
                    return any_field_contains(item, &needle);
                }
                match member(item, &Value::String(field.clone())) {
                    Value::Null => false,
                    found => to_js_string(&found).contains(needle.as_str()),
                }
            }),
            Self::Predicate(predicate) => predicate(item),
        }
    }
}

fn any_field_contains(item: &Value, needle: &str) -> bool {
    match item {
        Value::Object(map) => map.values().any(|v| to_js_string(v).contains(needle)),
        Value::Array(items) => items.iter().any(|v| to_js_string(v).contains(needle)),
        Value::Null => false,
        scalar => to_js_string(scalar).contains(needle),
    }
}

/// Keep the entries of `items` matching `criterion`.
///
/// Sequences keep their order. A mapping input is restricted to the entries
/// whose value matches. Anything else is returned unchanged.
pub fn filter_items(items: &Value, criterion: &Criterion<'_>) -> Value {
    match items {
        Value::Array(list) => Value::Array(
            list.iter()
                .filter(|item| criterion.matches(item))
                .cloned()
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, item)| criterion.matches(item))
                .map(|(key, item)| (key.clone(), item.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

pub(crate) fn filter_filter(
    input: &Value,
    args: &[Value],
    _options: &BinderOptions,
) -> Result<Value, EvaluationError> {
    if !is_truthy(input) {
        return Ok(input.clone());
    }
    Ok(match arg(args, 0).and_then(Criterion::from_value) {
        Some(criterion) => filter_items(input, &criterion),
        None => input.clone(),
    })
}

/// One sort criterion for `orderBy`
pub enum OrderKey<'a> {
    /// Compare a property (the item itself when the name is empty)
    Property { name: String, descending: bool },
    /// Compare whatever the closure extracts
    Key {
        extract: &'a dyn Fn(&Value) -> Value,
        descending: bool,
    },
}

impl OrderKey<'_> {
    /// Parse `name`, `-name` or `+name`
    pub fn parse(spec: &str) -> OrderKey<'static> {
        let spec = spec.trim();
        let (descending, name) = match spec.as_bytes().first() {
            Some(b'-') => (true, &spec[1..]),
            Some(b'+') => (false, &spec[1..]),
            _ => (false, spec),
        };
        OrderKey::Property {
            name: name.trim_start().to_string(),
            descending,
        }
    }

    fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let (ordering, descending) = match self {
            Self::Property { name, descending } => {
                if name.is_empty() {
                    (compare_values(a, b), *descending)
                } else {
                    let key = Value::String(name.clone());
                    (compare_values(&member(a, &key), &member(b, &key)), *descending)
                }
            }
            Self::Key {
                extract,
                descending,
            } => (compare_values(&extract(a), &extract(b)), *descending),
        };
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// Numeric comparison when both sides coerce to numbers, lexical otherwise
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (to_number(a), to_number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => to_js_string(a).cmp(&to_js_string(b)),
    }
}

/// Stable sort of a sequence by `keys`, ties broken left to right.
///
/// Non-sequence input, or no keys, returns the input unchanged.
pub fn order_by(items: &Value, keys: &[OrderKey<'_>], reverse: bool) -> Value {
    let Value::Array(list) = items else {
        return items.clone();
    };
    if keys.is_empty() {
        return items.clone();
    }
    let mut sorted = list.clone();
    sorted.sort_by(|a, b| {
        let ordering = keys
            .iter()
            .map(|key| key.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal);
        if reverse {
            ordering.reverse()
        } else {
            ordering
        }
    });
    Value::Array(sorted)
}

pub(crate) fn order_by_filter(
    input: &Value,
    args: &[Value],
    _options: &BinderOptions,
) -> Result<Value, EvaluationError> {
    let keys: Vec<OrderKey<'static>> = match arg(args, 0) {
        None => return Ok(input.clone()),
        Some(Value::String(spec)) => vec![OrderKey::parse(spec)],
        Some(Value::Array(specs)) => specs
            .iter()
            .map(|spec| match spec {
                Value::String(spec) => Ok(OrderKey::parse(spec)),
                other => Err(EvaluationError::filter(
                    "orderBy",
                    format!("sort key must be a string, found {}", to_js_string(other)),
                )),
            })
            .collect::<Result<_, _>>()?,
        Some(other) => {
            return Err(EvaluationError::filter(
                "orderBy",
                format!("sort key must be a string, found {}", to_js_string(other)),
            ))
        }
    };
    let reverse = arg(args, 1).is_some_and(is_truthy);
    Ok(order_by(input, &keys, reverse))
}

/// Slice a sequence or string.
///
/// A positive `start` skips that many entries from the front, a negative one
/// drops that many from the end; either is ignored when out of range. Then a
/// positive `limit` keeps that many from the front and a negative one that
/// many from the end, again only when in range.
pub fn limit_to(items: &Value, limit: i64, start: Option<i64>) -> Value {
    match items {
        Value::Array(list) => {
            let (from, to) = limit_range(list.len(), limit, start);
            Value::Array(list[from..to].to_vec())
        }
        Value::String(text) => {
            let chars: Vec<char> = text.chars().collect();
            let (from, to) = limit_range(chars.len(), limit, start);
            Value::String(chars[from..to].iter().collect())
        }
        other => other.clone(),
    }
}

fn limit_range(len: usize, limit: i64, start: Option<i64>) -> (usize, usize) {
    let (mut from, mut to) = (0usize, len);
    let in_range = |n: i64, len: usize| n.unsigned_abs() < len as u64;

    match start {
        Some(s) if s > 0 && in_range(s, len) => from = s as usize,
        Some(s) if s < 0 && in_range(s, len) => to = len - s.unsigned_abs() as usize,
        _ => {}
    }

    let remaining = to - from;
    if limit > 0 && in_range(limit, remaining) {
        to = from + limit as usize;
    } else if limit < 0 && in_range(limit, remaining) {
        from = to - limit.unsigned_abs() as usize;
    }
    (from, to)
}

pub(crate) fn limit_to_filter(
    input: &Value,
    args: &[Value],
    _options: &BinderOptions,
) -> Result<Value, EvaluationError> {
    let as_integer = |value: &Value| to_number(value).filter(|n| n.is_finite()).map(|n| n.trunc() as i64);
    // A missing limit keeps everything after `start`
    let limit = arg(args, 0).and_then(as_integer).unwrap_or(0);
    let start = arg(args, 1).and_then(as_integer).filter(|s| *s != 0);
    if limit == 0 && start.is_none() {
        return Ok(input.clone());
    }
    Ok(limit_to(input, limit, start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options() -> BinderOptions {
        BinderOptions::default()
    }

    fn people() -> Value {
        json!([
            {"name": "Ann", "city": "Oslo", "n": 3},
            {"name": "Bob", "city": "Rome", "n": 1},
            {"name": "Cid", "city": "Oslo", "n": 2}
        ])
    }

    fn names(value: &Value) -> Vec<String> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["name"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_filter_by_text() {
        let out = filter_filter(&people(), &[json!("Oslo")], &options()).unwrap();
        assert_eq!(names(&out), ["Ann", "Cid"]);

        let words = json!(["apple", "banana", "cherry"]);
        let out = filter_filter(&words, &[json!("an")], &options()).unwrap();
        assert_eq!(out, json!(["banana"]));
    }

    #[test]
    fn test_filter_by_fields() {
        let out = filter_filter(&people(), &[json!({"city": "Os", "name": "C"})], &options()).unwrap();
        assert_eq!(names(&out), ["Cid"]);

        let out = filter_filter(&people(), &[json!({"$": "Bo"})], &options()).unwrap();
        assert_eq!(names(&out), ["Bob"]);

        let out = filter_filter(&people(), &[json!({"missing": "x"})], &options()).unwrap();
        assert_eq!(out, json!([]));
    }

    #[test]
    fn test_filter_empty_inputs_pass_through() {
        assert_eq!(filter_filter(&people(), &[json!("")], &options()).unwrap(), people());
        assert_eq!(filter_filter(&people(), &[], &options()).unwrap(), people());
        assert_eq!(
            filter_filter(&Value::Null, &[json!("x")], &options()).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn test_filter_mapping_input() {
        let map = json!({"a": "red", "b": "blue", "c": "green"});
        let out = filter_filter(&map, &[json!("re")], &options()).unwrap();
        assert_eq!(out, json!({"a": "red", "c": "green"}));
    }

    #[test]
    fn test_filter_predicate() {
        let over_one = |item: &Value| item["n"].as_i64().unwrap_or(0) > 1;
        let out = filter_items(&people(), &Criterion::Predicate(&over_one));
        assert_eq!(names(&out), ["Ann", "Cid"]);
    }

    #[test]
    fn test_order_by_property() {
        let asc = order_by_filter(&people(), &[json!("n")], &options()).unwrap();
        assert_eq!(names(&asc), ["Bob", "Cid", "Ann"]);

        let desc = order_by_filter(&people(), &[json!("-n")], &options()).unwrap();
        assert_eq!(names(&desc), ["Ann", "Cid", "Bob"]);

        let reversed = order_by_filter(&people(), &[json!("+n"), json!(true)], &options()).unwrap();
        assert_eq!(names(&reversed), ["Ann", "Cid", "Bob"]);
    }

    #[test]
    fn test_order_by_ties_and_stability() {
        let out = order_by_filter(&people(), &[json!(["city", "-name"])], &options()).unwrap();
        assert_eq!(names(&out), ["Cid", "Ann", "Bob"]);

        // Equal keys keep their input order
        let out = order_by_filter(&people(), &[json!("city")], &options()).unwrap();
        assert_eq!(names(&out), ["Ann", "Cid", "Bob"]);
    }

    #[test]
    fn test_order_by_item_itself() {
        let out = order_by_filter(&json!([10, 9, "8", 100]), &[json!("")], &options()).unwrap();
        assert_eq!(out, json!(["8", 9, 10, 100]));

        let out = order_by_filter(&json!(["pear", "apple"]), &[json!("")], &options()).unwrap();
        assert_eq!(out, json!(["apple", "pear"]));
    }

    #[test]
    fn test_order_by_key_closure() {
        let name_len = |item: &Value| json!(item["name"].as_str().map_or(0, str::len));
        let items = json!([{"name": "abc"}, {"name": "a"}, {"name": "ab"}]);
        let out = order_by(
            &items,
            &[OrderKey::Key {
                extract: &name_len,
                descending: true,
            }],
            false,
        );
        assert_eq!(out, json!([{"name": "abc"}, {"name": "ab"}, {"name": "a"}]));
    }

    #[test]
    fn test_order_by_does_not_mutate() {
        let input = json!([3, 1, 2]);
        let out = order_by(&input, &[OrderKey::parse("")], false);
        assert_eq!(out, json!([1, 2, 3]));
        assert_eq!(input, json!([3, 1, 2]));
    }

    #[test]
    fn test_limit_to_composes() {
        let first_three = limit_to_filter(&json!([1, 2, 3, 4, 5]), &[json!(3)], &options()).unwrap();
        let last = limit_to_filter(&first_three, &[json!(-1)], &options()).unwrap();
        assert_eq!(last, json!([3]));
    }

    #[test]
    fn test_limit_to_start() {
        let items = json!([1, 2, 3, 4, 5]);
        assert_eq!(limit_to(&items, 2, Some(1)), json!([2, 3]));
        assert_eq!(limit_to(&items, -2, Some(-1)), json!([3, 4]));
        // Out-of-range values are ignored
        assert_eq!(limit_to(&items, 9, Some(7)), items);
        assert_eq!(limit_to(&items, -5, None), items);
    }

    #[test]
    fn test_limit_to_start_without_limit() {
        let items = json!([1, 2, 3, 4, 5]);
        let skip_two = limit_to_filter(&items, &[Value::Null, json!(2)], &options()).unwrap();
        assert_eq!(skip_two, json!([3, 4, 5]));
        let drop_last = limit_to_filter(&items, &[Value::Null, json!(-1)], &options()).unwrap();
        assert_eq!(drop_last, json!([1, 2, 3, 4]));
        assert_eq!(limit_to(&items, 0, Some(3)), json!([4, 5]));
        assert_eq!(limit_to_filter(&items, &[], &options()).unwrap(), items);
    }

    #[test]
    fn test_limit_to_string() {
        assert_eq!(limit_to(&json!("héllo"), 3, None), json!("hél"));
        assert_eq!(
            limit_to_filter(&json!("hello"), &[json!("-2")], &options()).unwrap(),
            json!("lo")
        );
    }
}
