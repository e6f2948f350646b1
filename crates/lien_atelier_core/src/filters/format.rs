//! Scalar formatting filters: `number`, `currency`, `date`, `json`,
//! `lowercase` and `uppercase`.

use lien_carton::value::{is_truthy, to_number};
use lien_carton::{to_js_string, Value};
use lien_relief::{BinderOptions, EvaluationError};

use super::{arg, Filter};

/// External date formatter: `(value, format) -> formatted`
pub type DateFormatter = dyn Fn(&Value, Option<&str>) -> Value;

/// Group the integer part of a number every three digits and fix its
/// fraction to `fraction_digits` places (padding with zeros or truncating).
///
/// Falsy values (`null`, `0`, `""`) are returned unchanged. Without
/// `fraction_digits` the fraction is kept as it is; `Some(0)` drops it.
pub fn format_number(
    value: &Value,
    fraction_digits: Option<usize>,
    separator: &str,
    decimal_symbol: &str,
) -> Value {
    if !is_truthy(value) {
        return value.clone();
    }
    Value::String(group_digits(
        &to_js_string(value),
        fraction_digits,
        separator,
        decimal_symbol,
    ))
}

/// [`format_number`] behind a currency symbol. `null` and the empty string
/// pass through; every other value is prefixed, so zero reads `$0`.
pub fn format_currency(
    value: &Value,
    symbol: &str,
    fraction_digits: usize,
    separator: &str,
    decimal_symbol: &str,
) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::String(s) if s.is_empty() => value.clone(),
        other => {
            let number = format_number(other, Some(fraction_digits), separator, decimal_symbol);
            Value::String(format!("{symbol}{}", to_js_string(&number)))
        }
    }
}

fn group_digits(
    text: &str,
    fraction_digits: Option<usize>,
    separator: &str,
    decimal_symbol: &str,
) -> String {
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let fraction: Option<String> = match fraction_digits {
        Some(0) => None,
        Some(digits) => {
            let mut kept: String = fraction.unwrap_or("").chars().take(digits).collect();
            while kept.chars().count() < digits {
                kept.push('0');
            }
            Some(kept)
        }
        None => fraction.map(str::to_string),
    };

    let mut out = String::with_capacity(text.len() + integer.len() / 3 * separator.len() + 4);
    out.push_str(sign);
    let len = integer.chars().count();
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    if let Some(fraction) = fraction {
        out.push_str(decimal_symbol);
        out.push_str(&fraction);
    }
    out
}

fn digits_arg(filter: &str, args: &[Value], index: usize) -> Result<Option<usize>, EvaluationError> {
    match arg(args, index) {
        None => Ok(None),
        Some(value) => match to_number(value) {
            Some(n) if n.is_finite() && n >= 0.0 => Ok(Some(n.trunc() as usize)),
            _ => Err(EvaluationError::filter(
                filter,
                format!("fraction digits must be a non-negative number, found {}", to_js_string(value)),
            )),
        },
    }
}

fn text_arg(args: &[Value], index: usize) -> Option<String> {
    arg(args, index).map(to_js_string)
}

pub(crate) fn number_filter(
    input: &Value,
    args: &[Value],
    options: &BinderOptions,
) -> Result<Value, EvaluationError> {
    let digits = digits_arg("number", args, 0)?;
    let separator = text_arg(args, 1).unwrap_or_else(|| options.number_separator.clone());
    let decimal = text_arg(args, 2).unwrap_or_else(|| options.decimal_symbol.clone());
    Ok(format_number(input, digits, &separator, &decimal))
}

pub(crate) fn currency_filter(
    input: &Value,
    args: &[Value],
    options: &BinderOptions,
) -> Result<Value, EvaluationError> {
    let symbol = arg(args, 0)
        .filter(|symbol| is_truthy(symbol))
        .map(to_js_string)
        .unwrap_or_else(|| options.currency_symbol.clone());
    // 0 digits falls back to 2, like a missing argument
    let digits = digits_arg("currency", args, 1)?
        .filter(|digits| *digits != 0)
        .unwrap_or(2);
    let separator = text_arg(args, 2).unwrap_or_else(|| options.number_separator.clone());
    let decimal = text_arg(args, 3).unwrap_or_else(|| options.decimal_symbol.clone());
    Ok(format_currency(input, &symbol, digits, &separator, &decimal))
}

/// The `date` filter: delegates to an installed formatter, or returns its
/// input unchanged.
#[derive(Default)]
pub struct DateFilter {
    formatter: Option<Box<DateFormatter>>,
}

impl DateFilter {
    pub fn with_formatter(formatter: impl Fn(&Value, Option<&str>) -> Value + 'static) -> Self {
        Self {
            formatter: Some(Box::new(formatter)),
        }
    }
}

impl Filter for DateFilter {
    fn apply(
        &self,
        input: &Value,
        args: &[Value],
        _options: &BinderOptions,
    ) -> Result<Value, EvaluationError> {
        Ok(match &self.formatter {
            Some(formatter) => formatter(input, arg(args, 0).and_then(Value::as_str)),
            None => input.clone(),
        })
    }
}

pub(crate) fn json_filter(
    input: &Value,
    _args: &[Value],
    _options: &BinderOptions,
) -> Result<Value, EvaluationError> {
    serde_json::to_string(input)
        .map(Value::String)
        .map_err(|err| EvaluationError::filter("json", err.to_string()))
}

pub(crate) fn lowercase_filter(
    input: &Value,
    _args: &[Value],
    _options: &BinderOptions,
) -> Result<Value, EvaluationError> {
    if !is_truthy(input) {
        return Ok(input.clone());
    }
    Ok(Value::String(to_js_string(input).to_lowercase()))
}

pub(crate) fn uppercase_filter(
    input: &Value,
    _args: &[Value],
    _options: &BinderOptions,
) -> Result<Value, EvaluationError> {
    if !is_truthy(input) {
        return Ok(input.clone());
    }
    Ok(Value::String(to_js_string(input).to_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn number(value: Value, args: &[Value]) -> Value {
        number_filter(&value, args, &BinderOptions::default()).unwrap()
    }

    #[test]
    fn test_number_grouping() {
        assert_eq!(number(json!(1234567), &[]), json!("1,234,567"));
        assert_eq!(number(json!(123), &[]), json!("123"));
        assert_eq!(number(json!(1234.5), &[]), json!("1,234.5"));
        assert_eq!(number(json!("9876"), &[]), json!("9,876"));
    }

    #[test]
    fn test_number_sign_not_grouped() {
        assert_eq!(number(json!(-123), &[]), json!("-123"));
        assert_eq!(number(json!(-1234), &[]), json!("-1,234"));
    }

    #[test]
    fn test_number_fraction_digits() {
        assert_eq!(number(json!(1.5), &[json!(3)]), json!("1.500"));
        assert_eq!(number(json!(1.23456), &[json!(2)]), json!("1.23"));
        assert_eq!(number(json!(12), &[json!(2)]), json!("12.00"));
        assert_eq!(number(json!(12.9), &[json!(0)]), json!("12"));
    }

    #[test]
    fn test_number_custom_symbols() {
        assert_eq!(
            number(json!(1234.5), &[json!(2), json!("."), json!(",")]),
            json!("1.234,50")
        );
        let options = BinderOptions {
            number_separator: " ".to_string(),
            ..Default::default()
        };
        assert_eq!(
            number_filter(&json!(1000000), &[], &options).unwrap(),
            json!("1 000 000")
        );
    }

    #[test]
    fn test_number_falsy_passthrough() {
        assert_eq!(number(json!(0), &[json!(2)]), json!(0));
        assert_eq!(number(Value::Null, &[]), Value::Null);
        assert_eq!(number(json!(""), &[]), json!(""));
    }

    #[test]
    fn test_number_bad_digits() {
        let err = number_filter(&json!(1), &[json!("many")], &BinderOptions::default()).unwrap_err();
        assert!(matches!(err, EvaluationError::Filter { .. }));
    }

    #[test]
    fn test_currency() {
        let options = BinderOptions::default();
        let currency = |value: Value, args: &[Value]| currency_filter(&value, args, &options).unwrap();
        assert_eq!(currency(json!(1234.5), &[]), json!("$1,234.50"));
        assert_eq!(currency(json!(3), &[json!("€"), json!(1)]), json!("€3.0"));
        assert_eq!(currency(json!(3), &[json!("€"), json!(0)]), json!("€3.00"));
        // Zero is passed through by `number`, then prefixed
        assert_eq!(currency(json!(0), &[]), json!("$0"));
        assert_eq!(currency(json!(""), &[]), json!(""));
        assert_eq!(currency(Value::Null, &[]), Value::Null);

        let euro = BinderOptions {
            currency_symbol: "€".to_string(),
            number_separator: ".".to_string(),
            decimal_symbol: ",".to_string(),
        };
        assert_eq!(
            currency_filter(&json!(1999.99), &[], &euro).unwrap(),
            json!("€1.999,99")
        );
    }

    #[test]
    fn test_case_filters() {
        let options = BinderOptions::default();
        assert_eq!(
            uppercase_filter(&json!("Mixed"), &[], &options).unwrap(),
            json!("MIXED")
        );
        assert_eq!(
            lowercase_filter(&json!("Mixed"), &[], &options).unwrap(),
            json!("mixed")
        );
        assert_eq!(uppercase_filter(&Value::Null, &[], &options).unwrap(), Value::Null);
        assert_eq!(lowercase_filter(&json!(""), &[], &options).unwrap(), json!(""));
    }

    #[test]
    fn test_json() {
        let out = json_filter(&json!({"a": [1, null]}), &[], &BinderOptions::default()).unwrap();
        assert_eq!(out, json!(r#"{"a":[1,null]}"#));
    }

    #[test]
    fn test_date_without_formatter() {
        let out = DateFilter::default()
            .apply(&json!(1700000000), &[json!("yyyy")], &BinderOptions::default())
            .unwrap();
        assert_eq!(out, json!(1700000000));
    }
}
