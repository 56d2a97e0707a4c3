//! Built-in transforms
//!
//! Every transform maps null to null and rejects input types it does not
//! handle instead of coercing them.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::registry::Params;
use crate::error::{TransformError, TransformResult};
use crate::models::value::truncate_float;
use crate::models::FieldValue;

type Builtin = fn(FieldValue, &Params) -> TransformResult<FieldValue>;

/// Name → function table installed by `TransformRegistry::with_builtins`.
pub const BUILTINS: &[(&str, Builtin)] = &[
    ("trim", trim),
    ("upper", upper),
    ("lower", lower),
    ("parse_price", parse_price),
    ("parse_bool", parse_bool),
    ("parse_int", parse_int),
    ("map_category", map_category),
    ("slugify", slugify_transform),
    ("split", split),
    ("replace", replace),
];

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("valid number regex"));

const TRUE_WORDS: &[&str] = &["true", "t", "yes", "y", "1"];
const FALSE_WORDS: &[&str] = &["false", "f", "no", "n", "0"];

fn unsupported(name: &'static str, expected: &'static str, value: &FieldValue) -> TransformError {
    TransformError::UnsupportedInput {
        name,
        expected,
        actual: value.type_name(),
    }
}

fn unparseable(name: &'static str, input: impl Into<String>) -> TransformError {
    TransformError::Unparseable {
        name,
        input: input.into(),
    }
}

/// Apply `f` to string input, pass null through, reject everything else.
fn map_text(
    name: &'static str,
    value: FieldValue,
    f: impl FnOnce(String) -> TransformResult<FieldValue>,
) -> TransformResult<FieldValue> {
    match value {
        FieldValue::Null => Ok(FieldValue::Null),
        FieldValue::Text(s) => f(s),
        other => Err(unsupported(name, "a string", &other)),
    }
}

pub fn trim(value: FieldValue, _params: &Params) -> TransformResult<FieldValue> {
    map_text("trim", value, |s| Ok(FieldValue::Text(s.trim().to_string())))
}

pub fn upper(value: FieldValue, _params: &Params) -> TransformResult<FieldValue> {
    map_text("upper", value, |s| Ok(FieldValue::Text(s.to_uppercase())))
}

pub fn lower(value: FieldValue, _params: &Params) -> TransformResult<FieldValue> {
    map_text("lower", value, |s| Ok(FieldValue::Text(s.to_lowercase())))
}

/// Numbers become exact decimals; strings lose thousands separators and
/// yield their first signed decimal number (`"$1,299.00 each"` → `1299.00`).
pub fn parse_price(value: FieldValue, _params: &Params) -> TransformResult<FieldValue> {
    const NAME: &str = "parse_price";
    match value {
        FieldValue::Null => Ok(FieldValue::Null),
        FieldValue::Decimal(d) => Ok(FieldValue::Decimal(d)),
        FieldValue::Int(i) => Ok(FieldValue::Decimal(Decimal::from(i))),
        FieldValue::Float(f) => Decimal::from_str(&f.to_string())
            .map(FieldValue::Decimal)
            .map_err(|_| unparseable(NAME, f.to_string())),
        FieldValue::Text(s) => {
            let cleaned = s.replace(',', "");
            let found = NUMBER_RE
                .find(cleaned.trim())
                .ok_or_else(|| unparseable(NAME, s.as_str()))?;
            Decimal::from_str(found.as_str())
                .map(FieldValue::Decimal)
                .map_err(|_| unparseable(NAME, s.as_str()))
        }
        other => Err(unsupported(NAME, "a string or numeric value", &other)),
    }
}

pub fn parse_bool(value: FieldValue, _params: &Params) -> TransformResult<FieldValue> {
    const NAME: &str = "parse_bool";
    match value {
        FieldValue::Null => Ok(FieldValue::Null),
        FieldValue::Bool(b) => Ok(FieldValue::Bool(b)),
        FieldValue::Int(i) => Ok(FieldValue::Bool(i != 0)),
        FieldValue::Float(f) => truncate_float(f)
            .map(|i| FieldValue::Bool(i != 0))
            .ok_or_else(|| unparseable(NAME, f.to_string())),
        FieldValue::Decimal(d) => Ok(FieldValue::Bool(!d.trunc().is_zero())),
        FieldValue::Text(s) => {
            let folded = s.trim().to_lowercase();
            if TRUE_WORDS.contains(&folded.as_str()) {
                Ok(FieldValue::Bool(true))
            } else if FALSE_WORDS.contains(&folded.as_str()) {
                Ok(FieldValue::Bool(false))
            } else {
                Err(unparseable(NAME, s))
            }
        }
        other => Err(unsupported(NAME, "a bool, number or string", &other)),
    }
}

/// Integers pass through, floats truncate toward zero, strings lose
/// separators and parse as a float first (`"1,234.9"` → `1234`).
pub fn parse_int(value: FieldValue, _params: &Params) -> TransformResult<FieldValue> {
    const NAME: &str = "parse_int";
    match value {
        FieldValue::Null => Ok(FieldValue::Null),
        FieldValue::Int(i) => Ok(FieldValue::Int(i)),
        FieldValue::Float(f) => truncate_float(f)
            .map(FieldValue::Int)
            .ok_or_else(|| unparseable(NAME, f.to_string())),
        FieldValue::Decimal(d) => d
            .trunc()
            .to_i64()
            .map(FieldValue::Int)
            .ok_or_else(|| unparseable(NAME, d.to_string())),
        FieldValue::Text(s) => {
            let cleaned = s.replace(',', "");
            let cleaned = cleaned.trim();
            if cleaned.is_empty() {
                return Ok(FieldValue::Null);
            }
            cleaned
                .parse::<f64>()
                .ok()
                .and_then(truncate_float)
                .map(FieldValue::Int)
                .ok_or_else(|| unparseable(NAME, s.as_str()))
        }
        other => Err(unsupported(NAME, "a number or string", &other)),
    }
}

/// Look the value up in the `mapping` param; unmapped values pass through.
pub fn map_category(value: FieldValue, params: &Params) -> TransformResult<FieldValue> {
    const NAME: &str = "map_category";
    let key = match value {
        FieldValue::Null => return Ok(FieldValue::Null),
        FieldValue::Text(s) => s,
        other => return Err(unsupported(NAME, "a string", &other)),
    };
    let mapping = params
        .get("mapping")
        .ok_or_else(|| TransformError::InvalidParams {
            name: NAME,
            message: "requires a mapping param".to_string(),
        })?
        .as_object()
        .ok_or_else(|| TransformError::InvalidParams {
            name: NAME,
            message: "mapping must be an object".to_string(),
        })?;

    Ok(match mapping.get(&key) {
        Some(mapped) => FieldValue::from(mapped),
        None => FieldValue::Text(key),
    })
}

/// URL handle: lowercase ASCII words joined by single hyphens.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_dash = true;
        }
    }
    slug.trim_matches('_').to_string()
}

fn slugify_transform(value: FieldValue, _params: &Params) -> TransformResult<FieldValue> {
    map_text("slugify", value, |s| Ok(FieldValue::Text(slugify(&s))))
}

/// Split on the `separator` param (default `,`), dropping blank parts.
pub fn split(value: FieldValue, params: &Params) -> TransformResult<FieldValue> {
    let separator = params
        .get("separator")
        .and_then(|v| v.as_str())
        .unwrap_or(",")
        .to_string();
    map_text("split", value, move |s| {
        Ok(FieldValue::List(
            s.split(separator.as_str())
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| FieldValue::Text(part.to_string()))
                .collect(),
        ))
    })
}

/// Regex replace: `pattern` (required) → `value` (default empty).
pub fn replace(value: FieldValue, params: &Params) -> TransformResult<FieldValue> {
    const NAME: &str = "replace";
    let pattern = params
        .get("pattern")
        .and_then(|v| v.as_str())
        .ok_or_else(|| TransformError::InvalidParams {
            name: NAME,
            message: "requires a pattern param".to_string(),
        })?;
    let re = Regex::new(pattern).map_err(|e| TransformError::InvalidParams {
        name: NAME,
        message: format!("invalid pattern: {}", e),
    })?;
    let replacement = params.get("value").and_then(|v| v.as_str()).unwrap_or("");
    map_text(NAME, value, |s| {
        Ok(FieldValue::Text(re.replace_all(&s, replacement).to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn none() -> Params {
        Params::new()
    }

    fn params(value: serde_json::Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    #[test]
    fn test_null_passes_through_everything() {
        for (name, func) in BUILTINS {
            let p = params(json!({"mapping": {}, "pattern": "x"}));
            assert_eq!(func(FieldValue::Null, &p), Ok(FieldValue::Null), "{}", name);
        }
    }

    #[test]
    fn test_trim_and_upper_reject_non_strings() {
        assert_eq!(trim(text("  abc "), &none()), Ok(text("abc")));
        assert_eq!(upper(text("abc"), &none()), Ok(text("ABC")));
        assert!(trim(FieldValue::Int(1), &none()).is_err());
        assert!(upper(FieldValue::Bool(true), &none()).is_err());
    }

    #[test]
    fn test_chain_orders_evaluated_independently() {
        let forward = upper(trim(text("  abc "), &none()).unwrap(), &none()).unwrap();
        assert_eq!(forward, text("ABC"));

        let reversed = trim(upper(text("  abc "), &none()).unwrap(), &none()).unwrap();
        assert_eq!(reversed, text("ABC"));
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(
            parse_price(text("$19.99 each"), &none()),
            Ok(FieldValue::Decimal(Decimal::from_str("19.99").unwrap()))
        );
        assert_eq!(
            parse_price(text("1,299.50"), &none()),
            Ok(FieldValue::Decimal(Decimal::from_str("1299.50").unwrap()))
        );
        assert_eq!(
            parse_price(text("-5"), &none()),
            Ok(FieldValue::Decimal(Decimal::from(-5)))
        );
        assert_eq!(
            parse_price(FieldValue::Float(12.5), &none()),
            Ok(FieldValue::Decimal(Decimal::from_str("12.5").unwrap()))
        );
        assert!(parse_price(text("call us"), &none()).is_err());
        assert!(parse_price(FieldValue::Bool(true), &none()).is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool(text("YES "), &none()), Ok(FieldValue::Bool(true)));
        assert_eq!(parse_bool(text(" TRUE "), &none()), Ok(FieldValue::Bool(true)));
        assert_eq!(parse_bool(text("0"), &none()), Ok(FieldValue::Bool(false)));
        assert_eq!(parse_bool(text("no"), &none()), Ok(FieldValue::Bool(false)));
        assert_eq!(parse_bool(FieldValue::Int(1), &none()), Ok(FieldValue::Bool(true)));
        assert_eq!(parse_bool(FieldValue::Int(0), &none()), Ok(FieldValue::Bool(false)));
        assert_eq!(parse_bool(FieldValue::Float(0.4), &none()), Ok(FieldValue::Bool(false)));
        assert!(parse_bool(text("maybe"), &none()).is_err());
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int(FieldValue::Int(12), &none()), Ok(FieldValue::Int(12)));
        assert_eq!(parse_int(FieldValue::Float(12.7), &none()), Ok(FieldValue::Int(12)));
        assert_eq!(parse_int(FieldValue::Float(-12.7), &none()), Ok(FieldValue::Int(-12)));
        assert_eq!(parse_int(text("1,234"), &none()), Ok(FieldValue::Int(1234)));
        assert_eq!(parse_int(text("7.9"), &none()), Ok(FieldValue::Int(7)));
        assert_eq!(parse_int(text(""), &none()), Ok(FieldValue::Null));
        assert!(parse_int(text("ten"), &none()).is_err());
        assert!(parse_int(FieldValue::Bool(true), &none()).is_err());
    }

    #[test]
    fn test_map_category() {
        let p = params(json!({"mapping": {"TEE": "T-Shirts"}}));
        assert_eq!(map_category(text("TEE"), &p), Ok(text("T-Shirts")));
        assert_eq!(map_category(text("HAT"), &p), Ok(text("HAT")));
        assert!(map_category(text("TEE"), &none()).is_err());
        assert!(map_category(text("TEE"), &params(json!({"mapping": [1]}))).is_err());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Blue  --  Shirt "), "blue-shirt");
        assert_eq!(slugify("SKU_123"), "sku_123");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_split_and_replace() {
        let out = split(text("a| b ||c"), &params(json!({"separator": "|"}))).unwrap();
        assert_eq!(out, FieldValue::List(vec![text("a"), text("b"), text("c")]));

        let out = replace(text("AB-12-C"), &params(json!({"pattern": "-", "value": ""}))).unwrap();
        assert_eq!(out, text("AB12C"));
        assert!(replace(text("x"), &none()).is_err());
    }
}
