//! # Canonical Serialization: JCS (RFC 8785)
//!
//! This module defines [`CanonicalJson`], the sole construction path for text
//! that is hashed and compared against signatures anchored on the ledger.
//!
//! ## Compatibility Invariant
//!
//! The signatures were produced by a JavaScript issuer using
//! `JSON.stringify(canonicalize(value))`. Two consequences:
//!
//! 1. Canonical text must match RFC 8785 byte for byte: object keys sorted by
//!    UTF-16 code units, ECMAScript number formatting, `JSON.stringify` string
//!    escaping, no whitespace.
//! 2. The hashed text is the canonical text *encoded again as a JSON string
//!    literal* ([`CanonicalJson::to_json_literal`]). Collapsing the two steps
//!    changes every hash.
//!
//! ## Number Formatting
//!
//! Integers outside the IEEE-754 safe range are formatted from their `f64`
//! approximation, the same value a JavaScript client would have parsed.

use serde::Serialize;
use serde_json::{Number, Value};

use crate::error::CanonicalizationError;

/// 2^53, the largest magnitude at which every integer is exact in an `f64`.
const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_992;

/// Text produced exclusively by RFC 8785 canonicalization.
///
/// The inner `String` is private. Downstream code can only construct
/// `CanonicalJson` through [`CanonicalJson::new()`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalJson(String);

impl CanonicalJson {
    /// Canonicalize any serializable value.
    ///
    /// Integers beyond 2^53 are coerced to `f64` first; the rest is handed
    /// to `serde_jcs`.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = coerce_json_value(serde_json::to_value(obj)?)?;
        Ok(Self(serialize_canonical(&value)?))
    }

    /// The canonical text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the canonical text.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Encode the canonical text as a JSON string literal.
    ///
    /// This is the second half of `JSON.stringify(canonicalize(value))`: the
    /// result starts and ends with `"` and escapes the inner quotes.
    pub fn to_json_literal(&self) -> Result<String, CanonicalizationError> {
        Ok(serde_json::to_string(&self.0)?)
    }
}

impl AsRef<str> for CanonicalJson {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CanonicalJson {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Recursively coerce JSON values so that every number reads the way a
/// JavaScript client parsed it.
///
/// 1. `null`, `bool`, `string`, floats, and safe integers pass through.
/// 2. Integers beyond 2^53 become their nearest `f64`.
/// 3. `object` values and `array` elements are recursed.
fn coerce_json_value(value: Value) -> Result<Value, CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(value),
        Value::Number(ref n) => {
            let unsafe_integer = match (n.as_u64(), n.as_i64()) {
                (Some(u), _) => u > MAX_SAFE_INTEGER,
                (None, Some(i)) => i.unsigned_abs() > MAX_SAFE_INTEGER,
                (None, None) => false,
            };
            if !unsafe_integer {
                return Ok(value);
            }
            match n.as_f64() {
                Some(f) => Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or(CanonicalizationError::NonFiniteNumber(f)),
                None => Ok(value),
            }
        }
        Value::Object(map) => {
            let mut coerced = serde_json::Map::new();
            for (k, v) in map {
                coerced.insert(k, coerce_json_value(v)?);
            }
            Ok(Value::Object(coerced))
        }
        Value::Array(arr) => {
            let coerced: Result<Vec<_>, _> = arr.into_iter().map(coerce_json_value).collect();
            Ok(Value::Array(coerced?))
        }
    }
}

/// Serialize a JSON value in JCS-canonical form (RFC 8785).
///
/// `serde_jcs` sorts keys by UTF-16 code units, formats floats with the
/// ECMAScript algorithm, and escapes strings as `JSON.stringify` does.
fn serialize_canonical(value: &Value) -> Result<String, CanonicalizationError> {
    Ok(serde_jcs::to_string(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn canon(value: Value) -> String {
        CanonicalJson::new(&value).unwrap().into_string()
    }

    #[test]
    fn sorts_keys_recursively() {
        assert_eq!(
            canon(json!({"b": 2, "a": {"z": 1, "y": [{"d": 1, "c": 2}]}})),
            r#"{"a":{"y":[{"c":2,"d":1}],"z":1},"b":2}"#
        );
    }

    #[test]
    fn keys_sort_by_utf16_code_units() {
        // U+10000 encodes as a surrogate pair starting 0xD800, which sorts
        // before U+FFFF in UTF-16 even though it is the larger code point.
        let value = json!({"\u{FFFF}": 1, "\u{10000}": 2, "a": 3});
        assert_eq!(canon(value), "{\"a\":3,\"\u{10000}\":2,\"\u{FFFF}\":1}");
    }

    #[test]
    fn arrays_keep_their_order() {
        assert_eq!(canon(json!([3, 1, 2])), "[3,1,2]");
    }

    #[test]
    fn scalars() {
        assert_eq!(canon(json!(null)), "null");
        assert_eq!(canon(json!(true)), "true");
        assert_eq!(canon(json!("paris")), "\"paris\"");
        assert_eq!(canon(json!({})), "{}");
    }

    #[test]
    fn string_escaping_matches_json_stringify() {
        assert_eq!(canon(json!("a\"b\\c\n\t")), r#""a\"b\\c\n\t""#);
        assert_eq!(canon(json!("\u{1}")), r#""\u0001""#);
        assert_eq!(canon(json!("é€")), "\"é€\"");
    }

    #[test]
    fn es_number_formatting() {
        assert_eq!(canon(json!(1.5)), "1.5");
        assert_eq!(canon(json!(100.0)), "100");
        assert_eq!(canon(json!(-0.0)), "0");
        assert_eq!(canon(json!(1e21)), "1e+21");
        assert_eq!(canon(json!(1e20)), "100000000000000000000");
        assert_eq!(canon(json!(0.000001)), "0.000001");
        assert_eq!(canon(json!(1e-7)), "1e-7");
        assert_eq!(canon(json!(-2.5e-9)), "-2.5e-9");
        assert_eq!(canon(json!(123.456)), "123.456");
    }

    #[test]
    fn safe_integers_pass_through_coercion() {
        let value = json!({"n": 9007199254740992u64, "m": [-7]});
        assert_eq!(coerce_json_value(value.clone()).unwrap(), value);
    }

    #[test]
    fn unsafe_integers_follow_double_precision() {
        let value: Value = serde_json::from_str(r#"{"n":9007199254740993}"#).unwrap();
        assert_eq!(canon(value), r#"{"n":9007199254740992}"#);
        assert_eq!(canon(json!({"n": -42})), r#"{"n":-42}"#);
    }

    #[test]
    fn json_literal_double_encodes() {
        let cj = CanonicalJson::new(&json!({"city": "paris"})).unwrap();
        assert_eq!(cj.as_str(), r#"{"city":"paris"}"#);
        assert_eq!(cj.to_json_literal().unwrap(), r#""{\"city\":\"paris\"}""#);
    }
}
