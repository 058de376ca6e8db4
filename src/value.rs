use std::collections::BTreeMap;
use serde::Serialize;
use thiserror::Error;

/// An argument value. Every variant except `Unquoted` is written as JSON;
/// `Unquoted` is written verbatim and is meant for enum-like values.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    /// Integers above `i64::MAX`.
    UInt(u64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Unquoted(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EncodeError {
    #[error("float {0} has no JSON representation")]
    NonFiniteFloat(f64),
    #[error("`{0}` is not a valid unquoted literal")]
    InvalidLiteral(String),
}

impl Value {
    pub fn unquoted(literal: impl Into<String>) -> Value {
        Value::Unquoted(literal.into())
    }

    pub fn from_json(value: serde_json::Value) -> Value {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(number) => {
                if let Some(int) = number.as_i64() {
                    Value::Int(int)
                } else if let Some(uint) = number.as_u64() {
                    Value::UInt(uint)
                } else {
                    Value::Float(number.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::List(items.into_iter().map(Value::from_json).collect()),
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter().map(|(k, v)| (k, Value::from_json(v))).collect()
            ),
        }
    }

    /// Converts any serializable value into an argument value.
    pub fn serialize<T: Serialize + ?Sized>(value: &T) -> Result<Value, serde_json::Error> {
        serde_json::to_value(value).map(Value::from_json)
    }

    pub fn encode(&self) -> Result<String, EncodeError> {
        let mut out = String::new();
        self.encode_into(&mut out)?;
        Ok(out)
    }

    fn encode_into(&self, out: &mut String) -> Result<(), EncodeError> {
        match self {
            Value::Null => out.push_str("null"),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Int(int) => out.push_str(&int.to_string()),
            Value::UInt(uint) => out.push_str(&uint.to_string()),
            Value::Float(float) => {
                let number = serde_json::Number::from_f64(*float)
                    .ok_or(EncodeError::NonFiniteFloat(*float))?;
                out.push_str(&number.to_string());
            }
            Value::String(s) => out.push_str(&quote(s)),
            Value::List(items) => {
                out.push('[');
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        out.push(',');
                    }
                    item.encode_into(out)?;
                }
                out.push(']');
            }
            Value::Map(entries) => {
                out.push('{');
                for (index, (key, item)) in entries.iter().enumerate() {
                    if index > 0 {
                        out.push(',');
                    }
                    out.push_str(&quote(key));
                    out.push(':');
                    item.encode_into(out)?;
                }
                out.push('}');
            }
            Value::Unquoted(literal) => {
                if !is_name(literal) {
                    return Err(EncodeError::InvalidLiteral(literal.clone()));
                }
                out.push_str(literal);
            }
        }
        Ok(())
    }
}

fn quote(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

// /[_A-Za-z][_0-9A-Za-z]*/
fn is_name(literal: &str) -> bool {
    let mut chars = literal.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! from_lossless_int {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::Int(value.into())
            }
        }
    )*};
}

from_lossless_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(int) => Value::Int(int),
            Err(_) => Value::UInt(value),
        }
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::from(value as u64)
    }
}

impl From<isize> for Value {
    fn from(value: isize) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Value::Map(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Value::from_json(value)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;
    use super::*;

    #[rstest]
    #[case::null(Value::Null, "null")]
    #[case::bool(Value::from(true), "true")]
    #[case::int(Value::from(-42), "-42")]
    #[case::float(Value::from(1.5), "1.5")]
    #[case::small_unsigned(Value::from(7u64), "7")]
    #[case::large_unsigned(Value::from(u64::MAX), "18446744073709551615")]
    #[case::length(Value::from(vec![0u8; 3].len()), "3")]
    #[case::single_precision(Value::from(0.25f32), "0.25")]
    #[case::string(Value::from("one"), "\"one\"")]
    #[case::escaped(Value::from("say \"hi\"\n"), "\"say \\\"hi\\\"\\n\"")]
    #[case::list(Value::from(vec![1, 2, 3]), "[1,2,3]")]
    #[case::unquoted(Value::unquoted("DESC"), "DESC")]
    #[case::none(Value::from(None::<i32>), "null")]
    fn encodes_scalars(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(value.encode().unwrap(), expected);
    }

    #[test]
    fn map_keys_are_sorted_and_quoted() {
        let value = Value::from(json!({ "zeta": 1, "alpha": [true, null], "mid": { "x": "y" } }));
        assert_eq!(value.encode().unwrap(), r#"{"alpha":[true,null],"mid":{"x":"y"},"zeta":1}"#);
    }

    #[test]
    fn unquoted_literals_stay_bare_inside_lists() {
        let value = Value::List(vec![Value::unquoted("ASC"), Value::from("ASC")]);
        assert_eq!(value.encode().unwrap(), r#"[ASC,"ASC"]"#);
    }

    #[rstest]
    #[case::nan(Value::Float(f64::NAN))]
    #[case::infinite(Value::List(vec![Value::Float(f64::INFINITY)]))]
    fn non_finite_floats_are_rejected(#[case] value: Value) {
        assert!(matches!(value.encode(), Err(EncodeError::NonFiniteFloat(_))));
    }

    #[rstest]
    #[case::empty("")]
    #[case::leading_digit("1st")]
    #[case::injection("A) { secret }")]
    fn invalid_literals_are_rejected(#[case] literal: &str) {
        assert_eq!(
            Value::unquoted(literal).encode(),
            Err(EncodeError::InvalidLiteral(literal.to_string()))
        );
    }

    #[test]
    fn large_unsigned_integers_stay_exact() {
        let value = Value::serialize(&u64::MAX).unwrap();
        assert_eq!(value, Value::UInt(u64::MAX));
        assert_eq!(value.encode().unwrap(), "18446744073709551615");
        assert_eq!(Value::serialize(&(i64::MAX as u64)).unwrap(), Value::Int(i64::MAX));
        assert_eq!(Value::from(json!(-5)), Value::Int(-5));
    }

    #[derive(Serialize)]
    struct Filter {
        name: &'static str,
        limit: u32,
    }

    #[test]
    fn serializable_values_convert() {
        let value = Value::serialize(&Filter { name: "bob", limit: 10 }).unwrap();
        assert_eq!(value.encode().unwrap(), r#"{"limit":10,"name":"bob"}"#);
    }
}
