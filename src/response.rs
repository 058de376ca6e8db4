use std::collections::HashMap;
use std::fmt;
use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;
use crate::error::SerializationError;

/// Outermost structure of a response body. Payloads under `data` stay
/// undecoded until they reach their sink. Only a JSON object is accepted.
#[derive(Debug, Default)]
pub struct ResponseEnvelope {
    pub data: Option<HashMap<String, Box<RawValue>>>,
    pub errors: Option<Vec<ServerError>>,
}

impl<'de> Deserialize<'de> for ResponseEnvelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(EnvelopeVisitor)
    }
}

struct EnvelopeVisitor;

impl<'de> Visitor<'de> for EnvelopeVisitor {
    type Value = ResponseEnvelope;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a response object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ResponseEnvelope, A::Error> {
        let mut envelope = ResponseEnvelope::default();
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "data" => envelope.data = map.next_value()?,
                "errors" => envelope.errors = map.next_value()?,
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(envelope)
    }
}

impl ResponseEnvelope {
    pub fn from_slice(body: &[u8]) -> Result<ResponseEnvelope, SerializationError> {
        Ok(serde_json::from_slice(body)?)
    }

    pub fn payload(&self, key: &str) -> Option<&RawValue> {
        self.data.as_ref().and_then(|data| data.get(key)).map(|raw| raw.as_ref())
    }

    pub fn errors(&self) -> &[ServerError] {
        self.errors.as_deref().unwrap_or_default()
    }
}

/// One entry of the response's `errors` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerError {
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub locations: Vec<Location>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: Vec<PathSegment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

impl ServerError {
    /// The top-level response key this error belongs to, if its path names one.
    pub fn response_key(&self) -> Option<&str> {
        match self.path.first() {
            Some(PathSegment::Field(key)) => Some(key),
            _ => None
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if !self.locations.is_empty() {
            let locations: Vec<String> = self.locations.iter().map(|l| l.to_string()).collect();
            write!(f, " (at {})", locations.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ServerError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use super::*;

    #[test]
    fn parses_full_error_entry() {
        let body = br#"{
            "data": null,
            "errors": [{
                "message": "Unknown argument \"Foo\" on field \"bar\"",
                "locations": [{ "line": 2, "column": 63 }],
                "path": ["testPath", 0, "name"],
                "extensions": { "errorCode": "invalidArgs", "invalidArgs": { "state": "state is not valid" } }
            }]
        }"#;
        let envelope = ResponseEnvelope::from_slice(body).unwrap();

        assert!(envelope.data.is_none());
        let error = &envelope.errors()[0];
        assert_eq!(error.locations, vec![Location { line: 2, column: 63 }]);
        assert_eq!(error.path, vec![
            PathSegment::Field("testPath".to_string()),
            PathSegment::Index(0),
            PathSegment::Field("name".to_string()),
        ]);
        assert_eq!(error.response_key(), Some("testPath"));
        assert_eq!(error.extensions, Some(json!({ "errorCode": "invalidArgs", "invalidArgs": { "state": "state is not valid" } })));
        assert_eq!(error.to_string(), "Unknown argument \"Foo\" on field \"bar\" (at 2:63)");
    }

    #[test]
    fn missing_sections_are_empty() {
        let envelope = ResponseEnvelope::from_slice(b"{}").unwrap();
        assert!(envelope.data.is_none());
        assert!(envelope.errors().is_empty());

        let envelope = ResponseEnvelope::from_slice(br#"{"data": {"a": 1}, "errors": null}"#).unwrap();
        assert_eq!(envelope.payload("a").map(RawValue::get), Some("1"));
        assert!(envelope.payload("b").is_none());
        assert!(envelope.errors().is_empty());
    }

    #[test]
    fn null_error_fields_default() {
        let envelope = ResponseEnvelope::from_slice(br#"{"errors": [{"message": "boom", "locations": null, "path": null}]}"#).unwrap();
        let error = &envelope.errors()[0];
        assert_eq!(error.message, "boom");
        assert!(error.locations.is_empty());
        assert_eq!(error.response_key(), None);
        assert_eq!(error.to_string(), "boom");
    }

    #[test]
    fn malformed_body_is_rejected() {
        let error = ResponseEnvelope::from_slice(br#"{"errors": [{"message": 5}]}"#).unwrap_err();
        assert!(matches!(error, SerializationError::Response(_)));
        assert!(ResponseEnvelope::from_slice(b"<html>").is_err());
        assert!(ResponseEnvelope::from_slice(b"[]").is_err());
    }

    #[test]
    fn only_objects_are_envelopes() {
        let bodies: [&[u8]; 6] = [b"[]", b"[null, null]", br#"[{"first": 1}, [{"message": "hidden"}]]"#, b"null", b"42", br#""data""#];
        for body in bodies {
            let error = ResponseEnvelope::from_slice(body).unwrap_err();
            assert!(matches!(error, SerializationError::Response(_)), "{}", String::from_utf8_lossy(body));
        }
    }

    #[test]
    fn unknown_top_level_keys_are_ignored() {
        let envelope = ResponseEnvelope::from_slice(br#"{"extensions": {"cost": 3}, "data": {"a": [1]}}"#).unwrap();
        assert_eq!(envelope.payload("a").map(RawValue::get), Some("[1]"));
    }
}
