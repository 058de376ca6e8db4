use std::fmt;
use thiserror::Error;
use crate::response::ServerError;
use crate::sink::DecodeError;
use crate::value::EncodeError;

#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("argument `{key}` of field `{field}` cannot be encoded: {reason}")]
    Argument {
        field: String,
        key: String,
        reason: EncodeError,
    },
    #[error("could not decode `{key}` from {payload}: {source}")]
    Decode {
        key: String,
        payload: String,
        source: DecodeError,
    },
    #[error("malformed response body: {0}")]
    Response(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("non-200 response status: {status}, body: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompositionError {
    #[error("at least one field is required")]
    NoBindings,
    #[error("no free alias found after {attempts} attempts")]
    AliasExhausted { attempts: usize },
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Serialization(#[from] SerializationError),
    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Every failure collected while dispatching one response. Empty means
/// every destination that had data was filled.
#[derive(Debug, Default)]
pub struct AggregateError {
    errors: Vec<DispatchError>,
}

impl AggregateError {
    pub fn new() -> AggregateError {
        AggregateError::default()
    }

    pub fn push(&mut self, error: impl Into<DispatchError>) {
        self.errors.push(error.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[DispatchError] {
        &self.errors
    }

    pub fn server_errors(&self) -> impl Iterator<Item = &ServerError> {
        self.errors.iter().filter_map(|error| match error {
            DispatchError::Server(error) => Some(error),
            DispatchError::Serialization(_) => None,
        })
    }

    pub fn serialization_errors(&self) -> impl Iterator<Item = &SerializationError> {
        self.errors.iter().filter_map(|error| match error {
            DispatchError::Serialization(error) => Some(error),
            DispatchError::Server(_) => None,
        })
    }

    pub fn into_result(self) -> Result<(), AggregateError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.len() {
            0 => write!(f, "no errors occurred"),
            1 => write!(f, "1 error occurred: {}", self.errors[0]),
            n => {
                write!(f, "{} errors occurred:", n)?;
                for error in &self.errors {
                    write!(f, "\n\t* {}", error)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for AggregateError {}

impl IntoIterator for AggregateError {
    type Item = DispatchError;
    type IntoIter = std::vec::IntoIter<DispatchError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Serialization(#[from] SerializationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Composition(#[from] CompositionError),
    #[error(transparent)]
    Dispatch(#[from] AggregateError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_error(message: &str) -> ServerError {
        ServerError { message: message.to_string(), ..ServerError::default() }
    }

    #[test]
    fn empty_aggregate_is_success() {
        assert!(AggregateError::new().into_result().is_ok());
    }

    #[test]
    fn display_lists_every_error() {
        let mut aggregate = AggregateError::new();
        aggregate.push(server_error("first"));
        assert_eq!(aggregate.to_string(), "1 error occurred: first");

        aggregate.push(server_error("second"));
        assert_eq!(aggregate.to_string(), "2 errors occurred:\n\t* first\n\t* second");
    }

    #[test]
    fn filters_by_kind() {
        let mut aggregate = AggregateError::new();
        aggregate.push(server_error("boom"));
        aggregate.push(SerializationError::Argument {
            field: "f".to_string(),
            key: "k".to_string(),
            reason: EncodeError::InvalidLiteral("1".to_string()),
        });
        assert_eq!(aggregate.len(), 2);
        assert_eq!(aggregate.server_errors().count(), 1);
        assert_eq!(aggregate.serialization_errors().count(), 1);
    }
}
