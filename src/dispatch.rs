use tracing::{debug, warn};
use crate::compose::DispatchTable;
use crate::error::{AggregateError, SerializationError};
use crate::response::ResponseEnvelope;

/// Hands each payload in `envelope.data` to the sink registered under its
/// key, then appends every server error. Nothing here aborts early: the
/// returned aggregate holds every failure, and destinations whose payload
/// decoded are filled even when others failed.
pub fn dispatch(envelope: &ResponseEnvelope, table: &DispatchTable) -> AggregateError {
    let mut aggregate = AggregateError::new();

    for (key, sink) in table.iter() {
        let Some(payload) = envelope.payload(key) else {
            debug!(key, "no data for key");
            continue;
        };
        if let Err(source) = sink.accept(payload) {
            warn!(key, error = %source, "could not decode payload");
            aggregate.push(SerializationError::Decode {
                key: key.to_string(),
                payload: payload.get().to_string(),
                source
            });
        }
    }

    for error in envelope.errors() {
        warn!(message = %error.message, key = error.response_key(), "server reported error");
        aggregate.push(error.clone());
    }

    aggregate
}
