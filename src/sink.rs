use std::fmt;
use std::sync::Arc;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{0}")]
    Json(#[from] serde_path_to_error::Error<serde_json::Error>),
    #[error("{0}")]
    Custom(String),
}

type SinkFn = dyn Fn(&RawValue) -> Result<(), DecodeError> + Send + Sync;

/// Destination for one response payload. The dispatcher hands it the raw
/// JSON for its key and never needs to know what it decodes into.
#[derive(Clone)]
pub struct Sink(Arc<SinkFn>);

impl Sink {
    pub fn new<F>(accept: F) -> Sink
    where
        F: Fn(&RawValue) -> Result<(), DecodeError> + Send + Sync + 'static
    {
        Sink(Arc::new(accept))
    }

    pub fn discard() -> Sink {
        Sink::new(|_| Ok(()))
    }

    /// A sink decoding into `T` together with the slot it fills.
    pub fn slot<T>() -> (Sink, Slot<T>)
    where
        T: DeserializeOwned + Send + 'static
    {
        let slot = Slot::new();
        (slot.sink(), slot)
    }

    pub fn accept(&self, payload: &RawValue) -> Result<(), DecodeError> {
        (self.0)(payload)
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sink(..)")
    }
}

pub fn decode<T: DeserializeOwned>(payload: &RawValue) -> Result<T, DecodeError> {
    let deserializer = &mut serde_json::Deserializer::from_str(payload.get());
    Ok(serde_path_to_error::deserialize(deserializer)?)
}

/// Caller-owned cell filled by the sink it hands out.
pub struct Slot<T> {
    value: Arc<Mutex<Option<T>>>
}

impl<T> Slot<T> {
    pub fn new() -> Slot<T> {
        Slot { value: Arc::new(Mutex::new(None)) }
    }

    pub fn sink(&self) -> Sink
    where
        T: DeserializeOwned + Send + 'static
    {
        let value = Arc::clone(&self.value);
        Sink::new(move |payload| {
            match decode::<T>(payload) {
                Ok(decoded) => {
                    *value.lock() = Some(decoded);
                    Ok(())
                }
                // a null the target type can't hold leaves the slot as it was
                Err(_) if payload.get().trim() == "null" => Ok(()),
                Err(error) => Err(error),
            }
        })
    }

    pub fn take(&self) -> Option<T> {
        self.value.lock().take()
    }

    pub fn get(&self) -> Option<T>
    where
        T: Clone
    {
        self.value.lock().clone()
    }

    pub fn is_filled(&self) -> bool {
        self.value.lock().is_some()
    }
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Slot { value: Arc::clone(&self.value) }
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Slot").field(&*self.value.lock()).finish()
    }
}
