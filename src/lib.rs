//! Batched query client for GraphQL-style HTTP endpoints.
//!
//! Independent top-level fields are merged into one operation, sent in one
//! round trip, and each field's result is decoded into the sink it was
//! bound to.

pub mod client;
pub mod compose;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod field;
pub mod keygen;
pub mod render;
pub mod response;
pub mod sink;
pub mod transport;
pub mod value;
mod writer;

pub use client::{CallOptions, Client, ClientBuilder};
pub use compose::{ComposedDocument, Composer, DispatchTable, OperationKind};
pub use dispatch::dispatch;
pub use error::{AggregateError, CompositionError, DispatchError, Error, SerializationError, TransportError};
pub use field::{field, FieldNode, RequestBinding};
pub use keygen::KeyGenerator;
pub use render::{render, render_document, render_with, RenderedDocument};
pub use response::{Location, PathSegment, ResponseEnvelope, ServerError};
pub use sink::{DecodeError, Sink, Slot};
pub use transport::{HttpTransport, Transport, TransportRequest};
pub use value::{EncodeError, Value};
pub use writer::WriterOptions;
