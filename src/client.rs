use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use serde::de::DeserializeOwned;
use tracing::instrument;
use crate::compose::{Composer, OperationKind};
use crate::dispatch::dispatch;
use crate::error::{Error, SerializationError};
use crate::field::{FieldNode, RequestBinding};
use crate::keygen::KeyGenerator;
use crate::render::render_document;
use crate::response::ResponseEnvelope;
use crate::transport::{HttpTransport, Transport, TransportRequest};

/// Per-call settings passed through to the one outbound request.
#[derive(Clone, Debug, Default)]
pub struct CallOptions {
    pub timeout: Option<Duration>,
}

impl CallOptions {
    pub fn with_timeout(timeout: Duration) -> CallOptions {
        CallOptions { timeout: Some(timeout) }
    }
}

pub struct Client<T = HttpTransport> {
    transport: T,
    headers: BTreeMap<String, String>,
    composer: Composer,
}

pub struct ClientBuilder {
    url: String,
    headers: BTreeMap<String, String>,
    http_client: Option<reqwest::Client>,
    keys: Option<Arc<KeyGenerator>>,
}

impl ClientBuilder {
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> ClientBuilder {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn http_client(mut self, http_client: reqwest::Client) -> ClientBuilder {
        self.http_client = Some(http_client);
        self
    }

    pub fn key_generator(mut self, keys: Arc<KeyGenerator>) -> ClientBuilder {
        self.keys = Some(keys);
        self
    }

    pub fn build(self) -> Client {
        let transport = HttpTransport::new(self.url, self.http_client.unwrap_or_default());
        let keys = self.keys.unwrap_or_default();
        Client {
            transport,
            headers: self.headers,
            composer: Composer::new(keys),
        }
    }
}

impl Client {
    pub fn new(url: impl Into<String>) -> Client {
        Client::builder(url).build()
    }

    pub fn builder(url: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            url: url.into(),
            headers: BTreeMap::new(),
            http_client: None,
            keys: None,
        }
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(transport: T) -> Client<T> {
        Client {
            transport,
            headers: BTreeMap::new(),
            composer: Composer::default(),
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Client<T> {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_composer(mut self, composer: Composer) -> Client<T> {
        self.composer = composer;
        self
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends `query` as-is and returns the raw response body.
    pub async fn raw_request(&self, query: &str, options: &CallOptions) -> Result<Vec<u8>, Error> {
        let request = TransportRequest {
            query,
            headers: &self.headers,
            timeout: options.timeout,
        };
        Ok(self.transport.execute(request).await?)
    }

    /// Renders a single field and decodes the whole response body into `R`.
    pub async fn request<R: DeserializeOwned>(&self, field: &FieldNode, options: &CallOptions) -> Result<R, Error> {
        let document = render_document(field)?;
        let body = self.raw_request(&document.text, options).await?;
        serde_json::from_slice(&body)
            .map_err(|error| Error::Serialization(SerializationError::Response(error)))
    }

    /// Batches every binding into one `query` operation and fills each
    /// binding's sink from the response.
    pub async fn query<I>(&self, bindings: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = RequestBinding>
    {
        self.query_with(&CallOptions::default(), bindings).await
    }

    pub async fn query_with<I>(&self, options: &CallOptions, bindings: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = RequestBinding>
    {
        self.execute(OperationKind::Query, bindings.into_iter().collect(), options).await
    }

    pub async fn mutation(&self, binding: impl Into<RequestBinding>) -> Result<(), Error> {
        self.mutation_with(&CallOptions::default(), binding).await
    }

    pub async fn mutation_with(&self, options: &CallOptions, binding: impl Into<RequestBinding>) -> Result<(), Error> {
        self.execute(OperationKind::Mutation, vec![binding.into()], options).await
    }

    #[instrument(skip_all, fields(operation = %kind, fields = bindings.len()))]
    async fn execute(&self, kind: OperationKind, bindings: Vec<RequestBinding>, options: &CallOptions) -> Result<(), Error> {
        let composed = self.composer.compose(kind, bindings)?;
        let document = render_document(&composed.root)?;
        let body = self.raw_request(&document.text, options).await?;
        let envelope = ResponseEnvelope::from_slice(&body)?;
        dispatch(&envelope, &composed.table).into_result()?;
        Ok(())
    }
}
