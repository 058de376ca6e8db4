use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, warn};
use crate::error::TransportError;

pub struct TransportRequest<'a> {
    pub query: &'a str,
    pub headers: &'a BTreeMap<String, String>,
    pub timeout: Option<Duration>,
}

/// Performs the single network exchange of a call. Implementations must not
/// retry; retry policy belongs to the caller.
pub trait Transport: Send + Sync {
    fn execute(&self, request: TransportRequest<'_>) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;
}

#[derive(Serialize)]
struct GraphQLQuery<'a> {
    query: &'a str
}

/// POSTs `{"query": ...}` as JSON and returns the body of a 200 response.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    url: String,
    http_client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>, http_client: reqwest::Client) -> HttpTransport {
        HttpTransport { url: url.into(), http_client }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for HttpTransport {
    async fn execute(&self, request: TransportRequest<'_>) -> Result<Vec<u8>, TransportError> {
        let mut builder = self.http_client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .json(&GraphQLQuery { query: request.query });
        for (key, value) in request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!(url = %self.url, %status, "received response");
        if status != StatusCode::OK {
            let body = response.text().await?;
            warn!(url = %self.url, %status, "non-200 response status");
            return Err(TransportError::Status { status, body });
        }
        Ok(response.bytes().await?.to_vec())
    }
}
