//! HTTP Transport
//!
//! Sends queries to a SPARQL protocol endpoint and streams the decoded rows
//! into a [`QueryStream`]. Each request runs on its own Tokio task; the task
//! stops at its next send once the consumer has dropped the stream.

use crate::messages::{QueryStream, ResultRow, StreamSender, channel};
use crate::sparql_json::BindingsDecoder;
use crate::{DEFAULT_CHANNEL_CAPACITY, Transport, TransportError};
use reqwest::header::ACCEPT;
use tracing::debug;

/// Media type requested from the endpoint
pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// reqwest-backed [`Transport`]
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    capacity: usize,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

impl HttpTransport {
    /// Wrap an existing client
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Override the event buffer size
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }
}

impl Transport for HttpTransport {
    fn send(&self, endpoint: &str, query: &str) -> QueryStream {
        let (tx, stream) = channel(self.capacity);
        let request = self
            .client
            .post(endpoint)
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .form(&[("query", query)]);

        tokio::spawn(async move {
            let feed = tx.clone();
            match pump(request, &feed).await {
                Ok(()) => {}
                Err(e) => tx.fail(e).await,
            }
        });

        stream
    }
}

/// Drive one request to completion, forwarding events as they decode
async fn pump(request: reqwest::RequestBuilder, tx: &StreamSender) -> Result<(), TransportError> {
    let mut response = request.send().await?.error_for_status()?;
    let mut decoder = BindingsDecoder::new();

    while let Some(chunk) = response.chunk().await? {
        for bindings in decoder.push(&chunk)? {
            if !tx.row(ResultRow::from_bindings(bindings)?).await {
                debug!("query stream abandoned by consumer");
                return Ok(());
            }
        }
    }

    if let Some(metadata) = decoder.finish()? {
        tx.metadata(metadata).await;
    }
    tx.clone().end().await;
    Ok(())
}
