#![warn(missing_docs)]
//! Travbench Transport
//!
//! Everything between the benchmark engine and the query endpoint:
//! - Typed stream events (rows, metadata, end, error) delivered over a channel
//! - Result rows that already distinguish plain bindings from rows carrying
//!   a topology snapshot and provenance
//! - Incremental SPARQL-JSON decoding so rows surface as their bytes arrive
//! - An HTTP transport built on reqwest

mod http;
mod messages;
mod scripted;
mod sparql_json;

pub use http::{HttpTransport, SPARQL_RESULTS_JSON};
pub use messages::{
    Bindings, PROVENANCE_FIELD, Provenance, QueryMetadata, QueryStream, ResultRow, StreamEvent,
    StreamSender, TOPOLOGY_FIELD, Term, channel,
};
pub use scripted::{ScriptStep, ScriptedTransport};
pub use sparql_json::BindingsDecoder;

use thiserror::Error;

/// Default number of in-flight events buffered between transport and engine
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Errors raised while a query is in flight
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP request failed or returned a non-success status
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body is not a SPARQL-JSON result document
    #[error("Malformed response body: {0}")]
    MalformedBody(String),

    /// A reserved field on a result row could not be decoded
    #[error("Malformed {field} on result row: {reason}")]
    MalformedRow {
        /// Name of the offending binding variable
        field: &'static str,
        /// Decoder message
        reason: String,
    },

    /// The endpoint aborted the result stream
    #[error("Stream aborted: {0}")]
    Aborted(String),

    /// The event channel closed before an end or error event
    #[error("Stream closed before completion")]
    Closed,
}

/// Capability to send one query to an endpoint and stream back its results.
///
/// Implementations return immediately; events are delivered on the returned
/// [`QueryStream`] in arrival order and always finish with exactly one
/// [`StreamEvent::End`] or [`StreamEvent::Error`]. There is no cancellation:
/// dropping the stream abandons the underlying request.
pub trait Transport {
    /// Dispatch `query` to `endpoint`
    fn send(&self, endpoint: &str, query: &str) -> QueryStream;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, endpoint: &str, query: &str) -> QueryStream {
        (**self).send(endpoint, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TransportError::MalformedRow {
            field: PROVENANCE_FIELD,
            reason: "expected array".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed _provenance on result row: expected array"
        );
        assert_eq!(
            TransportError::Closed.to_string(),
            "Stream closed before completion"
        );
    }
}
