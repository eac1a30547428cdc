//! Error types for the YOURLS client.
//!
//! # Design
//! Only failures that stop a call from producing a response live here:
//! building the request, reaching the server, reading the body. A body that
//! does not match the expected JSON shape is not an error at all; the decoded
//! slot is simply left at its zero value.

use thiserror::Error;

/// Failures reported by a `Transport`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request never produced a response (DNS, refused connection,
    /// TLS, timeout).
    #[error("connection failed: {0}")]
    Connection(String),

    /// A response arrived but its body could not be read in full.
    #[error("failed to read response body: {0}")]
    BodyRead(String),
}

/// Errors surfaced by `YourlsClient`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YourlsError {
    /// No base address was given to the builder.
    #[error("no base URL configured")]
    MissingBaseUrl,

    /// No transport was given to the builder.
    #[error("no HTTP transport configured")]
    MissingTransport,

    /// The API endpoint could not be resolved against the base address.
    #[error("cannot resolve API endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_is_wrapped_transparently() {
        let err = YourlsError::from(TransportError::Connection("refused".to_string()));
        assert_eq!(err.to_string(), "connection failed: refused");
    }

    #[test]
    fn parse_error_converts_into_invalid_endpoint() {
        let err = YourlsError::from(url::ParseError::EmptyHost);
        assert!(matches!(err, YourlsError::InvalidEndpoint(_)));
    }
}
