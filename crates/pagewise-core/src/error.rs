//! Error types for token encoding and decoding.

/// Errors produced while encoding or decoding a page token.
///
/// Every variant means the token cannot be used to resume a query. Callers
/// surface them as client errors and never retry.
#[derive(Debug, thiserror::Error)]
#[must_use = "token errors should be handled appropriately"]
pub enum TokenError {
    /// The token is not valid URL-safe base64.
    #[error("token is not valid url-safe base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    /// The decoded bytes are not a JSON document.
    #[error("token payload is not valid json: {0}")]
    Payload(#[source] serde_json::Error),

    /// The decoded JSON is not an object of the envelope shape.
    #[error("token payload is not a well-formed envelope: {0}")]
    Envelope(String),

    /// The token is not a chain of well-formed segments.
    #[error("token is malformed: {0}")]
    Malformed(&'static str),

    /// The envelope could not be serialized.
    #[error("failed to serialize token envelope: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Specialized [`Result`] type for token operations.
pub type TokenResult<T, E = TokenError> = Result<T, E>;
