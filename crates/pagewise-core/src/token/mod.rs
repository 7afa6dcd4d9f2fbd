//! Opaque page tokens.
//!
//! A token is a chain of dot-separated segments. The first segment is the
//! URL-safe base64 encoding of a small JSON record holding the driver page
//! state (`state`). Everything after the first `.` is the token of the page
//! the envelope continues from, carried verbatim. Each page therefore adds
//! one segment of bounded size instead of re-encoding its whole history.
//!
//! An envelope with neither a page state nor a previous token encodes to
//! the empty string, which is also the "start" token.
//!
//! Tokens are emitted without padding; decoding accepts trailing padding so
//! tokens survive clients that re-pad them.

mod envelope;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use bytes::Bytes;

pub use self::envelope::TokenEnvelope;
use crate::{TRACING_TARGET_TOKEN, TokenError, TokenResult};

/// URL-safe engine that never emits padding and tolerates it on input.
const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Separates the envelope segment from the previous token.
const SEGMENT_SEPARATOR: char = '.';

/// Encodes a page state and a previous token into an opaque token.
///
/// Returns the empty token when both inputs are empty. The output is
/// deterministic for a given input and grows by one segment per page.
///
/// # Errors
///
/// Fails with [`TokenError::Malformed`] when `previous` is not a token.
pub fn encode(cursor: &[u8], previous: &str) -> TokenResult<String> {
    let previous = previous.trim_end_matches('=');
    if cursor.is_empty() && previous.is_empty() {
        return Ok(String::new());
    }

    if !previous.is_empty() {
        check_segments(previous)?;
    }

    let envelope = TokenEnvelope::new(Bytes::copy_from_slice(cursor), "");
    let payload = serde_json::to_vec(&envelope).map_err(TokenError::Serialize)?;

    let mut token = TOKEN_ENGINE.encode(payload);
    if !previous.is_empty() {
        token.reserve(previous.len() + 1);
        token.push(SEGMENT_SEPARATOR);
        token.push_str(previous);
    }

    Ok(token)
}

/// Decodes an opaque token into its envelope.
///
/// The empty string decodes to the empty envelope. Anything else must start
/// with URL-safe base64 of a JSON object with only the envelope fields,
/// optionally followed by `.` and a well-formed previous token.
pub fn decode(token: &str) -> TokenResult<TokenEnvelope> {
    let token = token.trim_end_matches('=');
    if token.is_empty() {
        return Ok(TokenEnvelope::default());
    }

    let (head, previous) = token.split_once(SEGMENT_SEPARATOR).unwrap_or((token, ""));

    if head.is_empty() || head.contains('=') {
        return Err(TokenError::Malformed("envelope segment is empty or padded"));
    }

    let payload = TOKEN_ENGINE.decode(head).inspect_err(|error| {
        tracing::debug!(
            target: TRACING_TARGET_TOKEN,
            token_len = token.len(),
            error = %error,
            "Rejected token with invalid encoding"
        );
    })?;

    let value: serde_json::Value = serde_json::from_slice(&payload)
        .map_err(TokenError::Payload)?;
    if !value.is_object() {
        return Err(TokenError::Envelope(
            "expected a json object at the top level".to_string(),
        ));
    }

    let mut envelope: TokenEnvelope = serde_json::from_value(value)
        .map_err(|error| TokenError::Envelope(error.to_string()))?;

    if token.len() > head.len() {
        check_segments(previous)?;
        envelope.previous = previous.to_string();
    }

    Ok(envelope)
}

/// Checks that `token` is a non-empty chain of non-empty URL-safe segments.
fn check_segments(token: &str) -> TokenResult<()> {
    let url_safe = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';

    let well_formed = token
        .split(SEGMENT_SEPARATOR)
        .all(|segment| !segment.is_empty() && segment.chars().all(url_safe));

    if well_formed {
        Ok(())
    } else {
        Err(TokenError::Malformed(
            "previous token is not a chain of url-safe segments",
        ))
    }
}
