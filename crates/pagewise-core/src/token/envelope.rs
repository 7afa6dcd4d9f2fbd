//! The navigation envelope carried inside every page token.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::TokenResult;

/// Driver page state plus the backward link for one page.
///
/// The `cursor` tells the store where to resume reading forward. The
/// `previous` field holds the token that was current when the page was
/// fetched, which makes backward navigation a pure function of the token
/// a caller already holds.
///
/// Only the cursor is serialized into the JSON record; the previous token
/// travels after it as a separate token segment.
///
/// An envelope with an empty cursor and an empty previous token is the
/// start of the result set and always encodes to the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenEnvelope {
    /// Opaque page state reported by the store. Empty means "start".
    #[serde(
        rename = "state",
        default,
        skip_serializing_if = "Bytes::is_empty",
        with = "page_state"
    )]
    pub cursor: Bytes,
    /// Token used to fetch the page this envelope continues from.
    #[serde(skip)]
    pub previous: String,
}

impl TokenEnvelope {
    /// Creates a new envelope.
    pub fn new(cursor: impl Into<Bytes>, previous: impl Into<String>) -> Self {
        Self {
            cursor: cursor.into(),
            previous: previous.into(),
        }
    }

    /// Returns true for the start-of-results envelope.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cursor.is_empty() && self.previous.is_empty()
    }

    /// Returns the resume cursor, if any.
    #[inline]
    pub fn resume_cursor(&self) -> Option<&Bytes> {
        (!self.cursor.is_empty()).then_some(&self.cursor)
    }

    /// Returns the embedded previous token, if any.
    #[inline]
    pub fn previous_token(&self) -> Option<&str> {
        (!self.previous.is_empty()).then_some(self.previous.as_str())
    }

    /// Encodes this envelope into an opaque page token.
    pub fn encode(&self) -> TokenResult<String> {
        super::encode(&self.cursor, &self.previous)
    }
}

/// Serializes the page state as standard base64 inside the JSON payload.
mod page_state {
    use base64::prelude::*;
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64_STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64_STANDARD
            .decode(encoded.as_bytes())
            .map(Bytes::from)
            .map_err(serde::de::Error::custom)
    }
}

