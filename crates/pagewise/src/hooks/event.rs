//! Structured events emitted by the paginator.

use std::time::Duration;

use pagewise_core::{Filters, TokenError, Value};
use serde_json::{Map, json};
use strum::IntoStaticStr;

use crate::session::SessionError;

/// Where a backward-navigation lookup came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum BacklinkSource {
    /// The `previous` link embedded in the token.
    Token,
    /// The paginator's local token history.
    History,
}

/// A structured event passed to the [`PageLogger`] hook.
///
/// [`PageLogger`]: super::PageLogger
#[derive(Debug, Clone, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum PageEvent<'a> {
    /// A token failed to decode. No query was issued.
    InvalidToken {
        /// The offending token.
        token: &'a str,
        /// Why decoding failed.
        error: &'a TokenError,
    },
    /// Backward navigation found no earlier page.
    NoPreviousPage {
        /// The token the caller navigated back from.
        token: &'a str,
        /// Which backward link was consulted.
        source: BacklinkSource,
    },
    /// The session failed to produce the page.
    QueryFailed {
        /// The compiled query text.
        query: &'a str,
        /// The session error.
        error: &'a SessionError,
        /// Filters applied to the query.
        filters: &'a Filters,
        /// Time spent before the failure.
        duration: Duration,
        /// Requested page size.
        page_size: usize,
    },
    /// A page was fetched but its next token could not be encoded.
    EncodeFailed {
        /// The token the page was fetched with.
        token: &'a str,
        /// Why encoding failed.
        error: &'a TokenError,
    },
    /// A page was fetched.
    PageFetched {
        /// Number of rows returned.
        rows: usize,
        /// Whether another page follows.
        has_next: bool,
        /// Filters applied to the query.
        filters: &'a Filters,
        /// Time spent executing and reading the page.
        duration: Duration,
        /// Requested page size.
        page_size: usize,
    },
}

impl PageEvent<'_> {
    /// Returns the event name, such as `page_fetched`.
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Returns whether this event reports a failure.
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::PageFetched { .. })
    }

    /// Returns the event payload as structured fields.
    pub fn fields(&self) -> Map<String, Value> {
        let value = match self {
            Self::InvalidToken { token, error } => json!({
                "token": token,
                "error": error.to_string(),
            }),
            Self::EncodeFailed { token, error } => json!({
                "token": token,
                "error": error.to_string(),
            }),
            Self::NoPreviousPage { token, source } => json!({
                "token": token,
                "source": <&'static str>::from(source),
            }),
            Self::QueryFailed {
                query,
                error,
                filters,
                duration,
                page_size,
            } => json!({
                "query": query,
                "error": error.to_string(),
                "filters": filters,
                "duration_ms": duration.as_millis() as u64,
                "page_size": page_size,
            }),
            Self::PageFetched {
                rows,
                has_next,
                filters,
                duration,
                page_size,
            } => json!({
                "rows_fetched": rows,
                "next_token": has_next,
                "filters": filters,
                "duration_ms": duration.as_millis() as u64,
                "page_size": page_size,
            }),
        };

        match value {
            Value::Object(fields) => fields,
            _ => Map::new(),
        }
    }
}
