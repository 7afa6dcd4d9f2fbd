//! Error types for paginated fetches.

use pagewise_core::TokenError;
use strum::{AsRefStr, Display, IntoStaticStr};

use crate::session::SessionError;

/// Categories of pagination errors, used as metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The page token could not be decoded.
    InvalidToken,
    /// The token carries no backward link, or the history has no record.
    NoPreviousPage,
    /// The session reported a failure while executing the query.
    QueryFailed,
    /// The token for the next page could not be encoded.
    EncodeFailed,
    /// The paginator options are invalid.
    Config,
}

/// Error type for all paginator operations.
///
/// None of these errors are retried by the paginator. `InvalidToken` and
/// `NoPreviousPage` are caused by the caller, `QueryFailed` by the store.
/// `EncodeFailed` means the paginator produced a page it cannot link to.
#[derive(Debug, thiserror::Error)]
#[must_use = "pagination errors should be handled appropriately"]
pub enum PageError {
    /// The page token is malformed or undecodable.
    #[error("invalid page token: {0}")]
    InvalidToken(#[source] TokenError),

    /// There is no earlier page to navigate to.
    #[error("no previous page available")]
    NoPreviousPage,

    /// The session failed to execute the paginated query.
    #[error("failed to execute paginated query: {0}")]
    QueryFailed(#[from] SessionError),

    /// The token for the next page could not be encoded.
    #[error("failed to encode next page token: {0}")]
    EncodeFailed(#[source] TokenError),

    /// The paginator options are invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl PageError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidToken(_) => ErrorKind::InvalidToken,
            Self::NoPreviousPage => ErrorKind::NoPreviousPage,
            Self::QueryFailed(_) => ErrorKind::QueryFailed,
            Self::EncodeFailed(_) => ErrorKind::EncodeFailed,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Returns whether the error was caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken(_) | Self::NoPreviousPage | Self::Config(_)
        )
    }
}

impl From<derive_builder::UninitializedFieldError> for PageError {
    fn from(error: derive_builder::UninitializedFieldError) -> Self {
        Self::Config(error.to_string())
    }
}

/// Specialized [`Result`] type for paginator operations.
pub type PageResult<T, E = PageError> = Result<T, E>;
