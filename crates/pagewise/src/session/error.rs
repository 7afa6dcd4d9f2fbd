//! Errors reported by session implementations.

/// Type-erased error type for driver failures.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Failure reported by a [`Session`] while executing or streaming a page.
///
/// [`Session`]: super::Session
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The cancellation token fired before the page was produced.
    #[error("query execution was cancelled")]
    Cancelled,

    /// The driver failed to execute the statement or stream its rows.
    #[error("{message}")]
    Execution {
        /// Human readable description of the failure.
        message: String,
        /// Underlying driver error, if any.
        #[source]
        source: Option<BoxedError>,
    },
}

impl SessionError {
    /// Creates an execution error with the given message.
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
            source: None,
        }
    }

    /// Attaches the underlying driver error.
    pub fn with_source(self, error: impl std::error::Error + Send + Sync + 'static) -> Self {
        match self {
            Self::Execution { message, .. } => Self::Execution {
                message,
                source: Some(Box::new(error)),
            },
            Self::Cancelled => Self::Cancelled,
        }
    }
}

/// Specialized [`Result`] type for session operations.
pub type SessionResult<T, E = SessionError> = Result<T, E>;
