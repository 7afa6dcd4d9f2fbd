//! A single paginated statement handed to a session.

use bytes::Bytes;
use pagewise_core::{CompiledQuery, Value};
use tokio_util::sync::CancellationToken;

/// Parameterized query for one page.
#[derive(Debug, Clone, Default)]
pub struct Statement {
    /// Query text with `?` placeholders.
    pub query: String,
    /// Values bound to the placeholders, in order.
    pub values: Vec<Value>,
    /// Maximum number of rows the session should return.
    pub page_size: usize,
    /// Page state to resume from. `None` starts at the beginning.
    pub resume_cursor: Option<Bytes>,
    /// Cancellation signal the session is expected to honor.
    pub cancellation: Option<CancellationToken>,
}

impl Statement {
    /// Creates a statement with bound values.
    pub fn new(query: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            query: query.into(),
            values,
            ..Default::default()
        }
    }

    /// Sets the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the page state to resume from. Empty page states are ignored.
    pub fn with_resume_cursor(mut self, cursor: impl Into<Bytes>) -> Self {
        let cursor = cursor.into();
        self.resume_cursor = (!cursor.is_empty()).then_some(cursor);
        self
    }

    /// Sets the cancellation signal.
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    /// Returns whether the cancellation signal has fired.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

impl From<CompiledQuery> for Statement {
    fn from(compiled: CompiledQuery) -> Self {
        Self::new(compiled.query, compiled.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_resume_cursor_is_ignored() {
        let statement = Statement::new("SELECT * FROM t", Vec::new())
            .with_resume_cursor(Bytes::new());
        assert!(statement.resume_cursor.is_none());

        let statement = statement.with_resume_cursor(&b"X"[..]);
        assert_eq!(statement.resume_cursor.as_deref(), Some(&b"X"[..]));
    }

    #[test]
    fn cancellation_state() {
        let token = CancellationToken::new();
        let statement = Statement::default().with_cancellation(token.clone());
        assert!(!statement.is_cancelled());

        token.cancel();
        assert!(statement.is_cancelled());
    }
}
