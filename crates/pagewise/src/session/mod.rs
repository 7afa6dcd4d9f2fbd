//! The query-execution collaborator.
//!
//! The paginator never talks to a driver directly. It builds a [`Statement`]
//! and hands it to a [`Session`], which runs it against the store and
//! returns the rows of one page together with the page state to resume
//! from. Implementations own connection handling, retries and the
//! translation of bound values into driver types.

mod error;
mod statement;
mod stream;

use std::sync::Arc;

pub use self::error::{BoxedError, SessionError, SessionResult};
pub use self::statement::Statement;
pub use self::stream::RowStream;

/// A single result row keyed by column name.
pub type Row = serde_json::Map<String, pagewise_core::Value>;

/// Executes paginated statements against a wide-column store.
///
/// Implementations must honor `statement.page_size`, resume from
/// `statement.resume_cursor` when present and stop early once
/// `statement.cancellation` fires.
#[async_trait::async_trait]
pub trait Session: Send + Sync {
    /// Executes the statement and returns the rows of one page.
    async fn execute(&self, statement: Statement) -> SessionResult<RowStream>;
}

#[async_trait::async_trait]
impl<S> Session for Arc<S>
where
    S: Session + ?Sized,
{
    async fn execute(&self, statement: Statement) -> SessionResult<RowStream> {
        (**self).execute(statement).await
    }
}
