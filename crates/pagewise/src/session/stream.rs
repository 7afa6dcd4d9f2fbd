//! Row stream returned by a session for one page.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};

use super::{Row, SessionResult};

/// Rows of one page plus the continuation cursor the store reported.
///
/// A stream item error means the page could not be read completely.
pub struct RowStream {
    rows: BoxStream<'static, SessionResult<Row>>,
    continuation: Option<Bytes>,
}

impl RowStream {
    /// Creates a row stream. An empty continuation means the result set is
    /// exhausted.
    pub fn new(rows: BoxStream<'static, SessionResult<Row>>, continuation: Option<Bytes>) -> Self {
        Self {
            rows,
            continuation: continuation.filter(|cursor| !cursor.is_empty()),
        }
    }

    /// Creates a row stream from rows already in memory.
    pub fn from_rows(rows: Vec<Row>, continuation: Option<Bytes>) -> Self {
        Self::new(stream::iter(rows.into_iter().map(Ok)).boxed(), continuation)
    }

    /// Creates an exhausted, empty row stream.
    pub fn empty() -> Self {
        Self::from_rows(Vec::new(), None)
    }

    /// Returns the continuation cursor, if more pages exist.
    #[inline]
    pub fn continuation(&self) -> Option<&Bytes> {
        self.continuation.as_ref()
    }

    /// Consumes the stream and returns the rows and continuation cursor.
    pub fn into_parts(self) -> (BoxStream<'static, SessionResult<Row>>, Option<Bytes>) {
        (self.rows, self.continuation)
    }

    /// Reads at most `limit` rows and returns them with the continuation.
    ///
    /// The first stream error aborts the read.
    pub async fn collect_page(self, limit: usize) -> SessionResult<(Vec<Row>, Option<Bytes>)> {
        let (mut rows, continuation) = self.into_parts();
        let mut page = Vec::new();

        while page.len() < limit {
            match rows.next().await {
                Some(row) => page.push(row?),
                None => break,
            }
        }

        Ok((page, continuation))
    }
}

impl Stream for RowStream {
    type Item = SessionResult<Row>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rows).poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl std::fmt::Debug for RowStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowStream")
            .field("continuation", &self.continuation)
            .finish_non_exhaustive()
    }
}
