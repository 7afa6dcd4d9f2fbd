//! Forward and backward navigation over a paginated query.
//!
//! A [`Paginator`] binds a base query, its options and a [`Session`]. Every
//! page it returns carries an opaque token for the page after it, and that
//! token embeds the token which fetched the page, so any token can also be
//! walked one step back without server-side state.
//!
//! [`Session`]: crate::Session

mod config;
mod options;
mod page;

use std::sync::Arc;
use std::time::Instant;

use pagewise_core::{TokenEnvelope, TokenHistory, filter, token};

pub use self::config::PaginatorConfig;
pub use self::options::{
    DEFAULT_PAGE_SIZE, DEFAULT_TOKEN_HISTORY, PaginatorOptions, PaginatorOptionsBuilder,
};
pub use self::page::Page;
use crate::hooks::{BacklinkSource, PageEvent};
use crate::session::{Session, Statement};
use crate::{ErrorKind, PageError, PageResult, TRACING_TARGET_PAGINATOR};

/// Cursor-based paginator over a single base query.
///
/// The paginator is safe to share across tasks. Fetches run concurrently;
/// only the bookkeeping of issued tokens is serialized.
///
/// ## Example
///
/// ```rust,ignore
/// use pagewise::mock::{MockSession, row};
/// use pagewise::{Paginator, PaginatorOptions};
///
/// let rows = (1..=3).map(|id| row([("id", id)])).collect();
/// let options = PaginatorOptions::builder().with_page_size(2usize).build()?;
/// let paginator = Paginator::new(MockSession::from_rows(rows), "SELECT * FROM t", options);
///
/// let first = paginator.next().await?;
/// let second = paginator.fetch_with_token(&first.next_token).await?;
/// assert_eq!(second.len(), 1);
/// assert!(!second.has_more());
///
/// let back = paginator.previous(&first.next_token).await?;
/// assert_eq!(back.rows, first.rows);
/// ```
pub struct Paginator {
    session: Arc<dyn Session>,
    query: String,
    options: PaginatorOptions,
    history: TokenHistory,
}

impl Paginator {
    /// Creates a paginator over `query` executed by `session`.
    ///
    /// `query` may contain a `*` projection, which is replaced by the
    /// configured columns, and may already carry a `WHERE` clause.
    pub fn new(
        session: impl Session + 'static,
        query: impl Into<String>,
        options: PaginatorOptions,
    ) -> Self {
        Self::from_shared(Arc::new(session), query, options)
    }

    /// Creates a paginator over a session shared with other components.
    pub fn from_shared(
        session: Arc<dyn Session>,
        query: impl Into<String>,
        options: PaginatorOptions,
    ) -> Self {
        let query = query.into();
        let history = TokenHistory::new(options.history_capacity);

        tracing::debug!(
            target: TRACING_TARGET_PAGINATOR,
            query = %query,
            page_size = options.effective_page_size(),
            columns = options.columns.len(),
            filters = options.filters.len(),
            history_capacity = history.capacity(),
            "Created paginator"
        );

        Self {
            session,
            query,
            options,
            history,
        }
    }

    /// Returns the base query.
    #[inline]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the options this paginator was created with.
    #[inline]
    pub fn options(&self) -> &PaginatorOptions {
        &self.options
    }

    /// Returns the page size requested from the session.
    #[inline]
    pub fn page_size(&self) -> usize {
        self.options.effective_page_size()
    }

    /// Returns the history of tokens issued by this paginator.
    #[inline]
    pub fn history(&self) -> &TokenHistory {
        &self.history
    }

    /// Fetches the first page.
    pub async fn next(&self) -> PageResult<Page> {
        self.fetch_with_token("").await
    }

    /// Fetches the page that `token` points to.
    ///
    /// An empty token fetches the first page. The returned page's
    /// `next_token` is empty once the result set is exhausted, otherwise it
    /// resumes after this page and links back to `token`.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::InvalidToken`] without issuing a query when the
    /// token cannot be decoded, and [`PageError::QueryFailed`] when the
    /// session fails.
    #[tracing::instrument(
        skip(self, token),
        target = TRACING_TARGET_PAGINATOR,
        fields(token_len = token.len())
    )]
    pub async fn fetch_with_token(&self, token: &str) -> PageResult<Page> {
        let envelope = self.decode_token(token)?;
        let page = self.fetch_page(token, &envelope).await?;

        self.history.add(page.next_token.as_str()).await;
        self.options
            .metrics
            .observe_active_tokens(self.history.len().await);

        Ok(page)
    }

    /// Fetches the page before the one fetched with `token`.
    ///
    /// The backward link embedded in `token` is followed, so this works for
    /// any token regardless of which paginator issued it.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::NoPreviousPage`] for the empty start token, and
    /// the errors of [`fetch_with_token`](Self::fetch_with_token) otherwise.
    #[tracing::instrument(
        skip(self, token),
        target = TRACING_TARGET_PAGINATOR,
        fields(token_len = token.len())
    )]
    pub async fn previous(&self, token: &str) -> PageResult<Page> {
        let envelope = self.decode_token(token)?;
        if envelope.is_empty() {
            return Err(self.no_previous_page(token, BacklinkSource::Token));
        }

        tracing::debug!(
            target: TRACING_TARGET_PAGINATOR,
            first_page = envelope.previous.is_empty(),
            "Following backward link"
        );

        self.fetch_with_token(&envelope.previous).await
    }

    /// Fetches the page before the one fetched with `token`, using the
    /// tokens this paginator issued instead of the embedded link.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::NoPreviousPage`] when `token` is not in the
    /// history or is the oldest entry in it.
    #[tracing::instrument(
        skip(self, token),
        target = TRACING_TARGET_PAGINATOR,
        fields(token_len = token.len())
    )]
    pub async fn previous_from_history(&self, token: &str) -> PageResult<Page> {
        let Some(previous) = self.history.previous(token).await else {
            return Err(self.no_previous_page(token, BacklinkSource::History));
        };

        self.fetch_with_token(&previous).await
    }

    fn decode_token(&self, token: &str) -> PageResult<TokenEnvelope> {
        token::decode(token).map_err(|error| {
            self.options.logger.log(&PageEvent::InvalidToken {
                token,
                error: &error,
            });
            self.options.metrics.observe_error(ErrorKind::InvalidToken);
            PageError::InvalidToken(error)
        })
    }

    /// Encodes the token for the page after the one fetched with `token`.
    ///
    /// Decoding already validated `token`, so this only fails if the
    /// envelope itself cannot be serialized.
    fn encode_next(&self, token: &str, cursor: &[u8]) -> PageResult<String> {
        token::encode(cursor, token).map_err(|error| {
            self.options.logger.log(&PageEvent::EncodeFailed {
                token,
                error: &error,
            });
            self.options.metrics.observe_error(ErrorKind::EncodeFailed);
            PageError::EncodeFailed(error)
        })
    }

    fn no_previous_page(&self, token: &str, source: BacklinkSource) -> PageError {
        self.options
            .logger
            .log(&PageEvent::NoPreviousPage { token, source });
        self.options
            .metrics
            .observe_error(ErrorKind::NoPreviousPage);
        PageError::NoPreviousPage
    }

    async fn fetch_page(&self, token: &str, envelope: &TokenEnvelope) -> PageResult<Page> {
        let projected = self.options.project(&self.query);
        let compiled = filter::compile(&projected, &self.options.filters);
        let page_size = self.page_size();

        let mut statement = Statement::from(compiled).with_page_size(page_size);
        if let Some(cursor) = envelope.resume_cursor() {
            statement = statement.with_resume_cursor(cursor.clone());
        }
        if let Some(cancellation) = &self.options.cancellation {
            statement = statement.with_cancellation(cancellation.clone());
        }

        let query = statement.query.clone();
        let started = Instant::now();
        let result = match self.session.execute(statement).await {
            Ok(stream) => stream.collect_page(page_size).await,
            Err(error) => Err(error),
        };
        let duration = started.elapsed();

        let (rows, continuation) = match result {
            Ok(page) => page,
            Err(error) => {
                self.options.logger.log(&PageEvent::QueryFailed {
                    query: &query,
                    error: &error,
                    filters: &self.options.filters,
                    duration,
                    page_size,
                });
                self.options.metrics.observe_error(ErrorKind::QueryFailed);
                return Err(PageError::QueryFailed(error));
            }
        };

        let next_token = match continuation {
            Some(cursor) => self.encode_next(token, &cursor)?,
            None => String::new(),
        };

        self.options.logger.log(&PageEvent::PageFetched {
            rows: rows.len(),
            has_next: !next_token.is_empty(),
            filters: &self.options.filters,
            duration,
            page_size,
        });
        self.options.metrics.observe_fetch(rows.len(), duration);

        Ok(Page::new(rows, next_token))
    }
}

impl std::fmt::Debug for Paginator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("query", &self.query)
            .field("options", &self.options)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bytes::Bytes;
    use pagewise_core::{Filters, TokenError};
    use serde_json::json;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::hooks::CounterMetrics;
    use crate::mock::{MockSession, RecordingLogger, row};
    use crate::session::SessionError;

    fn user(id: i64) -> crate::Row {
        row([("user_id", json!(id))])
    }

    fn table(count: i64) -> Vec<crate::Row> {
        (1..=count).map(user).collect()
    }

    fn paginator(session: MockSession, page_size: usize) -> Paginator {
        let options = PaginatorOptions::builder()
            .with_page_size(page_size)
            .with_logger(crate::hooks::NoopLogger)
            .build()
            .unwrap();
        Paginator::new(session, "SELECT * FROM users", options)
    }

    #[tokio::test]
    async fn single_row_then_exhausted() {
        let session = MockSession::scripted()
            .with_page("", vec![user(1)], "X")
            .with_page("X", Vec::new(), "");
        let paginator = paginator(session.clone(), 1);

        let first = paginator.next().await.unwrap();
        assert_eq!(first.rows, vec![user(1)]);
        assert!(first.has_more());
        let t1 = first.next_token.clone();

        let second = paginator.fetch_with_token(&t1).await.unwrap();
        assert!(second.is_empty());
        assert_eq!(second.next_token, "");

        let back = paginator.previous(&t1).await.unwrap();
        assert_eq!(back.rows, vec![user(1)]);

        let statements = session.statements().await;
        assert_eq!(statements.len(), 3);
        assert!(statements[0].resume_cursor.is_none());
        assert_eq!(statements[1].resume_cursor, Some(Bytes::from("X")));
        assert!(statements[2].resume_cursor.is_none());
    }

    #[tokio::test]
    async fn next_token_links_back_to_the_fetching_token() {
        let paginator = paginator(MockSession::from_rows(table(5)), 2);

        let first = paginator.next().await.unwrap();
        let envelope = token::decode(&first.next_token).unwrap();
        assert_eq!(envelope.cursor, Bytes::from("2"));
        assert_eq!(envelope.previous, "");

        let second = paginator.fetch_with_token(&first.next_token).await.unwrap();
        let envelope = token::decode(&second.next_token).unwrap();
        assert_eq!(envelope.cursor, Bytes::from("4"));
        assert_eq!(envelope.previous, first.next_token);
    }

    #[tokio::test]
    async fn walks_forward_to_the_end_and_back() {
        let paginator = paginator(MockSession::from_rows(table(5)), 2);

        let p1 = paginator.next().await.unwrap();
        let p2 = paginator.fetch_with_token(&p1.next_token).await.unwrap();
        let p3 = paginator.fetch_with_token(&p2.next_token).await.unwrap();
        assert_eq!(p1.rows, table(2));
        assert_eq!(p2.rows, vec![user(3), user(4)]);
        assert_eq!(p3.rows, vec![user(5)]);
        assert!(!p3.has_more());

        let back = paginator.previous(&p2.next_token).await.unwrap();
        assert_eq!(back.rows, p2.rows);

        let back = paginator.previous(&p1.next_token).await.unwrap();
        assert_eq!(back.rows, p1.rows);
        assert_eq!(back.next_token, p1.next_token);
    }

    #[tokio::test]
    async fn page_size_larger_than_table() {
        let paginator = paginator(MockSession::from_rows(table(3)), 10);

        let page = paginator.next().await.unwrap();
        assert_eq!(page.len(), 3);
        assert_eq!(page.next_token, "");
    }

    #[tokio::test]
    async fn previous_of_start_token_fails() {
        let logger = RecordingLogger::new();
        let metrics = Arc::new(CounterMetrics::new());
        let options = PaginatorOptions::builder()
            .with_logger(logger.clone())
            .with_metrics(metrics.clone())
            .build()
            .unwrap();
        let session = MockSession::from_rows(table(3));
        let paginator = Paginator::new(session.clone(), "SELECT * FROM users", options);

        let error = paginator.previous("").await.unwrap_err();
        assert!(matches!(error, PageError::NoPreviousPage));
        assert_eq!(session.calls().await, 0);
        assert_eq!(logger.names(), vec!["no_previous_page"]);
        assert_eq!(metrics.snapshot().missing_previous, 1);
    }

    #[tokio::test]
    async fn invalid_token_issues_no_query() {
        let logger = RecordingLogger::new();
        let metrics = Arc::new(CounterMetrics::new());
        let options = PaginatorOptions::builder()
            .with_logger(logger.clone())
            .with_metrics(metrics.clone())
            .build()
            .unwrap();
        let session = MockSession::from_rows(table(3));
        let paginator = Paginator::new(session.clone(), "SELECT * FROM users", options);

        let error = paginator
            .fetch_with_token("not-base64!!")
            .await
            .unwrap_err();
        assert!(matches!(error, PageError::InvalidToken(TokenError::Encoding(_))));

        let error = paginator.previous("bm90IGpzb24").await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidToken);

        assert_eq!(session.calls().await, 0);
        assert_eq!(logger.count("invalid_token"), 2);
        assert_eq!(logger.events()[0].fields["token"], json!("not-base64!!"));
        assert_eq!(metrics.snapshot().invalid_tokens, 2);
        assert!(paginator.history().is_empty().await);
    }

    #[tokio::test]
    async fn statement_carries_projection_filters_and_page_size() {
        let filters = Filters::new()
            .with("age >", 25)
            .with("region IN", vec!["us", "eu"]);
        let options = PaginatorOptions::builder()
            .with_page_size(0usize)
            .with_columns(vec!["user_id".to_string(), "name".to_string()])
            .with_filters(filters)
            .with_logger(crate::hooks::NoopLogger)
            .build()
            .unwrap();
        let session = MockSession::from_rows(table(2));
        let paginator = Paginator::new(session.clone(), "SELECT * FROM users", options);

        paginator.next().await.unwrap();

        let statements = session.statements().await;
        let statement = &statements[0];
        assert_eq!(
            statement.query,
            "SELECT user_id, name FROM users WHERE age > ? AND region IN (?, ?)"
        );
        assert_eq!(statement.values, vec![json!(25), json!("us"), json!("eu")]);
        assert_eq!(statement.page_size, DEFAULT_PAGE_SIZE);
    }

    #[tokio::test]
    async fn query_failure_is_reported() {
        let logger = RecordingLogger::new();
        let metrics = Arc::new(CounterMetrics::new());
        let options = PaginatorOptions::builder()
            .with_filters(Filters::new().with("status", "active"))
            .with_logger(logger.clone())
            .with_metrics(metrics.clone())
            .build()
            .unwrap();
        let paginator = Paginator::new(
            MockSession::failing("coordinator timeout"),
            "SELECT * FROM users",
            options,
        );

        let error = paginator.next().await.unwrap_err();
        assert!(matches!(error, PageError::QueryFailed(_)));
        assert!(!error.is_client_error());

        let events = logger.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "query_failed");
        assert_eq!(
            events[0].fields["query"],
            json!("SELECT * FROM users WHERE status = ?")
        );
        assert_eq!(events[0].fields["error"], json!("coordinator timeout"));
        assert_eq!(metrics.snapshot().failed_queries, 1);
        assert!(paginator.history().is_empty().await);
    }

    #[tokio::test]
    async fn successful_fetches_are_observed() {
        let logger = RecordingLogger::new();
        let metrics = Arc::new(CounterMetrics::new());
        let options = PaginatorOptions::builder()
            .with_page_size(2usize)
            .with_logger(logger.clone())
            .with_metrics(metrics.clone())
            .build()
            .unwrap();
        let paginator = Paginator::new(
            MockSession::from_rows(table(3)),
            "SELECT * FROM users",
            options,
        );

        let first = paginator.next().await.unwrap();
        paginator.fetch_with_token(&first.next_token).await.unwrap();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.fetches, 2);
        assert_eq!(snapshot.rows, 3);
        assert_eq!(snapshot.errors(), 0);
        // The terminal empty token is not recorded.
        assert_eq!(snapshot.active_tokens, 1);

        let events = logger.events();
        assert_eq!(logger.names(), vec!["page_fetched", "page_fetched"]);
        assert_eq!(events[0].fields["next_token"], json!(true));
        assert_eq!(events[1].fields["next_token"], json!(false));
        assert_eq!(events[1].fields["rows_fetched"], json!(1));
    }

    #[tokio::test]
    async fn cancelled_fetch_fails() {
        let cancellation = CancellationToken::new();
        let options = PaginatorOptions::builder()
            .with_cancellation(cancellation.clone())
            .with_logger(crate::hooks::NoopLogger)
            .build()
            .unwrap();
        let session = MockSession::from_rows(table(3));
        let paginator = Paginator::new(session.clone(), "SELECT * FROM users", options);

        assert!(paginator.next().await.is_ok());

        cancellation.cancel();
        let error = paginator.next().await.unwrap_err();
        assert!(matches!(error, PageError::QueryFailed(SessionError::Cancelled)));
        assert_eq!(session.calls().await, 2);
    }

    #[tokio::test]
    async fn previous_from_history() {
        let paginator = paginator(MockSession::from_rows(table(7)), 2);

        let p1 = paginator.next().await.unwrap();
        let p2 = paginator.fetch_with_token(&p1.next_token).await.unwrap();
        let p3 = paginator.fetch_with_token(&p2.next_token).await.unwrap();

        // Viewing the third page, which was fetched with p2's token.
        let back = paginator
            .previous_from_history(&p2.next_token)
            .await
            .unwrap();
        assert_eq!(back.rows, p2.rows);

        // The oldest entry and unknown tokens have no predecessor.
        let error = paginator
            .previous_from_history(&p1.next_token)
            .await
            .unwrap_err();
        assert!(matches!(error, PageError::NoPreviousPage));

        let error = paginator
            .previous_from_history("unknown")
            .await
            .unwrap_err();
        assert!(matches!(error, PageError::NoPreviousPage));

        assert_eq!(
            paginator.history().snapshot().await,
            vec![p1.next_token, p2.next_token, p3.next_token]
        );
    }

    #[tokio::test]
    async fn history_is_bounded() {
        let options = PaginatorOptions::builder()
            .with_page_size(1usize)
            .with_history_capacity(2usize)
            .with_logger(crate::hooks::NoopLogger)
            .build()
            .unwrap();
        let paginator = Paginator::new(
            MockSession::from_rows(table(5)),
            "SELECT * FROM users",
            options,
        );

        let mut issued = Vec::new();
        let mut page = paginator.next().await.unwrap();
        while page.has_more() {
            issued.push(page.next_token.clone());
            page = paginator.fetch_with_token(&page.next_token).await.unwrap();
        }

        assert_eq!(issued.len(), 4);
        assert_eq!(paginator.history().snapshot().await, issued[2..].to_vec());
    }

    #[tokio::test]
    async fn token_length_grows_linearly_over_a_long_walk() {
        let paginator = paginator(MockSession::from_rows(table(50)), 1);

        let mut page = paginator.next().await.unwrap();
        let mut lengths = vec![page.next_token.len()];
        while page.has_more() {
            page = paginator.fetch_with_token(&page.next_token).await.unwrap();
            if page.has_more() {
                lengths.push(page.next_token.len());
            }
        }

        assert_eq!(lengths.len(), 49);
        // One bounded segment per page, never a re-encoding of the chain.
        for pair in lengths.windows(2) {
            let step = pair[1] - pair[0];
            assert!(step > 0 && step <= 64, "token grew by {step}");
        }
        assert!(lengths[48] < 49 * 64);
    }

    #[tokio::test]
    async fn padded_token_yields_an_unpadded_next_token() {
        let paginator = paginator(MockSession::from_rows(table(6)), 2);

        let first = paginator.next().await.unwrap();
        let padded = format!("{}==", first.next_token);
        let second = paginator.fetch_with_token(&padded).await.unwrap();

        assert_eq!(second.rows, vec![user(3), user(4)]);
        assert!(!second.next_token.contains('='));
        let envelope = token::decode(&second.next_token).unwrap();
        assert_eq!(envelope.previous, first.next_token);
    }

    #[tokio::test]
    async fn encode_failure_is_reported() {
        let logger = RecordingLogger::new();
        let metrics = Arc::new(CounterMetrics::new());
        let options = PaginatorOptions::builder()
            .with_logger(logger.clone())
            .with_metrics(metrics.clone())
            .build()
            .unwrap();
        let paginator = Paginator::new(
            MockSession::from_rows(table(1)),
            "SELECT * FROM users",
            options,
        );

        let error = paginator.encode_next("a/b", b"2").unwrap_err();
        assert!(matches!(error, PageError::EncodeFailed(TokenError::Malformed(_))));
        assert_eq!(error.kind(), ErrorKind::EncodeFailed);
        assert!(!error.is_client_error());

        assert_eq!(logger.names(), vec!["encode_failed"]);
        assert_eq!(logger.events()[0].fields["token"], json!("a/b"));
        assert_eq!(metrics.snapshot().encode_failures, 1);
    }

    #[tokio::test]
    async fn tokens_work_across_paginators() {
        let session = MockSession::from_rows(table(4));
        let first = paginator(session.clone(), 2);
        let second = paginator(session, 2);

        let page = first.next().await.unwrap();
        let next = second.fetch_with_token(&page.next_token).await.unwrap();
        assert_eq!(next.rows, vec![user(3), user(4)]);

        let back = second.previous(&page.next_token).await.unwrap();
        assert_eq!(back.rows, page.rows);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_fetches() {
        let session = MockSession::from_rows(table(20)).with_latency(Duration::from_millis(5));
        let paginator = Arc::new(paginator(session.clone(), 5));
        let first = paginator.next().await.unwrap();

        let handles = (0..8)
            .map(|_| {
                let paginator = Arc::clone(&paginator);
                let token = first.next_token.clone();
                tokio::spawn(async move { paginator.fetch_with_token(&token).await })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            let page = handle.await.unwrap().unwrap();
            assert_eq!(page.rows, (6..=10).map(user).collect::<Vec<_>>());
        }

        assert_eq!(session.calls().await, 9);
        assert_eq!(paginator.history().len().await, 2);
    }
}
