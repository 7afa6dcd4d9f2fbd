//! In-memory session and hooks for tests.
//!
//! [`MockSession`] either replays scripted pages keyed by page state or
//! pages through an in-memory table using a decimal row offset as its page
//! state. Every executed [`Statement`] is recorded for later inspection.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use pagewise_core::Value;
use serde_json::Map;

use crate::TRACING_TARGET_SESSION;
use crate::hooks::{PageEvent, PageLogger};
use crate::session::{Row, RowStream, Session, SessionError, SessionResult, Statement};

/// Builds a row from `(column, value)` pairs.
pub fn row<I, K, V>(fields: I) -> Row
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    fields
        .into_iter()
        .map(|(column, value)| (column.into(), value.into()))
        .collect()
}

#[derive(Debug, Clone)]
struct ScriptedPage {
    rows: Vec<Row>,
    continuation: Option<Bytes>,
}

#[derive(Debug, Clone)]
enum Source {
    Scripted(HashMap<Bytes, ScriptedPage>),
    Table(Vec<Row>),
}

/// Scriptable in-memory [`Session`].
///
/// Clones share the statement log.
#[derive(Debug, Clone)]
pub struct MockSession {
    source: Source,
    failure: Option<String>,
    latency: Option<Duration>,
    statements: Arc<tokio::sync::Mutex<Vec<Statement>>>,
}

impl MockSession {
    fn with_source(source: Source) -> Self {
        Self {
            source,
            failure: None,
            latency: None,
            statements: Arc::default(),
        }
    }

    /// Creates a session without any scripted pages.
    pub fn scripted() -> Self {
        Self::with_source(Source::Scripted(HashMap::new()))
    }

    /// Creates a session that pages through `rows` by offset.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self::with_source(Source::Table(rows))
    }

    /// Creates a session whose every execution fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::scripted().with_failure(message)
    }

    /// Scripts the page returned when resuming from `cursor`.
    ///
    /// An empty `cursor` scripts the first page, an empty `continuation`
    /// marks the page as the last one.
    pub fn with_page(
        mut self,
        cursor: impl AsRef<[u8]>,
        rows: Vec<Row>,
        continuation: impl AsRef<[u8]>,
    ) -> Self {
        let cursor = Bytes::copy_from_slice(cursor.as_ref());
        let continuation = continuation.as_ref();
        let page = ScriptedPage {
            rows,
            continuation: (!continuation.is_empty()).then(|| Bytes::copy_from_slice(continuation)),
        };

        if let Source::Scripted(pages) = &mut self.source {
            pages.insert(cursor, page);
        }
        self
    }

    /// Makes every execution fail with `message`.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Delays every execution by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Returns every statement executed so far, oldest first.
    pub async fn statements(&self) -> Vec<Statement> {
        self.statements.lock().await.clone()
    }

    /// Returns the number of executed statements.
    pub async fn calls(&self) -> usize {
        self.statements.lock().await.len()
    }

    fn page_for(&self, statement: &Statement) -> SessionResult<ScriptedPage> {
        match &self.source {
            Source::Scripted(pages) => {
                let cursor = statement.resume_cursor.clone().unwrap_or_default();
                pages.get(&cursor).cloned().ok_or_else(|| {
                    SessionError::execution(format!(
                        "no page scripted for page state {:?}",
                        String::from_utf8_lossy(&cursor)
                    ))
                })
            }
            Source::Table(rows) => {
                let offset = match &statement.resume_cursor {
                    Some(cursor) => std::str::from_utf8(cursor)
                        .ok()
                        .and_then(|offset| offset.parse::<usize>().ok())
                        .ok_or_else(|| SessionError::execution("malformed page state"))?,
                    None => 0,
                };

                let start = offset.min(rows.len());
                let end = start.saturating_add(statement.page_size).min(rows.len());
                let continuation = (end < rows.len()).then(|| Bytes::from(end.to_string()));

                Ok(ScriptedPage {
                    rows: rows[start..end].to_vec(),
                    continuation,
                })
            }
        }
    }
}

#[async_trait::async_trait]
impl Session for MockSession {
    async fn execute(&self, statement: Statement) -> SessionResult<RowStream> {
        tracing::trace!(
            target: TRACING_TARGET_SESSION,
            query = %statement.query,
            values = statement.values.len(),
            page_size = statement.page_size,
            resuming = statement.resume_cursor.is_some(),
            "Executing mock statement"
        );

        self.statements.lock().await.push(statement.clone());

        if statement.is_cancelled() {
            return Err(SessionError::Cancelled);
        }

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
            if statement.is_cancelled() {
                return Err(SessionError::Cancelled);
            }
        }

        if let Some(message) = &self.failure {
            return Err(SessionError::execution(message.clone()));
        }

        let page = self.page_for(&statement)?;
        Ok(RowStream::from_rows(page.rows, page.continuation))
    }
}

/// An event captured by [`RecordingLogger`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    /// Event name, such as `page_fetched`.
    pub name: &'static str,
    /// Event fields.
    pub fields: Map<String, Value>,
}

/// Logger that keeps every event in memory.
///
/// Clones share the same event log.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl RecordingLogger {
    /// Creates an empty recording logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every recorded event, oldest first.
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the names of every recorded event, oldest first.
    pub fn names(&self) -> Vec<&'static str> {
        self.events().into_iter().map(|event| event.name).collect()
    }

    /// Returns how many events named `name` were recorded.
    pub fn count(&self, name: &str) -> usize {
        self.events()
            .iter()
            .filter(|event| event.name == name)
            .count()
    }
}

impl PageLogger for RecordingLogger {
    fn log(&self, event: &PageEvent<'_>) {
        let recorded = RecordedEvent {
            name: event.name(),
            fields: event.fields(),
        };

        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(recorded);
    }
}
