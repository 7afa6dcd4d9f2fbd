//! Logger hook.

use super::PageEvent;
use crate::TRACING_TARGET_PAGINATOR;

/// Receives structured events from the paginator.
///
/// Logging is a side effect only: implementations cannot change the
/// outcome of a fetch. Any `Fn(&PageEvent)` closure is a logger.
pub trait PageLogger: Send + Sync {
    /// Records one event.
    fn log(&self, event: &PageEvent<'_>);
}

impl<F> PageLogger for F
where
    F: Fn(&PageEvent<'_>) + Send + Sync,
{
    fn log(&self, event: &PageEvent<'_>) {
        self(event)
    }
}

/// Logger that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl PageLogger for NoopLogger {
    fn log(&self, _event: &PageEvent<'_>) {}
}

/// Logger that forwards events to `tracing`.
///
/// Failures are emitted at `warn`, fetched pages at `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl PageLogger for TracingLogger {
    fn log(&self, event: &PageEvent<'_>) {
        match event {
            PageEvent::InvalidToken { token, error } => tracing::warn!(
                target: TRACING_TARGET_PAGINATOR,
                event = event.name(),
                token = %token,
                error = %error,
                "Rejected page token"
            ),
            PageEvent::EncodeFailed { token, error } => tracing::warn!(
                target: TRACING_TARGET_PAGINATOR,
                event = event.name(),
                token = %token,
                error = %error,
                "Failed to encode next page token"
            ),
            PageEvent::NoPreviousPage { token, source } => tracing::warn!(
                target: TRACING_TARGET_PAGINATOR,
                event = event.name(),
                token = %token,
                source = ?source,
                "No previous page available"
            ),
            PageEvent::QueryFailed {
                query,
                error,
                duration,
                page_size,
                ..
            } => tracing::warn!(
                target: TRACING_TARGET_PAGINATOR,
                event = event.name(),
                query = %query,
                error = %error,
                duration_ms = duration.as_millis() as u64,
                page_size,
                "Paginated query failed"
            ),
            PageEvent::PageFetched {
                rows,
                has_next,
                duration,
                page_size,
                ..
            } => tracing::debug!(
                target: TRACING_TARGET_PAGINATOR,
                event = event.name(),
                rows_fetched = rows,
                has_next,
                duration_ms = duration.as_millis() as u64,
                page_size,
                "Fetched page"
            ),
        }
    }
}
