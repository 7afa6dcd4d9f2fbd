//! Metrics hook and an in-process counter collector.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use crate::ErrorKind;

/// Receives fetch measurements from the paginator.
///
/// Implementations typically forward to a metrics backend. Every call is a
/// side effect only.
pub trait PageMetrics: Send + Sync {
    /// Records a successful page fetch.
    fn observe_fetch(&self, rows: usize, duration: Duration);

    /// Records a failed operation.
    fn observe_error(&self, kind: ErrorKind);

    /// Records the number of tokens currently held in the history.
    fn observe_active_tokens(&self, count: usize);
}

/// Metrics hook that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl PageMetrics for NoopMetrics {
    fn observe_fetch(&self, _rows: usize, _duration: Duration) {}

    fn observe_error(&self, _kind: ErrorKind) {}

    fn observe_active_tokens(&self, _count: usize) {}
}

/// Point-in-time copy of a [`CounterMetrics`] collector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Total number of fetched pages.
    pub fetches: u64,
    /// Total number of fetched rows.
    pub rows: u64,
    /// Number of rejected tokens.
    pub invalid_tokens: u64,
    /// Number of backward navigations without an earlier page.
    pub missing_previous: u64,
    /// Number of failed queries.
    pub failed_queries: u64,
    /// Number of next tokens that could not be encoded.
    pub encode_failures: u64,
    /// Last reported history size.
    pub active_tokens: usize,
    /// Duration of the most recent fetch.
    pub last_fetch: Duration,
}

impl MetricsSnapshot {
    /// Returns the total number of recorded errors.
    pub fn errors(&self) -> u64 {
        self.invalid_tokens + self.missing_previous + self.failed_queries + self.encode_failures
    }
}

/// Lock-free counters for fetches, rows, errors and active tokens.
#[derive(Debug, Default)]
pub struct CounterMetrics {
    fetches: AtomicU64,
    rows: AtomicU64,
    invalid_tokens: AtomicU64,
    missing_previous: AtomicU64,
    failed_queries: AtomicU64,
    encode_failures: AtomicU64,
    active_tokens: AtomicUsize,
    last_fetch_micros: AtomicU64,
}

impl CounterMetrics {
    /// Creates a collector with every counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current counter values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            fetches: self.fetches.load(Ordering::Relaxed),
            rows: self.rows.load(Ordering::Relaxed),
            invalid_tokens: self.invalid_tokens.load(Ordering::Relaxed),
            missing_previous: self.missing_previous.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            encode_failures: self.encode_failures.load(Ordering::Relaxed),
            active_tokens: self.active_tokens.load(Ordering::Relaxed),
            last_fetch: Duration::from_micros(self.last_fetch_micros.load(Ordering::Relaxed)),
        }
    }
}

impl PageMetrics for CounterMetrics {
    fn observe_fetch(&self, rows: usize, duration: Duration) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.rows.fetch_add(rows as u64, Ordering::Relaxed);
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        self.last_fetch_micros.store(micros, Ordering::Relaxed);
    }

    fn observe_error(&self, kind: ErrorKind) {
        let counter = match kind {
            ErrorKind::InvalidToken => &self.invalid_tokens,
            ErrorKind::NoPreviousPage => &self.missing_previous,
            ErrorKind::QueryFailed => &self.failed_queries,
            ErrorKind::EncodeFailed => &self.encode_failures,
            ErrorKind::Config => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn observe_active_tokens(&self, count: usize) {
        self.active_tokens.store(count, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_fetches_and_errors() {
        let metrics = CounterMetrics::new();
        metrics.observe_fetch(10, Duration::from_millis(5));
        metrics.observe_fetch(4, Duration::from_millis(2));
        metrics.observe_error(ErrorKind::InvalidToken);
        metrics.observe_error(ErrorKind::QueryFailed);
        metrics.observe_error(ErrorKind::EncodeFailed);
        metrics.observe_active_tokens(3);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.fetches, 2);
        assert_eq!(snapshot.rows, 14);
        assert_eq!(snapshot.invalid_tokens, 1);
        assert_eq!(snapshot.failed_queries, 1);
        assert_eq!(snapshot.encode_failures, 1);
        assert_eq!(snapshot.errors(), 3);
        assert_eq!(snapshot.active_tokens, 3);
        assert_eq!(snapshot.last_fetch, Duration::from_millis(2));
    }
}
