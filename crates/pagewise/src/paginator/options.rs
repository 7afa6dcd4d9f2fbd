//! Per-paginator options.

use std::borrow::Cow;
use std::sync::Arc;

use derive_builder::Builder;
use pagewise_core::Filters;
use tokio_util::sync::CancellationToken;

use crate::PageError;
use crate::hooks::{NoopMetrics, PageLogger, PageMetrics, TracingLogger};

/// Page size used when none, or zero, is configured.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Number of issued tokens a paginator remembers by default.
pub const DEFAULT_TOKEN_HISTORY: usize = 10;

/// Options fixed for the lifetime of one [`Paginator`].
///
/// Built with [`PaginatorOptions::builder`]; every field has a default.
///
/// [`Paginator`]: super::Paginator
#[derive(Clone, Builder)]
#[builder(
    name = "PaginatorOptionsBuilder",
    pattern = "owned",
    setter(into, prefix = "with"),
    build_fn(validate = "Self::validate_options", error = "PageError")
)]
pub struct PaginatorOptions {
    /// Rows per page. Zero falls back to [`DEFAULT_PAGE_SIZE`].
    #[builder(default = "DEFAULT_PAGE_SIZE")]
    pub page_size: usize,
    /// Columns that replace the `*` projection marker.
    #[builder(default)]
    pub columns: Vec<String>,
    /// Dynamic filters appended to the query.
    #[builder(default)]
    pub filters: Filters,
    /// Number of issued tokens kept for history-based navigation.
    #[builder(default = "DEFAULT_TOKEN_HISTORY")]
    pub history_capacity: usize,
    /// Cancellation signal passed to every statement.
    #[builder(default, setter(strip_option))]
    pub cancellation: Option<CancellationToken>,
    /// Receives structured events.
    #[builder(default = "Arc::new(TracingLogger)", setter(custom))]
    pub logger: Arc<dyn PageLogger>,
    /// Receives fetch measurements.
    #[builder(default = "Arc::new(NoopMetrics)", setter(custom))]
    pub metrics: Arc<dyn PageMetrics>,
}

impl PaginatorOptions {
    /// Creates a new options builder.
    pub fn builder() -> PaginatorOptionsBuilder {
        PaginatorOptionsBuilder::default()
    }

    /// Returns the page size actually requested from the session.
    #[inline]
    pub fn effective_page_size(&self) -> usize {
        if self.page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.page_size
        }
    }

    /// Replaces the first `*` in `query` with the configured columns.
    pub fn project<'q>(&self, query: &'q str) -> Cow<'q, str> {
        if self.columns.is_empty() {
            return Cow::Borrowed(query);
        }

        Cow::Owned(query.replacen('*', &self.columns.join(", "), 1))
    }
}

impl Default for PaginatorOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            columns: Vec::new(),
            filters: Filters::default(),
            history_capacity: DEFAULT_TOKEN_HISTORY,
            cancellation: None,
            logger: Arc::new(TracingLogger),
            metrics: Arc::new(NoopMetrics),
        }
    }
}

impl PaginatorOptionsBuilder {
    /// Sets the logger hook. Closures taking a `&PageEvent` are accepted.
    pub fn with_logger(mut self, logger: impl PageLogger + 'static) -> Self {
        self.logger = Some(Arc::new(logger));
        self
    }

    /// Sets the metrics hook, keeping the caller's handle usable.
    pub fn with_metrics<M>(mut self, metrics: Arc<M>) -> Self
    where
        M: PageMetrics + 'static,
    {
        self.metrics = Some(metrics as Arc<dyn PageMetrics>);
        self
    }

    fn validate_options(&self) -> Result<(), PageError> {
        if self.history_capacity == Some(0) {
            return Err(PageError::Config(
                "history capacity must be greater than 0".to_string(),
            ));
        }

        if let Some(columns) = &self.columns
            && columns.iter().any(|column| column.trim().is_empty())
        {
            return Err(PageError::Config(
                "column names cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl std::fmt::Debug for PaginatorOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginatorOptions")
            .field("page_size", &self.page_size)
            .field("columns", &self.columns)
            .field("filters", &self.filters)
            .field("history_capacity", &self.history_capacity)
            .field("cancellation", &self.cancellation.is_some())
            .finish_non_exhaustive()
    }
}
