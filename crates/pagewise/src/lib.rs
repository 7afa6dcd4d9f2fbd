#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for paginator operations.
///
/// Use this target for logging fetches, backward navigation and hook events.
pub const TRACING_TARGET_PAGINATOR: &str = "pagewise::paginator";

/// Tracing target for session operations.
///
/// Use this target for logging statement execution and row streaming.
pub const TRACING_TARGET_SESSION: &str = "pagewise::session";

mod error;
pub mod hooks;
pub mod paginator;
pub mod prelude;
pub mod session;

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;

pub use pagewise_core::{
    CompiledQuery, FilterValue, Filters, Operator, TokenEnvelope, TokenError, TokenHistory, Value,
    filter, history, token,
};

pub use crate::error::{ErrorKind, PageError, PageResult};
pub use crate::hooks::{
    CounterMetrics, MetricsSnapshot, NoopLogger, NoopMetrics, PageEvent, PageLogger, PageMetrics,
    TracingLogger,
};
pub use crate::paginator::{
    DEFAULT_PAGE_SIZE, Page, Paginator, PaginatorConfig, PaginatorOptions, PaginatorOptionsBuilder,
};
pub use crate::session::{Row, RowStream, Session, SessionError, SessionResult, Statement};
