//! Prelude module for pagewise.
//!
//! This module re-exports the most commonly used types and traits from
//! pagewise, making it easy to import everything you need with a single
//! `use` statement.

// Core types
pub use pagewise_core::prelude::*;

// Hooks
pub use crate::hooks::{
    CounterMetrics, NoopLogger, NoopMetrics, PageEvent, PageLogger, PageMetrics, TracingLogger,
};
// Paginator types
pub use crate::paginator::{
    Page, Paginator, PaginatorConfig, PaginatorOptions, PaginatorOptionsBuilder,
};
// Session types
pub use crate::session::{Row, RowStream, Session, SessionError, SessionResult, Statement};
// Error types
pub use crate::{ErrorKind, PageError, PageResult};
