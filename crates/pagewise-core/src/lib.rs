#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for token encoding and decoding.
///
/// Use this target for logging malformed tokens and envelope failures.
pub const TRACING_TARGET_TOKEN: &str = "pagewise_core::token";

/// Tracing target for filter compilation.
///
/// Use this target for logging skipped predicates and compiled queries.
pub const TRACING_TARGET_FILTER: &str = "pagewise_core::filter";

/// Tracing target for token history operations.
pub const TRACING_TARGET_HISTORY: &str = "pagewise_core::history";

mod error;
pub mod filter;
pub mod history;
pub mod prelude;
pub mod token;

pub use error::{TokenError, TokenResult};
pub use filter::{CompiledQuery, FilterValue, Filters, Operator, Value};
pub use history::TokenHistory;
pub use token::TokenEnvelope;
