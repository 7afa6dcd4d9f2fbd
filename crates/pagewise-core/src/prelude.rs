//! Prelude module for pagewise-core.
//!
//! Re-exports the types needed to encode tokens, compile filters and keep a
//! token history with a single `use` statement.

pub use crate::filter::{CompiledQuery, FilterValue, Filters, Operator, Value, compile};
pub use crate::history::{DEFAULT_HISTORY_CAPACITY, TokenHistory};
pub use crate::token::TokenEnvelope;
pub use crate::{TokenError, TokenResult};
