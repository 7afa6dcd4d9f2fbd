//! Dynamic filters compiled into parameterized predicates.
//!
//! Filters are a mapping from a descriptor (a column name with an optional
//! operator suffix) to a [`FilterValue`]. [`compile`] turns the mapping
//! into a `WHERE` fragment with `?` placeholders and the matching list of
//! bound values. The compiler never inspects the query beyond locating an
//! existing `WHERE` clause.

mod compile;
mod operator;
mod value;

pub use self::compile::{CompiledQuery, compile};
pub use self::operator::{Operator, parse_descriptor};
pub use self::value::{FilterValue, Filters, Value};
