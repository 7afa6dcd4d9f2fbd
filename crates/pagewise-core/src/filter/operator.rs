//! Predicate operators and descriptor parsing.

use std::sync::OnceLock;

use regex::Regex;
use strum::{AsRefStr, Display, IntoStaticStr};

/// Operator of a single predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, IntoStaticStr)]
pub enum Operator {
    /// Equality, the default when no operator suffix is present.
    #[strum(serialize = "=")]
    Eq,
    /// Strictly greater than.
    #[strum(serialize = ">")]
    Gt,
    /// Strictly less than.
    #[strum(serialize = "<")]
    Lt,
    /// Greater than or equal.
    #[strum(serialize = ">=")]
    Gte,
    /// Less than or equal.
    #[strum(serialize = "<=")]
    Lte,
    /// Membership in a list of values.
    #[strum(serialize = "IN")]
    In,
}

impl Operator {
    /// Suffixes in detection order. Two-character comparisons come before
    /// their one-character prefixes.
    const SUFFIXES: [Operator; 6] = [
        Operator::Gte,
        Operator::Lte,
        Operator::Gt,
        Operator::Lt,
        Operator::In,
        Operator::Eq,
    ];

    /// Returns whether this operator binds a list of values.
    #[inline]
    pub fn is_membership(self) -> bool {
        matches!(self, Operator::In)
    }

    /// Strips this operator from the end of `descriptor`, returning the
    /// remaining text.
    ///
    /// `IN` matches case-insensitively and only as a separate word, so a
    /// column such as `login` is not mistaken for a membership test.
    fn strip_from(self, descriptor: &str) -> Option<&str> {
        if !self.is_membership() {
            return descriptor.strip_suffix(self.as_ref());
        }

        static MEMBERSHIP: OnceLock<Regex> = OnceLock::new();

        let found = MEMBERSHIP
            .get_or_init(|| Regex::new(r"(?i)(?:^|\s)in$").expect("valid pattern"))
            .find(descriptor)?;
        Some(&descriptor[..found.start()])
    }
}

/// Splits a descriptor into its column and operator.
///
/// Surrounding whitespace is ignored. Operators are detected as suffixes in
/// the order `>=`, `<=`, `>`, `<`, `IN`, `=`; without a suffix the
/// operator is equality and the whole descriptor is the column.
pub fn parse_descriptor(descriptor: &str) -> (&str, Operator) {
    let descriptor = descriptor.trim();

    Operator::SUFFIXES
        .iter()
        .find_map(|operator| {
            operator
                .strip_from(descriptor)
                .map(|column| (column.trim_end(), *operator))
        })
        .unwrap_or((descriptor, Operator::Eq))
}
