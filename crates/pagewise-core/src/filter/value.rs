//! Filter values and the descriptor-to-value mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A value bound into a query placeholder.
pub type Value = serde_json::Value;

/// A value attached to a filter descriptor.
///
/// Comparison predicates bind a single scalar, membership predicates bind
/// every element of a list. The compiler matches on the variant, so a
/// scalar given to a membership descriptor is dropped rather than bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Ordered collection of values for membership tests.
    List(Vec<Value>),
    /// Single value for equality and comparison tests.
    Scalar(Value),
}

impl FilterValue {
    /// Creates a scalar filter value.
    pub fn scalar(value: impl Into<Value>) -> Self {
        Self::Scalar(value.into())
    }

    /// Creates a list filter value.
    pub fn list<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    /// Returns the elements if this is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(values) => Some(values),
            Self::Scalar(_) => None,
        }
    }
}

macro_rules! impl_scalar_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for FilterValue {
                fn from(value: $ty) -> Self {
                    Self::Scalar(value.into())
                }
            }
        )*
    };
}

impl_scalar_from!(bool, i32, i64, u32, u64, f64, &str, String, Value);

impl<T: Into<Value>> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        Self::list(values)
    }
}

/// Mapping from predicate descriptors to filter values.
///
/// A descriptor is a column name optionally followed by an operator, for
/// example `"age >"`, `"region IN"` or `"status"`. Entries are kept in
/// descriptor order so one mapping always compiles to the same query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filters(BTreeMap<String, FilterValue>);

impl Filters {
    /// Creates an empty filter mapping.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter and returns the mapping.
    pub fn with(mut self, descriptor: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.insert(descriptor, value);
        self
    }

    /// Adds a filter, replacing any value under the same descriptor.
    pub fn insert(
        &mut self,
        descriptor: impl Into<String>,
        value: impl Into<FilterValue>,
    ) -> Option<FilterValue> {
        self.0.insert(descriptor.into(), value.into())
    }

    /// Returns whether no filter is set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of descriptors.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over descriptors and values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for Filters
where
    K: Into<String>,
    V: Into<FilterValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
