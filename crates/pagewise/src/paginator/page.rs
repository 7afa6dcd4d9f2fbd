use crate::session::Row;

/// One page of results and the token for the page after it.
///
/// An empty `next_token` means the result set is exhausted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page<T = Row> {
    /// Rows of this page, at most the configured page size.
    pub rows: Vec<T>,
    /// Opaque token for the following page.
    pub next_token: String,
}

impl<T> Page<T> {
    /// Creates a page from its rows and next token.
    pub fn new(rows: Vec<T>, next_token: impl Into<String>) -> Self {
        Self {
            rows,
            next_token: next_token.into(),
        }
    }

    /// Returns whether another page follows this one.
    #[inline]
    pub fn has_more(&self) -> bool {
        !self.next_token.is_empty()
    }

    /// Returns the number of rows on this page.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns whether this page holds no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Converts every row, keeping the next token.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            rows: self.rows.into_iter().map(f).collect(),
            next_token: self.next_token,
        }
    }

    /// Splits the page into rows and next token.
    pub fn into_parts(self) -> (Vec<T>, String) {
        (self.rows, self.next_token)
    }
}
