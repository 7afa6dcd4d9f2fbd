//! Bounded history of issued page tokens.
//!
//! The history is a local, best-effort accelerator for "go back" requests
//! on a single instance. It is not shared between processes, so the
//! `previous` link embedded in every token remains the authoritative way
//! to navigate backward.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::TRACING_TARGET_HISTORY;

/// Capacity used when a history is created with a capacity of zero.
pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

/// Insertion-ordered, duplicate-free, size-bounded list of tokens.
///
/// Cloning the history yields another handle to the same list. Every
/// operation takes the lock only for the duration of a scan or splice.
#[derive(Clone)]
pub struct TokenHistory {
    tokens: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl TokenHistory {
    /// Creates a history holding up to `capacity` tokens.
    ///
    /// A capacity of zero falls back to [`DEFAULT_HISTORY_CAPACITY`].
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_HISTORY_CAPACITY
        } else {
            capacity
        };

        Self {
            tokens: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Returns the maximum number of tokens kept.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records a token, evicting the oldest entry when full.
    ///
    /// Empty and already recorded tokens are ignored. Returns whether the
    /// token was inserted.
    pub async fn add(&self, token: impl Into<String>) -> bool {
        let token = token.into();
        if token.is_empty() {
            return false;
        }

        let mut tokens = self.tokens.lock().await;
        if tokens.iter().any(|t| *t == token) {
            return false;
        }

        if tokens.len() >= self.capacity {
            tokens.pop_front();
            tracing::trace!(
                target: TRACING_TARGET_HISTORY,
                capacity = self.capacity,
                "Evicted oldest token"
            );
        }

        tokens.push_back(token);
        true
    }

    /// Returns the token recorded immediately before `current`.
    pub async fn previous(&self, current: &str) -> Option<String> {
        let tokens = self.tokens.lock().await;
        let position = tokens.iter().position(|t| t == current)?;
        position
            .checked_sub(1)
            .and_then(|index| tokens.get(index))
            .cloned()
    }

    /// Returns the most recently recorded token.
    pub async fn last(&self) -> Option<String> {
        self.tokens.lock().await.back().cloned()
    }

    /// Returns the number of recorded tokens.
    pub async fn len(&self) -> usize {
        self.tokens.lock().await.len()
    }

    /// Returns whether no token is recorded.
    pub async fn is_empty(&self) -> bool {
        self.tokens.lock().await.is_empty()
    }

    /// Removes every recorded token.
    pub async fn clear(&self) {
        self.tokens.lock().await.clear();
    }

    /// Returns the recorded tokens, oldest first.
    pub async fn snapshot(&self) -> Vec<String> {
        self.tokens.lock().await.iter().cloned().collect()
    }
}

impl Default for TokenHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl std::fmt::Debug for TokenHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenHistory")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
