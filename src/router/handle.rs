//! Atomically swappable matcher for configuration reloads.
//!
//! A reload builds a complete new [`PathMatcher`] and publishes it with a
//! single pointer swap. Readers holding a guard keep using the instance they
//! loaded until they drop it, so nobody ever observes a partially built trie.

use arc_swap::{ArcSwap, Guard};
use std::sync::Arc;
use tracing::info;

use super::core::PathMatcher;

/// Shared handle to the currently published matcher.
#[derive(Debug)]
pub struct MatcherHandle<T> {
    current: Arc<ArcSwap<PathMatcher<T>>>,
}

impl<T> Clone for MatcherHandle<T> {
    fn clone(&self) -> Self {
        Self {
            current: Arc::clone(&self.current),
        }
    }
}

impl<T> MatcherHandle<T> {
    #[must_use]
    pub fn new(matcher: PathMatcher<T>) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(matcher)),
        }
    }

    /// Borrow the current matcher for the duration of one request.
    #[must_use]
    pub fn load(&self) -> Guard<Arc<PathMatcher<T>>> {
        self.current.load()
    }

    /// Owned reference to the current matcher.
    #[must_use]
    pub fn snapshot(&self) -> Arc<PathMatcher<T>> {
        self.current.load_full()
    }

    /// Publish a fully built matcher, returning the one it replaced.
    pub fn swap(&self, matcher: PathMatcher<T>) -> Arc<PathMatcher<T>> {
        let routes_count = matcher.len();
        let previous = self.current.swap(Arc::new(matcher));
        info!(
            routes_count,
            previous_routes_count = previous.len(),
            "Published new path matcher"
        );
        previous
    }
}
