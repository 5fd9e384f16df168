//! Concurrency-safe record of already-claimed addresses
//!
//! The visited set is the single synchronization point deciding which task
//! owns an address. Membership test and insertion happen under one lock
//! acquisition, so exactly one caller ever wins a given address.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Set of addresses claimed during one crawl
///
/// Addresses are never removed once claimed.
#[derive(Debug, Default)]
pub struct VisitedSet {
    addresses: Mutex<HashSet<String>>,
}

impl VisitedSet {
    /// Creates an empty visited set
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claims an address
    ///
    /// # Returns
    ///
    /// * `true` - The caller is the first claimant and owns the address
    /// * `false` - The address was already claimed; the caller must not fetch
    ///   it or emit a result for it
    ///
    /// # Example
    ///
    /// ```
    /// use ripple_crawl::state::VisitedSet;
    ///
    /// let visited = VisitedSet::new();
    /// assert!(visited.claim("https://golang.org/"));
    /// assert!(!visited.claim("https://golang.org/"));
    /// ```
    pub fn claim(&self, address: &str) -> bool {
        self.lock().insert(address.to_string())
    }

    /// Number of claimed addresses
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sorted snapshot of every claimed address
    pub fn addresses(&self) -> Vec<String> {
        let mut addresses: Vec<String> = self.lock().iter().cloned().collect();
        addresses.sort();
        addresses
    }

    // A panic while holding the lock cannot leave the set half-updated, so a
    // poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.addresses.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
