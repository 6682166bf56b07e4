//! [`Cache`] of query results.

use std::{collections::HashMap, time::Duration};

use tokio::time::Instant;

/// Cache of a single query results, keyed by canonical query parameters.
///
/// Every fetch takes a [`Ticket`] first. A fetched value is committed only
/// if its [`Ticket`] is the latest one issued for its key, so a
/// later-issued fetch always supersedes an earlier one, whatever order they
/// complete in.
#[derive(Debug)]
pub struct Cache<V> {
    /// Freshness window of the values.
    window: Duration,

    /// [`Entry`]s by their keys.
    entries: HashMap<String, Entry<V>>,

    /// Latest issued [`Ticket`] sequence number by a key.
    issued: HashMap<String, u64>,

    /// Last issued [`Ticket`] sequence number.
    sequence: u64,

    /// Sequence number of the last [`Ticket`] issued before the latest
    /// invalidation.
    invalidated_through: u64,
}

/// Cached value of a query.
#[derive(Clone, Debug)]
pub struct Entry<V> {
    /// Last fetched value.
    pub value: V,

    /// [`Instant`] when the value was fetched.
    pub fetched_at: Instant,

    /// Indicator whether the value was invalidated.
    pub is_stale: bool,

    /// Sequence number of the [`Ticket`] the value was fetched with.
    pub sequence: u64,
}

/// Permission to commit a fetched value into a [`Cache`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ticket {
    /// Key of the fetched value.
    key: String,

    /// Monotonically increasing sequence number.
    sequence: u64,
}

/// Outcome of a [`Cache::commit()`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Commit {
    /// Value is stored as a fresh one.
    Fresh,

    /// Value is stored, but as a stale one, because it was fetched before
    /// the latest invalidation.
    Stale,

    /// Value is discarded, because a later fetch was issued for its key.
    Superseded,
}

impl<V> Cache<V> {
    /// Creates a new empty [`Cache`] with the provided freshness `window`.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: HashMap::new(),
            issued: HashMap::new(),
            sequence: 0,
            invalidated_through: 0,
        }
    }

    /// Returns the value under the provided `key`, if it's neither stale nor
    /// older than the freshness window.
    #[must_use]
    pub fn fresh(&self, key: &str) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|e| !e.is_stale && e.fetched_at.elapsed() < self.window)
            .map(|e| &e.value)
    }

    /// Returns the [`Entry`] under the provided `key`, however old it is.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Entry<V>> {
        self.entries.get(key)
    }

    /// Issues a new [`Ticket`] for fetching a value under the provided
    /// `key`.
    pub fn issue(&mut self, key: impl Into<String>) -> Ticket {
        self.sequence += 1;
        let key = key.into();
        drop(self.issued.insert(key.clone(), self.sequence));
        Ticket {
            key,
            sequence: self.sequence,
        }
    }

    /// Commits the `value` fetched with the provided [`Ticket`].
    pub fn commit(&mut self, ticket: Ticket, value: V) -> Commit {
        let Ticket { key, sequence } = ticket;
        if self.issued.get(&key) != Some(&sequence) {
            tracing::debug!(%key, sequence, "superseded response dropped");
            return Commit::Superseded;
        }
        let is_stale = sequence <= self.invalidated_through;
        drop(self.entries.insert(
            key,
            Entry {
                value,
                fetched_at: Instant::now(),
                is_stale,
                sequence,
            },
        ));
        if is_stale {
            Commit::Stale
        } else {
            Commit::Fresh
        }
    }

    /// Marks all the values of this [`Cache`] as stale, including the ones
    /// being fetched at the moment.
    pub fn invalidate(&mut self) {
        self.invalidated_through = self.sequence;
        for e in self.entries.values_mut() {
            e.is_stale = true;
        }
    }

    /// Drops all the values of this [`Cache`].
    ///
    /// Fetches being in flight at the moment will be superseded.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.issued.clear();
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use super::{Cache, Commit};

    const WINDOW: Duration = Duration::from_secs(60);

    #[test]
    fn later_issued_fetch_wins() {
        let mut cache = Cache::new(WINDOW);
        let first = cache.issue("k");
        let second = cache.issue("k");

        assert_eq!(cache.commit(second, "second"), Commit::Fresh);
        assert_eq!(cache.commit(first, "first"), Commit::Superseded);
        assert_eq!(cache.get("k").unwrap().value, "second");
    }

    #[test]
    fn keys_are_sequenced_independently() {
        let mut cache = Cache::new(WINDOW);
        let a = cache.issue("a");
        let b = cache.issue("b");

        assert_eq!(cache.commit(a, 1), Commit::Fresh);
        assert_eq!(cache.commit(b, 2), Commit::Fresh);
    }

    #[test]
    fn in_flight_fetch_is_stored_stale_after_invalidation() {
        let mut cache = Cache::new(WINDOW);
        let ticket = cache.issue("k");
        cache.invalidate();

        assert_eq!(cache.commit(ticket, 1), Commit::Stale);
        assert!(cache.fresh("k").is_none());
        assert!(cache.get("k").unwrap().is_stale);

        let ticket = cache.issue("k");
        assert_eq!(cache.commit(ticket, 2), Commit::Fresh);
        assert_eq!(cache.fresh("k"), Some(&2));
    }

    #[test]
    fn cleared_cache_drops_in_flight_fetches() {
        let mut cache = Cache::new(WINDOW);
        let ticket = cache.issue("k");
        cache.clear();

        assert_eq!(cache.commit(ticket, 1), Commit::Superseded);
        assert!(cache.get("k").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn freshness_window() {
        let mut cache = Cache::new(WINDOW);
        let ticket = cache.issue("k");
        _ = cache.commit(ticket, 1);

        tokio::time::advance(WINDOW - Duration::from_secs(1)).await;
        assert_eq!(cache.fresh("k"), Some(&1));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.fresh("k").is_none());
        assert_eq!(cache.get("k").map(|e| e.value), Some(1));
    }
}
