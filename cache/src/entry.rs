use crate::refresh::RefreshLock;
use crate::time::{self, Timestamp};

use std::sync::Arc;

use generational_arena::Index;

/// A stable, copyable reference to an entry's slot in the entry arena.
///
/// Handles are generational: once an entry is removed, its handle never
/// resolves again, even if the slot is reused.
pub(crate) type Handle = Index;

/// The ordering structure that currently owns an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tier {
  /// Not linked into any list. Only observed while an entry is in transit.
  Detached,
  /// The single list of the plain LRU policy.
  Lru,
  /// The admission window of W-TinyLFU.
  Window,
  /// The probationary segment of an SLRU.
  Probation,
  /// The protected segment of an SLRU.
  Protected,
}

/// A container for a cached value, holding all of its metadata and its
/// position in the policy's intrusive lists.
#[derive(Debug)]
pub(crate) struct Entry<K, V> {
  pub(crate) key: K,
  /// The user's value, wrapped in an Arc for shared ownership.
  pub(crate) value: Arc<V>,
  /// Last time the entry was read or written.
  pub(crate) accessed: Timestamp,
  /// Last time the value was replaced.
  pub(crate) updated: Timestamp,
  pub(crate) tier: Tier,
  /// Hash of `key`, computed once with the cache's hasher.
  pub(crate) hash: u64,
  pub(crate) refresh: Arc<RefreshLock>,
  pub(crate) prev: Option<Handle>,
  pub(crate) next: Option<Handle>,
}

impl<K, V> Entry<K, V> {
  pub(crate) fn new(key: K, value: V, hash: u64) -> Self {
    let now = time::now();
    Self {
      key,
      value: Arc::new(value),
      accessed: now,
      updated: now,
      tier: Tier::Detached,
      hash,
      refresh: Arc::new(RefreshLock::new()),
      prev: None,
      next: None,
    }
  }

  /// Carries over the refresh flag of an earlier entry for the same key.
  pub(crate) fn with_refresh(mut self, refresh: Arc<RefreshLock>) -> Self {
    self.refresh = refresh;
    self
  }

  /// Records a read. Timestamps never move backwards.
  #[inline]
  pub(crate) fn touch(&mut self) {
    self.accessed = self.accessed.max(time::now());
  }

  /// Replaces the value in place, keeping the entry's identity, tier and
  /// refresh flag.
  pub(crate) fn replace(&mut self, value: V) -> Arc<V> {
    let now = time::now();
    self.accessed = self.accessed.max(now);
    self.updated = self.updated.max(now);
    std::mem::replace(&mut self.value, Arc::new(value))
  }
}
