use crate::entry::Entry;
use crate::listener::{RemovalCause, RemovalListener};
use crate::policy::{EvictionPolicy, PolicyKind};
use crate::refresh::{RefreshGuard, RefreshState};
use crate::store::{Index, Slot, Tiers, TiersLock};
use crate::time;

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, trace};

/// A point-in-time view of an entry's bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMetadata {
  /// When the entry was last read or written.
  pub last_accessed: Instant,
  /// When the entry's value was last stored.
  pub last_updated: Instant,
  /// Whether a refresh of this entry is currently in flight.
  pub refreshing: bool,
}

/// A thread-safe, bounded, synchronous cache.
///
/// Two locks protect the cache and they are always taken in the same order:
/// first the index (key -> handle, a reader-writer lock), then the tiers (the
/// entry arena and the eviction policy). Removal listeners are only ever
/// called after both have been released.
pub struct Cache<K, V, H = ahash::RandomState> {
  index: Index<K, H>,
  tiers: TiersLock<K, V>,
  listener: Option<Arc<dyn RemovalListener<K, V>>>,
  maximum_size: Option<usize>,
  policy: PolicyKind,
}

impl<K, V, H> fmt::Debug for Cache<K, V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Cache")
      .field("maximum_size", &self.maximum_size)
      .field("policy", &self.policy)
      .field("has_listener", &self.listener.is_some())
      .finish_non_exhaustive()
  }
}

impl<K, V, H> Cache<K, V, H>
where
  K: Eq + Hash + Clone,
  H: BuildHasher + Clone,
{
  pub(crate) fn from_parts(
    hasher: H,
    policy: PolicyKind,
    maximum_size: Option<usize>,
    listener: Option<Arc<dyn RemovalListener<K, V>>>,
  ) -> Self {
    let capacity = maximum_size.unwrap_or(usize::MAX);
    Self {
      index: Index::new(hasher),
      tiers: TiersLock::new(Tiers::new(EvictionPolicy::new(policy, capacity))),
      listener,
      maximum_size,
      policy,
    }
  }

  /// The configured maximum number of entries, or `None` if unbounded.
  pub fn maximum_size(&self) -> Option<usize> {
    self.maximum_size
  }

  /// The eviction policy this cache was built with.
  pub fn policy(&self) -> PolicyKind {
    self.policy
  }

  /// Returns the value for `key` if present, recording the access with the
  /// eviction policy.
  pub fn get_if_present<Q>(&self, key: &Q) -> Option<Arc<V>>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    let index = self.index.read();
    let slot = index.get(key)?;
    // The index read lock stays held so the handle cannot be removed under us.
    self.tiers.lock().hit(slot.handle)
  }

  /// "Peeks" at a value without updating its recency or frequency.
  pub fn peek<Q>(&self, key: &Q) -> Option<Arc<V>>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    let index = self.index.read();
    let slot = index.get(key)?;
    let tiers = self.tiers.lock();
    tiers.get(slot.handle).map(|entry| entry.value.clone())
  }

  /// Returns `true` if the cache holds an entry for `key`. Not an access.
  pub fn contains_key<Q>(&self, key: &Q) -> bool
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.index.read().contains_key(key)
  }

  /// Returns the timestamps and refresh state of an entry. Not an access.
  pub fn metadata<Q>(&self, key: &Q) -> Option<EntryMetadata>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    let index = self.index.read();
    let slot = index.get(key)?;
    let tiers = self.tiers.lock();
    tiers.get(slot.handle).map(|entry| EntryMetadata {
      last_accessed: time::timestamp_to_instant(entry.accessed),
      last_updated: time::timestamp_to_instant(entry.updated),
      refreshing: entry.refresh.is_refreshing(),
    })
  }

  /// Inserts a value, replacing the current one if the key is present.
  ///
  /// A new key may push the cache over its maximum size, in which case the
  /// policy evicts exactly one entry and the removal listener is told about it.
  /// A replacement keeps the entry (and any refresh in flight) and counts as
  /// an access.
  pub fn put(&self, key: K, value: V) {
    {
      let index = self.index.read();
      if let Some(slot) = index.get(&key) {
        self.tiers.lock().replace(slot.handle, value);
        return;
      }
    }

    let hash = self.index.hash(&key);
    let evicted = {
      let mut index = self.index.write();
      let mut tiers = self.tiers.lock();

      // Double check: another writer may have inserted the key in between.
      if let Some(slot) = index.get(&key) {
        tiers.replace(slot.handle, value);
        return;
      }

      let mut entry = Entry::new(key.clone(), value, hash);
      if let Some(refresh) = self.index.adopt_refresh(&key) {
        entry = entry.with_refresh(refresh);
      }
      let refresh = entry.refresh.clone();
      let added = tiers.add(entry);
      if tiers.contains(added.handle) {
        index.insert(
          key,
          Slot {
            handle: added.handle,
            refresh,
          },
        );
      }
      if let Some(victim) = &added.evicted {
        index.remove(&victim.key);
      }
      self.index.park_refreshes(&added.evicted);
      added.evicted
    };

    if let Some(victim) = evicted {
      trace!(hash = victim.hash, "entry evicted due to capacity");
      self.notify(victim, RemovalCause::Capacity);
    }
  }

  /// Removes the entry for `key`, returning `true` if one was present.
  pub fn invalidate<Q>(&self, key: &Q) -> bool
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    let removed = {
      let mut index = self.index.write();
      let slot = match index.remove(key) {
        Some(slot) => slot,
        None => return false,
      };
      let removed = self.tiers.lock().remove(slot.handle);
      self.index.park_refreshes(&removed);
      removed
    };

    match removed {
      Some(entry) => {
        self.notify(entry, RemovalCause::Invalidated);
        true
      }
      None => false,
    }
  }

  /// Removes every entry. The listener is told about each one after the
  /// cache has already been emptied.
  pub fn invalidate_all(&self) {
    let drained = {
      let mut index = self.index.write();
      let mut tiers = self.tiers.lock();
      index.clear();
      let drained = tiers.drain();
      self.index.park_refreshes(&drained);
      drained
    };

    debug!(entries = drained.len(), "cache cleared");
    for entry in drained {
      self.notify(entry, RemovalCause::Cleared);
    }
  }

  /// Attempts to mark `key` as being refreshed.
  ///
  /// Returns `true` for exactly one caller until `end_refresh` is called for
  /// the key. Returns `false` if another refresh is in flight or the key is
  /// absent. Never blocks on the other refresh and never blocks readers.
  pub fn try_begin_refresh<Q>(&self, key: &Q) -> bool
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self
      .index
      .refresh_lock(key)
      .is_some_and(|lock| lock.try_begin())
  }

  /// Marks the refresh of `key` as finished. Safe to call unconditionally,
  /// including on error paths and for keys that are no longer present.
  ///
  /// A refresh belongs to the key, not to one entry: if the entry was removed
  /// and the key re-inserted while the refresh was in flight, the new entry
  /// stays marked until this is called.
  pub fn end_refresh<Q>(&self, key: &Q)
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    if self.index.end_refresh(key) == Some(RefreshState::Idle) {
      debug!("end_refresh called without a matching try_begin_refresh");
    }
  }

  /// The scoped form of `try_begin_refresh`: the returned guard ends the
  /// refresh when dropped.
  pub fn refresh_guard<Q>(&self, key: &Q) -> Option<RefreshGuard>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    RefreshGuard::acquire(self.index.refresh_lock(key)?)
  }

  /// The number of live entries.
  pub fn len(&self) -> usize {
    self.index.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Returns a point-in-time snapshot of the cache's contents.
  ///
  /// Entries are grouped by tier and listed most-evictable first within
  /// each tier. Taking the snapshot does not count as an access.
  pub fn iter(&self) -> std::vec::IntoIter<(K, Arc<V>)> {
    let tiers = self.tiers.lock();
    let mut items = Vec::with_capacity(tiers.len());
    tiers.walk(&mut |entry| items.push((entry.key.clone(), entry.value.clone())));
    items.into_iter()
  }

  fn notify(&self, entry: Entry<K, V>, cause: RemovalCause) {
    if let Some(listener) = &self.listener {
      listener.on_removal(entry.key, entry.value, cause);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::CacheBuilder;

  fn cache(policy: PolicyKind, size: usize) -> Cache<i32, String> {
    CacheBuilder::new()
      .maximum_size(size)
      .policy(policy)
      .build()
      .unwrap()
  }

  // The index and the tiers must always agree.
  fn assert_consistent<V>(cache: &Cache<i32, V>) {
    let index = cache.index.read();
    let tiers = cache.tiers.lock();
    assert_eq!(index.len(), tiers.len());
    for (key, slot) in index.iter() {
      let entry = tiers.get(slot.handle).expect("indexed handle must resolve");
      assert_eq!(&entry.key, key);
      assert!(Arc::ptr_eq(&entry.refresh, &slot.refresh));
    }
    let mut walked = 0;
    tiers.walk(&mut |_| walked += 1);
    assert_eq!(walked, index.len(), "every entry is in exactly one tier");
  }

  #[test]
  fn index_and_tiers_stay_in_sync() {
    for policy in [PolicyKind::Lru, PolicyKind::Slru, PolicyKind::TinyLfu] {
      let cache = cache(policy, 8);
      for i in 0..50 {
        cache.put(i, i.to_string());
        if i % 3 == 0 {
          cache.get_if_present(&(i / 2));
        }
        if i % 7 == 0 {
          cache.invalidate(&(i - 1));
        }
        assert_consistent(&cache);
        assert!(cache.len() <= 8);
      }
      cache.invalidate_all();
      assert_consistent(&cache);
      assert!(cache.is_empty());
    }
  }

  #[test]
  fn replacement_keeps_the_entry() {
    let cache = cache(PolicyKind::Slru, 4);
    cache.put(1, "one".to_string());
    assert!(cache.try_begin_refresh(&1));
    let before = cache.metadata(&1).unwrap();

    cache.put(1, "uno".to_string());
    let after = cache.metadata(&1).unwrap();
    assert_eq!(cache.peek(&1).as_deref().map(String::as_str), Some("uno"));
    assert!(after.refreshing, "replacement must not reset a refresh in flight");
    assert!(after.last_updated >= before.last_updated);
    assert_eq!(cache.len(), 1);
    assert_consistent(&cache);
  }

  #[test]
  fn unbounded_cache_never_evicts() {
    let cache: Cache<i32, i32> = CacheBuilder::new().unbounded().build().unwrap();
    for i in 0..1_000 {
      cache.put(i, i);
    }
    assert_eq!(cache.len(), 1_000);
    assert_eq!(cache.maximum_size(), None);
  }
}
