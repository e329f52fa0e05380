use crate::entry::{Entry, Handle};
use crate::policy::list::Entries;
use crate::policy::{Added, EvictionPolicy, Policy};
use crate::refresh::{RefreshLock, RefreshState};

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use generational_arena::Arena;
use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A helper function to hash a key using a `BuildHasher`.
#[inline]
pub(crate) fn hash_key<Q: Hash + ?Sized, H: BuildHasher>(hasher: &H, key: &Q) -> u64 {
  hasher.hash_one(key)
}

/// What the index keeps for each live key.
#[derive(Debug)]
pub(crate) struct Slot {
  pub(crate) handle: Handle,
  // Shared with the entry so refresh coordination never needs the ordering lock.
  pub(crate) refresh: Arc<RefreshLock>,
}

pub(crate) type IndexMap<K, H> = HashMap<K, Slot, H>;

/// The key -> handle mapping, guarded by the first lock in the cache's lock
/// order. Readers proceed concurrently.
pub(crate) struct Index<K, H> {
  map: RwLock<IndexMap<K, H>>,
  // Refresh flags of removed entries whose refresh was still in flight. A
  // re-inserted key adopts its flag, so one key never has two refreshes in
  // flight. Only locked while `map` is held, and never before it.
  parked: Mutex<HashMap<K, Arc<RefreshLock>, H>>,
  hasher: H,
}

impl<K, H> fmt::Debug for Index<K, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Index").finish_non_exhaustive()
  }
}

impl<K, H> Index<K, H>
where
  K: Eq + Hash,
  H: BuildHasher + Clone,
{
  pub(crate) fn new(hasher: H) -> Self {
    Self {
      map: RwLock::new(HashMap::with_hasher(hasher.clone())),
      parked: Mutex::new(HashMap::with_hasher(hasher.clone())),
      hasher,
    }
  }

  /// The hash an entry for `key` carries for its whole lifetime.
  #[inline]
  pub(crate) fn hash<Q>(&self, key: &Q) -> u64
  where
    K: Borrow<Q>,
    Q: Hash + ?Sized,
  {
    hash_key(&self.hasher, key)
  }

  #[inline]
  pub(crate) fn read(&self) -> RwLockReadGuard<'_, IndexMap<K, H>> {
    self.map.read()
  }

  #[inline]
  pub(crate) fn write(&self) -> RwLockWriteGuard<'_, IndexMap<K, H>> {
    self.map.write()
  }

  /// Clones the refresh flag of a live key, releasing the index lock before
  /// returning.
  pub(crate) fn refresh_lock<Q>(&self, key: &Q) -> Option<Arc<RefreshLock>>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.map.read().get(key).map(|slot| slot.refresh.clone())
  }

  /// Ends the refresh of `key`, whether its entry is live or was removed
  /// while the refresh was in flight. Returns the replaced state, or `None`
  /// if nothing was known about the key.
  pub(crate) fn end_refresh<Q>(&self, key: &Q) -> Option<RefreshState>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    // Held so a concurrent insert cannot adopt the parked flag in between.
    let map = self.map.read();
    match map.get(key) {
      Some(slot) => Some(slot.refresh.end()),
      None => self.parked.lock().remove(key).map(|lock| lock.end()),
    }
  }

  /// Takes the in-flight refresh flag left behind by a removed entry for
  /// `key`. Must be called with the write lock held.
  pub(crate) fn adopt_refresh(&self, key: &K) -> Option<Arc<RefreshLock>> {
    self
      .parked
      .lock()
      .remove(key)
      .filter(|lock| lock.is_refreshing())
  }

  /// Keeps the flags of removed entries that are still being refreshed.
  /// Must be called with the write lock held.
  pub(crate) fn park_refreshes<'a, V: 'a>(&self, removed: impl IntoIterator<Item = &'a Entry<K, V>>)
  where
    K: Clone + 'a,
  {
    let mut guard = None;
    for entry in removed {
      if entry.refresh.is_refreshing() {
        let parked = guard.get_or_insert_with(|| {
          let mut parked = self.parked.lock();
          // Flags ended through a guard are no longer worth keeping.
          parked.retain(|_, lock| lock.is_refreshing());
          parked
        });
        parked.insert(entry.key.clone(), entry.refresh.clone());
      }
    }
  }
}

/// The entry arena together with the policy that orders it, guarded by the
/// second lock in the cache's lock order.
#[derive(Debug)]
pub(crate) struct Tiers<K, V> {
  pub(crate) entries: Entries<K, V>,
  pub(crate) policy: EvictionPolicy,
}

impl<K, V> Tiers<K, V> {
  pub(crate) fn new(policy: EvictionPolicy) -> Self {
    Self {
      entries: Arena::new(),
      policy,
    }
  }

  pub(crate) fn add(&mut self, entry: Entry<K, V>) -> Added<K, V> {
    self.policy.add(&mut self.entries, entry)
  }

  /// Marks a read of the entry behind `handle` and returns its value.
  pub(crate) fn hit(&mut self, handle: Handle) -> Option<Arc<V>> {
    let entry = self.entries.get_mut(handle)?;
    entry.touch();
    let value = entry.value.clone();
    self.policy.hit(&mut self.entries, handle);
    Some(value)
  }

  /// Replaces the value in place. A replacement counts as an access.
  pub(crate) fn replace(&mut self, handle: Handle, value: V) -> Option<Arc<V>> {
    let old = self.entries.get_mut(handle)?.replace(value);
    self.policy.hit(&mut self.entries, handle);
    Some(old)
  }

  pub(crate) fn get(&self, handle: Handle) -> Option<&Entry<K, V>> {
    self.entries.get(handle)
  }

  pub(crate) fn contains(&self, handle: Handle) -> bool {
    self.entries.contains(handle)
  }

  pub(crate) fn remove(&mut self, handle: Handle) -> Option<Entry<K, V>> {
    self.policy.remove(&mut self.entries, handle)
  }

  pub(crate) fn walk(&self, visitor: &mut dyn FnMut(&Entry<K, V>)) {
    self.policy.walk(&self.entries, visitor);
  }

  /// Empties every tier and hands back all entries that were live.
  pub(crate) fn drain(&mut self) -> Vec<Entry<K, V>> {
    self.policy.clear();
    self.entries.drain().map(|(_, entry)| entry).collect()
  }

  pub(crate) fn len(&self) -> usize {
    self.entries.len()
  }
}

/// The ordering lock.
pub(crate) type TiersLock<K, V> = Mutex<Tiers<K, V>>;
