use super::list::{Entries, TierList};
use super::{Added, Policy};
use crate::entry::{Entry, Handle, Tier};

/// An eviction policy that evicts the least recently used entries.
#[derive(Debug)]
pub(crate) struct LruPolicy {
  // Ordered by recent use (head is most recent).
  list: TierList,
  capacity: usize,
}

impl LruPolicy {
  pub(crate) fn new(capacity: usize) -> Self {
    Self {
      list: TierList::new(Tier::Lru),
      capacity,
    }
  }
}

impl Policy for LruPolicy {
  /// When an item is inserted, it is the most recently used.
  fn add<K, V>(&mut self, entries: &mut Entries<K, V>, entry: Entry<K, V>) -> Added<K, V> {
    let handle = entries.insert(entry);
    self.list.push_front(entries, handle);

    let evicted = if self.list.len() > self.capacity {
      self
        .list
        .pop_back(entries)
        .and_then(|victim| entries.remove(victim))
    } else {
      None
    };
    Added { handle, evicted }
  }

  fn hit<K, V>(&mut self, entries: &mut Entries<K, V>, handle: Handle) {
    self.list.move_to_front(entries, handle);
  }

  fn remove<K, V>(&mut self, entries: &mut Entries<K, V>, handle: Handle) -> Option<Entry<K, V>> {
    if !self.list.contains(entries, handle) {
      return None;
    }
    self.list.unlink(entries, handle);
    entries.remove(handle)
  }

  fn walk<K, V>(&self, entries: &Entries<K, V>, visitor: &mut dyn FnMut(&Entry<K, V>)) {
    self.list.walk(entries, visitor);
  }

  fn clear(&mut self) {
    self.list.clear();
  }
}
