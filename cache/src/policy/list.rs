use crate::entry::{Entry, Handle, Tier};

use generational_arena::Arena;

/// The arena that owns every live entry. Lists only store handles into it.
pub(crate) type Entries<K, V> = Arena<Entry<K, V>>;

// An intrusive doubly-linked list threaded through the `prev`/`next` fields of
// entries stored in the arena. Each list stamps its `tier` on the entries it owns.
#[derive(Debug)]
pub(crate) struct TierList {
  tier: Tier,
  // Head is the most-recently-used entry.
  head: Option<Handle>,
  // Tail is the least-recently-used entry.
  tail: Option<Handle>,
  len: usize,
}

impl TierList {
  pub(crate) fn new(tier: Tier) -> Self {
    Self {
      tier,
      head: None,
      tail: None,
      len: 0,
    }
  }

  pub(crate) fn len(&self) -> usize {
    self.len
  }

  pub(crate) fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// The least-recently-used entry, if any.
  pub(crate) fn back(&self) -> Option<Handle> {
    self.tail
  }

  pub(crate) fn contains<K, V>(&self, entries: &Entries<K, V>, handle: Handle) -> bool {
    entries.get(handle).is_some_and(|e| e.tier == self.tier)
  }

  // Detaches an entry from its neighbours. The entry must belong to this list.
  pub(crate) fn unlink<K, V>(&mut self, entries: &mut Entries<K, V>, handle: Handle) {
    let (prev, next) = {
      let entry = &mut entries[handle];
      debug_assert_eq!(entry.tier, self.tier, "entry unlinked from the wrong tier");
      let links = (entry.prev.take(), entry.next.take());
      entry.tier = Tier::Detached;
      links
    };

    match prev {
      Some(prev) => entries[prev].next = next,
      // We are unlinking the head of the list.
      None => self.head = next,
    }
    match next {
      Some(next) => entries[next].prev = prev,
      // We are unlinking the tail of the list.
      None => self.tail = prev,
    }
    self.len -= 1;
  }

  // Links a detached entry in as the new head.
  pub(crate) fn push_front<K, V>(&mut self, entries: &mut Entries<K, V>, handle: Handle) {
    let old_head = self.head;
    {
      let entry = &mut entries[handle];
      debug_assert_eq!(entry.tier, Tier::Detached, "entry is already linked");
      entry.tier = self.tier;
      entry.prev = None;
      entry.next = old_head;
    }

    if let Some(old_head) = old_head {
      entries[old_head].prev = Some(handle);
    }
    self.head = Some(handle);
    if self.tail.is_none() {
      self.tail = Some(handle);
    }
    self.len += 1;
  }

  pub(crate) fn move_to_front<K, V>(&mut self, entries: &mut Entries<K, V>, handle: Handle) {
    // Only move if it's not already the head.
    if self.head != Some(handle) {
      self.unlink(entries, handle);
      self.push_front(entries, handle);
    }
  }

  /// Unlinks the least-recently-used entry and returns its handle. The entry
  /// stays in the arena.
  pub(crate) fn pop_back<K, V>(&mut self, entries: &mut Entries<K, V>) -> Option<Handle> {
    let tail = self.tail?;
    self.unlink(entries, tail);
    Some(tail)
  }

  /// Visits the list from the least- to the most-recently-used entry.
  pub(crate) fn walk<K, V>(&self, entries: &Entries<K, V>, visitor: &mut dyn FnMut(&Entry<K, V>)) {
    let mut current = self.tail;
    while let Some(handle) = current {
      let entry = &entries[handle];
      visitor(entry);
      current = entry.prev;
    }
  }

  /// Forgets every link. The caller is responsible for the entries themselves.
  pub(crate) fn clear(&mut self) {
    self.head = None;
    self.tail = None;
    self.len = 0;
  }

  // A helper for tests, to get the order of keys from head to tail.
  #[cfg(test)]
  pub(crate) fn keys_as_vec<K: Clone, V>(&self, entries: &Entries<K, V>) -> Vec<K> {
    let mut keys = Vec::new();
    let mut current = self.head;
    while let Some(index) = current {
      keys.push(entries[index].key.clone());
      current = entries[index].next;
    }
    keys
  }
}
