use super::list::{Entries, TierList};
use super::{Added, Policy};
use crate::entry::{Entry, Handle, Tier};

/// Share of an SLRU's capacity reserved for the protected segment, in percent.
const PROTECTED_PERCENT: usize = 80;

/// The probationary and protected segments of an SLRU.
///
/// Shared by `SlruPolicy` and by the main region of `TinyLfuPolicy`. The
/// segments never evict on their own; callers decide when to take a victim.
#[derive(Debug)]
pub(crate) struct Segments {
  pub(crate) probation: TierList,
  pub(crate) protected: TierList,
  protected_capacity: usize,
}

impl Segments {
  pub(crate) fn new(capacity: usize) -> Self {
    Self {
      probation: TierList::new(Tier::Probation),
      protected: TierList::new(Tier::Protected),
      protected_capacity: protected_capacity(capacity),
    }
  }

  pub(crate) fn len(&self) -> usize {
    self.probation.len() + self.protected.len()
  }

  pub(crate) fn protected_capacity(&self) -> usize {
    self.protected_capacity
  }

  /// New entries always start on probation.
  pub(crate) fn admit<K, V>(&mut self, entries: &mut Entries<K, V>, handle: Handle) {
    self.probation.push_front(entries, handle);
  }

  /// The entry that would be evicted next: the tail of probation, or the tail
  /// of protected when probation is empty.
  pub(crate) fn victim(&self) -> Option<Handle> {
    self.probation.back().or_else(|| self.protected.back())
  }

  /// Unlinks and returns the current victim.
  pub(crate) fn evict<K, V>(&mut self, entries: &mut Entries<K, V>) -> Option<Handle> {
    if self.probation.is_empty() {
      self.protected.pop_back(entries)
    } else {
      self.probation.pop_back(entries)
    }
  }

  pub(crate) fn hit<K, V>(&mut self, entries: &mut Entries<K, V>, handle: Handle) {
    let tier = entries[handle].tier;
    match tier {
      Tier::Probation => {
        self.probation.unlink(entries, handle);
        self.protected.push_front(entries, handle);
        // Demote from protected until it fits again. This swaps entries
        // between segments without changing the total size.
        while self.protected.len() > self.protected_capacity {
          match self.protected.pop_back(entries) {
            Some(demoted) => self.probation.push_front(entries, demoted),
            None => break,
          }
        }
      }
      Tier::Protected => self.protected.move_to_front(entries, handle),
      _ => {}
    }
  }

  pub(crate) fn unlink<K, V>(&mut self, entries: &mut Entries<K, V>, handle: Handle) {
    let tier = entries[handle].tier;
    match tier {
      Tier::Probation => self.probation.unlink(entries, handle),
      Tier::Protected => self.protected.unlink(entries, handle),
      _ => {}
    }
  }

  pub(crate) fn walk<K, V>(&self, entries: &Entries<K, V>, visitor: &mut dyn FnMut(&Entry<K, V>)) {
    self.probation.walk(entries, visitor);
    self.protected.walk(entries, visitor);
  }

  pub(crate) fn clear(&mut self) {
    self.probation.clear();
    self.protected.clear();
  }
}

fn protected_capacity(capacity: usize) -> usize {
  // Divide first so that `usize::MAX` (unbounded) does not overflow.
  capacity / 100 * PROTECTED_PERCENT + capacity % 100 * PROTECTED_PERCENT / 100
}

/// An eviction policy based on the Segmented LRU algorithm.
/// It maintains a probationary and a protected segment to resist cache scans.
#[derive(Debug)]
pub(crate) struct SlruPolicy {
  segments: Segments,
  capacity: usize,
}

impl SlruPolicy {
  pub(crate) fn new(capacity: usize) -> Self {
    Self {
      segments: Segments::new(capacity),
      capacity,
    }
  }

  pub(crate) fn protected_capacity(&self) -> usize {
    self.segments.protected_capacity()
  }
}

impl Policy for SlruPolicy {
  fn add<K, V>(&mut self, entries: &mut Entries<K, V>, entry: Entry<K, V>) -> Added<K, V> {
    let handle = entries.insert(entry);
    self.segments.admit(entries, handle);

    let evicted = if self.segments.len() > self.capacity {
      self
        .segments
        .evict(entries)
        .and_then(|victim| entries.remove(victim))
    } else {
      None
    };
    Added { handle, evicted }
  }

  fn hit<K, V>(&mut self, entries: &mut Entries<K, V>, handle: Handle) {
    self.segments.hit(entries, handle);
  }

  fn remove<K, V>(&mut self, entries: &mut Entries<K, V>, handle: Handle) -> Option<Entry<K, V>> {
    if !entries.contains(handle) {
      return None;
    }
    self.segments.unlink(entries, handle);
    entries.remove(handle)
  }

  fn walk<K, V>(&self, entries: &Entries<K, V>, visitor: &mut dyn FnMut(&Entry<K, V>)) {
    self.segments.walk(entries, visitor);
  }

  fn clear(&mut self) {
    self.segments.clear();
  }
}
