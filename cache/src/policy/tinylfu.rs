use super::list::{Entries, TierList};
use super::sketch::FrequencySketch;
use super::slru::Segments;
use super::{Added, Policy};
use crate::entry::{Entry, Handle, Tier};

use tracing::trace;

/// A policy that implements the W-TinyLFU scheme.
///
/// New entries land in a small LRU "window". An entry pushed out of the window
/// becomes an admission candidate and competes with the main region's victim;
/// the frequency sketch decides which one stays. The main region is an SLRU.
#[derive(Debug)]
pub(crate) struct TinyLfuPolicy {
  window: TierList,
  window_capacity: usize,
  main: Segments,
  main_capacity: usize,
  sketch: FrequencySketch,
}

impl TinyLfuPolicy {
  pub(crate) fn new(capacity: usize) -> Self {
    // The window is ~1% of the total cache. A single-slot cache has no room
    // for one, so new entries compete for the main region directly.
    let window_capacity = if capacity < 2 {
      0
    } else {
      ((capacity as f64 * 0.01).round() as usize).clamp(1, capacity - 1)
    };
    let main_capacity = capacity - window_capacity;

    Self {
      window: TierList::new(Tier::Window),
      window_capacity,
      main: Segments::new(main_capacity),
      main_capacity,
      sketch: FrequencySketch::new(capacity),
    }
  }

  pub(crate) fn window_capacity(&self) -> usize {
    self.window_capacity
  }

  pub(crate) fn main_capacity(&self) -> usize {
    self.main_capacity
  }

  pub(crate) fn sketch(&self) -> &FrequencySketch {
    &self.sketch
  }

  // Moves a detached `candidate` into the main region if it wins,
  // returning whichever entry lost the admission contest.
  fn admit<K, V>(&mut self, entries: &mut Entries<K, V>, candidate: Handle) -> Option<Handle> {
    if self.main.len() < self.main_capacity {
      self.main.admit(entries, candidate);
      return None;
    }

    let victim = match self.main.victim() {
      Some(victim) => victim,
      None => {
        self.main.admit(entries, candidate);
        return None;
      }
    };

    let candidate_frequency = self.sketch.frequency(entries[candidate].hash);
    let victim_frequency = self.sketch.frequency(entries[victim].hash);
    // Ties favour the incumbent.
    let admitted = candidate_frequency > victim_frequency;
    trace!(candidate_frequency, victim_frequency, admitted, "tinylfu admission");

    if admitted {
      self.main.unlink(entries, victim);
      self.main.admit(entries, candidate);
      Some(victim)
    } else {
      Some(candidate)
    }
  }
}

impl Policy for TinyLfuPolicy {
  fn add<K, V>(&mut self, entries: &mut Entries<K, V>, entry: Entry<K, V>) -> Added<K, V> {
    self.sketch.increment(entry.hash);
    let handle = entries.insert(entry);

    let loser = if self.window_capacity == 0 {
      // No window: the new entry is the candidate itself.
      self.admit(entries, handle)
    } else {
      self.window.push_front(entries, handle);
      if self.window.len() > self.window_capacity {
        match self.window.pop_back(entries) {
          Some(candidate) => self.admit(entries, candidate),
          None => None,
        }
      } else {
        None
      }
    };

    Added {
      handle,
      evicted: loser.and_then(|loser| entries.remove(loser)),
    }
  }

  fn hit<K, V>(&mut self, entries: &mut Entries<K, V>, handle: Handle) {
    let (tier, hash) = {
      let entry = &entries[handle];
      (entry.tier, entry.hash)
    };
    self.sketch.increment(hash);
    match tier {
      Tier::Window => self.window.move_to_front(entries, handle),
      _ => self.main.hit(entries, handle),
    }
  }

  fn remove<K, V>(&mut self, entries: &mut Entries<K, V>, handle: Handle) -> Option<Entry<K, V>> {
    let tier = entries.get(handle)?.tier;
    match tier {
      Tier::Window => self.window.unlink(entries, handle),
      _ => self.main.unlink(entries, handle),
    }
    entries.remove(handle)
  }

  fn walk<K, V>(&self, entries: &Entries<K, V>, visitor: &mut dyn FnMut(&Entry<K, V>)) {
    self.window.walk(entries, visitor);
    self.main.walk(entries, visitor);
  }

  fn clear(&mut self) {
    self.window.clear();
    self.main.clear();
    self.sketch.clear();
  }
}
