//! Eviction policies and the intrusive lists they are built from.
//!
//! Every policy works over the same arena of entries. Entries are linked into
//! exactly one tier list at a time, and the policy decides where new entries
//! go, how hits reorder them and which one leaves when the cache overflows.

pub(crate) mod list;
pub(crate) mod lru;
pub(crate) mod sketch;
pub(crate) mod slru;
pub(crate) mod tinylfu;

use crate::entry::{Entry, Handle};
use crate::error::BuildError;
use list::Entries;
use lru::LruPolicy;
use slru::SlruPolicy;
use tinylfu::TinyLfuPolicy;

use std::fmt;
use std::str::FromStr;

use tracing::debug;

/// The eviction policies a cache can be built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PolicyKind {
  /// A single least-recently-used list.
  Lru,
  /// Segmented LRU: a probationary and a protected segment.
  #[default]
  Slru,
  /// Window TinyLFU: an LRU admission window in front of an SLRU, with
  /// frequency-based admission.
  TinyLfu,
}

impl PolicyKind {
  /// The configuration name of the policy.
  pub fn as_str(&self) -> &'static str {
    match self {
      PolicyKind::Lru => "lru",
      PolicyKind::Slru => "slru",
      PolicyKind::TinyLfu => "tinylfu",
    }
  }
}

impl fmt::Display for PolicyKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for PolicyKind {
  type Err = BuildError;

  /// Parses a policy name. The empty string selects the default policy.
  fn from_str(name: &str) -> Result<Self, Self::Err> {
    match name {
      "" => Ok(PolicyKind::default()),
      "lru" => Ok(PolicyKind::Lru),
      "slru" => Ok(PolicyKind::Slru),
      "tinylfu" => Ok(PolicyKind::TinyLfu),
      other => Err(BuildError::UnknownPolicy(other.to_string())),
    }
  }
}

/// The outcome of `Policy::add`.
#[derive(Debug)]
pub(crate) struct Added<K, V> {
  /// Where the new entry was stored. If the policy rejected the new entry
  /// itself, this handle no longer resolves.
  pub(crate) handle: Handle,
  /// The entry that had to leave to make room, already unlinked and removed
  /// from the arena.
  pub(crate) evicted: Option<Entry<K, V>>,
}

/// The operations every eviction policy supports.
///
/// All methods are called with the cache's ordering lock held.
pub(crate) trait Policy {
  /// Stores a new entry in its initial tier. Evicts at most one entry when
  /// the policy's capacity is exceeded.
  fn add<K, V>(&mut self, entries: &mut Entries<K, V>, entry: Entry<K, V>) -> Added<K, V>;

  /// Records an access. May reorder or move entries between tiers, but never
  /// changes the number of entries.
  fn hit<K, V>(&mut self, entries: &mut Entries<K, V>, handle: Handle);

  /// Unlinks and returns the entry behind `handle`, or `None` for a stale handle.
  fn remove<K, V>(&mut self, entries: &mut Entries<K, V>, handle: Handle) -> Option<Entry<K, V>>;

  /// Visits every live entry, most-evictable first within each tier.
  fn walk<K, V>(&self, entries: &Entries<K, V>, visitor: &mut dyn FnMut(&Entry<K, V>));

  /// Forgets all tier state. The caller empties the arena.
  fn clear(&mut self);
}

/// The policy chosen at construction, dispatched statically.
#[derive(Debug)]
pub(crate) enum EvictionPolicy {
  Lru(LruPolicy),
  Slru(SlruPolicy),
  TinyLfu(TinyLfuPolicy),
}

macro_rules! dispatch {
  ($self:ident, $policy:ident => $call:expr) => {
    match $self {
      EvictionPolicy::Lru($policy) => $call,
      EvictionPolicy::Slru($policy) => $call,
      EvictionPolicy::TinyLfu($policy) => $call,
    }
  };
}

impl EvictionPolicy {
  pub(crate) fn new(kind: PolicyKind, capacity: usize) -> Self {
    match kind {
      PolicyKind::Lru => EvictionPolicy::Lru(LruPolicy::new(capacity)),
      PolicyKind::Slru => {
        let policy = SlruPolicy::new(capacity);
        debug!(capacity, protected = policy.protected_capacity(), "slru sized");
        EvictionPolicy::Slru(policy)
      }
      PolicyKind::TinyLfu => {
        let policy = TinyLfuPolicy::new(capacity);
        debug!(
          window = policy.window_capacity(),
          main = policy.main_capacity(),
          sketch_width = policy.sketch().width(),
          sketch_sample_size = policy.sketch().sample_size(),
          "tinylfu sized"
        );
        EvictionPolicy::TinyLfu(policy)
      }
    }
  }

  #[cfg(test)]
  pub(crate) fn kind(&self) -> PolicyKind {
    match self {
      EvictionPolicy::Lru(_) => PolicyKind::Lru,
      EvictionPolicy::Slru(_) => PolicyKind::Slru,
      EvictionPolicy::TinyLfu(_) => PolicyKind::TinyLfu,
    }
  }
}

impl Policy for EvictionPolicy {
  fn add<K, V>(&mut self, entries: &mut Entries<K, V>, entry: Entry<K, V>) -> Added<K, V> {
    dispatch!(self, policy => policy.add(entries, entry))
  }

  fn hit<K, V>(&mut self, entries: &mut Entries<K, V>, handle: Handle) {
    dispatch!(self, policy => policy.hit(entries, handle))
  }

  fn remove<K, V>(&mut self, entries: &mut Entries<K, V>, handle: Handle) -> Option<Entry<K, V>> {
    dispatch!(self, policy => policy.remove(entries, handle))
  }

  fn walk<K, V>(&self, entries: &Entries<K, V>, visitor: &mut dyn FnMut(&Entry<K, V>)) {
    dispatch!(self, policy => policy.walk(entries, visitor))
  }

  fn clear(&mut self) {
    dispatch!(self, policy => policy.clear())
  }
}
