use std::fmt;
use std::sync::Arc;

/// Describes the reason an entry was removed from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemovalCause {
  /// The entry was chosen as a victim because the cache exceeded its maximum size.
  Capacity,
  /// The entry was removed by `invalidate`.
  Invalidated,
  /// The entry was removed by `invalidate_all`.
  Cleared,
}

impl RemovalCause {
  /// Returns `true` if the entry was removed by the eviction policy rather
  /// than by an explicit call from the user.
  pub fn was_evicted(&self) -> bool {
    matches!(self, RemovalCause::Capacity)
  }
}

impl fmt::Display for RemovalCause {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RemovalCause::Capacity => write!(f, "evicted due to capacity"),
      RemovalCause::Invalidated => write!(f, "manually invalidated"),
      RemovalCause::Cleared => write!(f, "removed by a bulk clear"),
    }
  }
}

/// A listener that can be registered with the cache to be told about every
/// entry that leaves it.
///
/// `on_removal` is called exactly once per removed entry, on the thread that
/// caused the removal, after the entry has been unlinked and after every
/// internal lock has been released. It is therefore safe for a listener to
/// call back into the cache.
pub trait RemovalListener<K, V>: Send + Sync {
  fn on_removal(&self, key: K, value: Arc<V>, cause: RemovalCause);
}

impl<K, V, F> RemovalListener<K, V> for F
where
  F: Fn(K, Arc<V>, RemovalCause) + Send + Sync,
{
  fn on_removal(&self, key: K, value: Arc<V>, cause: RemovalCause) {
    self(key, value, cause)
  }
}
