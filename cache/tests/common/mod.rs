#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use tiered_cache::{Cache, CacheBuilder, PolicyKind, RemovalCause, RemovalListener};

pub const ALL_POLICIES: [PolicyKind; 3] = [PolicyKind::Lru, PolicyKind::Slru, PolicyKind::TinyLfu];

/// A hasher with fixed seeds, so frequency estimates are identical on every run.
pub fn fixed_hasher() -> ahash::RandomState {
  ahash::RandomState::with_seeds(0x51, 0x7f4a, 0x9e37, 0x2545)
}

/// Records every removal it is told about.
pub struct RecordingListener<K, V> {
  events: Arc<Mutex<Vec<(K, Arc<V>, RemovalCause)>>>,
}

impl<K, V> Clone for RecordingListener<K, V> {
  fn clone(&self) -> Self {
    Self {
      events: self.events.clone(),
    }
  }
}

impl<K, V> RecordingListener<K, V> {
  pub fn new() -> Self {
    Self {
      events: Arc::new(Mutex::new(Vec::new())),
    }
  }

  /// Takes all events recorded so far.
  pub fn drain(&self) -> Vec<(K, Arc<V>, RemovalCause)> {
    std::mem::take(&mut *self.events.lock())
  }

  pub fn len(&self) -> usize {
    self.events.lock().len()
  }
}

impl<K: Send, V: Send + Sync> RemovalListener<K, V> for RecordingListener<K, V> {
  fn on_removal(&self, key: K, value: Arc<V>, cause: RemovalCause) {
    self.events.lock().push((key, value, cause));
  }
}

pub fn build_cache<V>(policy: PolicyKind, maximum_size: usize) -> Cache<i32, V> {
  CacheBuilder::new()
    .maximum_size(maximum_size)
    .policy(policy)
    .hasher(fixed_hasher())
    .build()
    .unwrap()
}

pub fn build_recording_cache<V: Send + Sync + 'static>(
  policy: PolicyKind,
  maximum_size: usize,
) -> (Cache<i32, V>, RecordingListener<i32, V>) {
  let listener = RecordingListener::new();
  let cache = CacheBuilder::new()
    .maximum_size(maximum_size)
    .policy(policy)
    .hasher(fixed_hasher())
    .removal_listener(listener.clone())
    .build()
    .unwrap();
  (cache, listener)
}
