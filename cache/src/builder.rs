use crate::config::CacheConfig;
use crate::error::BuildError;
use crate::handles::Cache;
use crate::listener::RemovalListener;
use crate::policy::PolicyKind;

use core::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use tracing::debug;

/// A builder for creating `Cache` instances.
pub struct CacheBuilder<K, V, H = ahash::RandomState> {
  maximum_size: usize,
  policy: PolicyKind,
  // A policy given by name is only validated in `build()`.
  policy_name: Option<String>,
  hasher: H,
  listener: Option<Arc<dyn RemovalListener<K, V>>>,
}

// Manual Debug implementation for CacheBuilder.
impl<K, V, H> fmt::Debug for CacheBuilder<K, V, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheBuilder")
      .field("maximum_size", &self.maximum_size)
      .field("policy", &self.policy)
      .field("policy_name", &self.policy_name)
      .field("has_listener", &self.listener.is_some())
      .finish_non_exhaustive()
  }
}

// --- General Configuration Methods ---
impl<K, V, H> CacheBuilder<K, V, H> {
  /// Sets the maximum number of entries. `0` means unbounded.
  pub fn maximum_size(mut self, size: usize) -> Self {
    self.maximum_size = size;
    self
  }

  /// Sets the cache to be "unbounded": nothing is ever evicted.
  pub fn unbounded(mut self) -> Self {
    self.maximum_size = 0;
    self
  }

  /// Sets the eviction policy. Defaults to `PolicyKind::Slru`.
  pub fn policy(mut self, policy: PolicyKind) -> Self {
    self.policy = policy;
    self.policy_name = None;
    self
  }

  /// Sets the eviction policy by name (`lru`, `slru` or `tinylfu`).
  ///
  /// An unrecognized name makes `build()` fail with `BuildError::UnknownPolicy`.
  pub fn policy_name(mut self, name: impl Into<String>) -> Self {
    self.policy_name = Some(name.into());
    self
  }

  /// Sets the listener told about every entry that leaves the cache.
  pub fn removal_listener<Listener>(mut self, listener: Listener) -> Self
  where
    Listener: RemovalListener<K, V> + 'static,
  {
    self.listener = Some(Arc::new(listener));
    self
  }

  /// Sets the hasher used for the index and for the entries' frequency hashes.
  pub fn hasher(mut self, hasher: H) -> Self {
    self.hasher = hasher;
    self
  }

  /// Applies a deserialized configuration on top of this builder.
  pub fn config(self, config: &CacheConfig) -> Self {
    self
      .maximum_size(config.maximum_size)
      .policy_name(config.policy.clone())
  }
}

// --- Default Constructor ---
impl<K, V, H: BuildHasher + Default> CacheBuilder<K, V, H> {
  /// Creates a new `CacheBuilder` with default settings: unbounded, SLRU,
  /// no listener.
  pub fn new() -> Self {
    Self {
      maximum_size: 0,
      policy: PolicyKind::default(),
      policy_name: None,
      hasher: H::default(),
      listener: None,
    }
  }

  /// Creates a builder from a deserialized configuration.
  pub fn from_config(config: &CacheConfig) -> Self {
    Self::new().config(config)
  }
}

impl<K, V> Default for CacheBuilder<K, V, ahash::RandomState> {
  fn default() -> Self {
    Self::new()
  }
}

// --- Build Methods ---
impl<K, V, H> CacheBuilder<K, V, H>
where
  K: Eq + Hash + Clone,
  H: BuildHasher + Clone,
{
  /// Builds a `Cache`. Fails without side effects on an unknown policy name.
  pub fn build(self) -> Result<Cache<K, V, H>, BuildError> {
    let policy = match &self.policy_name {
      Some(name) => name.parse::<PolicyKind>()?,
      None => self.policy,
    };
    let maximum_size = (self.maximum_size > 0).then_some(self.maximum_size);

    debug!(?maximum_size, %policy, "building cache");
    Ok(Cache::from_parts(
      self.hasher,
      policy,
      maximum_size,
      self.listener,
    ))
  }
}
