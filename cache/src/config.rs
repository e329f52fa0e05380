use crate::policy::PolicyKind;

/// Plain-data cache configuration, suitable for loading from a config file.
///
/// ```
/// use tiered_cache::{Cache, CacheBuilder, CacheConfig};
///
/// let config = CacheConfig {
///   maximum_size: 1_000,
///   policy: "tinylfu".to_string(),
/// };
/// let cache: Cache<String, u64> = CacheBuilder::from_config(&config).build().unwrap();
/// assert_eq!(cache.maximum_size(), Some(1_000));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CacheConfig {
  /// Maximum number of entries. `0` means unbounded.
  pub maximum_size: usize,
  /// One of `lru`, `slru` or `tinylfu`. Empty selects the default.
  pub policy: String,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      maximum_size: 0,
      policy: PolicyKind::default().to_string(),
    }
  }
}
