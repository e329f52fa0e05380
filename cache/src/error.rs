use thiserror::Error;

/// Errors that can occur when building a cache.
///
/// Building is the only fallible step: once a `Cache` exists, absence and
/// eviction are ordinary outcomes rather than errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
  /// The configured eviction policy name is not one of `lru`, `slru` or `tinylfu`.
  #[error("unsupported eviction policy '{0}' (expected one of: lru, slru, tinylfu)")]
  UnknownPolicy(String),
}

/// A specialized `Result` type for cache construction.
pub type Result<T, E = BuildError> = std::result::Result<T, E>;
