use once_cell::sync::Lazy;
use std::time::{Duration, Instant};

// The single, static reference point for all entry timestamps.
// It is initialized lazily on its first use.
static CACHE_EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// A point in time, in nanoseconds since the cache epoch.
pub(crate) type Timestamp = u64;

/// Converts an `Instant` into a `Timestamp`.
#[inline]
pub(crate) fn instant_to_timestamp(instant: Instant) -> Timestamp {
  instant.saturating_duration_since(*CACHE_EPOCH).as_nanos() as u64
}

/// Converts a `Timestamp` back into an `Instant`.
#[inline]
pub(crate) fn timestamp_to_instant(timestamp: Timestamp) -> Instant {
  *CACHE_EPOCH + Duration::from_nanos(timestamp)
}

/// A helper to get the current time as a `Timestamp`.
#[inline]
pub(crate) fn now() -> Timestamp {
  instant_to_timestamp(Instant::now())
}
