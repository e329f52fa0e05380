//! An embeddable, bounded, concurrent in-memory cache.
//!
//! # Features
//! - **Pluggable Eviction**: plain LRU, Segmented LRU (scan resistant) and
//!   W-TinyLFU (frequency-sketch admission), chosen once at construction.
//! - **Concurrency**: a reader-writer locked index in front of a single
//!   ordering lock, always acquired in that order.
//! - **Non-Clone Support**: Stores values in an `Arc<V>`, avoiding `V: Clone` bounds.
//! - **Removal Listener**: told exactly once about every entry that leaves the
//!   cache, outside of all internal locks.
//! - **Refresh Coordination**: a per-entry single-flight flag so that only one
//!   caller recomputes a given key at a time.
//!
//! ```
//! use tiered_cache::{CacheBuilder, PolicyKind, RemovalCause};
//! use std::sync::Arc;
//!
//! let cache = CacheBuilder::default()
//!   .maximum_size(2)
//!   .policy(PolicyKind::Lru)
//!   .removal_listener(|key: &str, _value: Arc<u32>, cause: RemovalCause| {
//!     assert_eq!((key, cause), ("a", RemovalCause::Capacity));
//!   })
//!   .build()
//!   .unwrap();
//!
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.put("c", 3);
//! assert!(cache.get_if_present("a").is_none());
//! assert_eq!(cache.get_if_present("c").as_deref(), Some(&3));
//! ```

// Public modules that form the API
pub mod builder;
pub mod config;
pub mod error;
pub mod handles;
pub mod listener;
pub mod policy;

// Internal, crate-only modules
mod entry;
mod refresh;
mod store;
mod time;

// Re-export the primary user-facing types for convenience
pub use builder::CacheBuilder;
pub use config::CacheConfig;
pub use error::BuildError;
pub use handles::{Cache, EntryMetadata};
pub use listener::{RemovalCause, RemovalListener};
pub use policy::PolicyKind;
pub use refresh::RefreshGuard;
