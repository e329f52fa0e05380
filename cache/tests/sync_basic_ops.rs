mod common;

use common::build_cache;
use std::{sync::Arc, thread, time::Duration};
use tiered_cache::{CacheBuilder, PolicyKind};

#[test]
fn test_sync_put_and_get() {
  let cache = build_cache::<String>(PolicyKind::Slru, 100);
  cache.put(1, "one".to_string());

  assert_eq!(cache.get_if_present(&1), Some(Arc::new("one".to_string())));
  assert!(cache.get_if_present(&2).is_none());
  assert_eq!(cache.len(), 1);
  assert!(!cache.is_empty());
}

#[test]
fn test_sync_put_replaces_value_in_place() {
  for policy in common::ALL_POLICIES {
    let cache = build_cache::<i32>(policy, 10);
    cache.put(1, 10);
    cache.put(1, 11);

    assert_eq!(cache.len(), 1, "{policy}: replacement must not add an entry");
    assert_eq!(*cache.get_if_present(&1).unwrap(), 11);
  }
}

#[test]
fn test_sync_values_outlive_removal() {
  let cache = build_cache::<String>(PolicyKind::Lru, 10);
  cache.put(1, "held".to_string());
  let held = cache.get_if_present(&1).unwrap();

  assert!(cache.invalidate(&1));
  assert_eq!(*held, "held");
}

#[test]
fn test_sync_invalidate() {
  let cache = build_cache::<i32>(PolicyKind::Slru, 10);
  cache.put(1, 10);
  cache.put(2, 20);

  assert!(cache.invalidate(&1));
  assert!(!cache.invalidate(&1), "Double invalidate should fail");
  assert!(!cache.invalidate(&99));
  assert!(cache.get_if_present(&1).is_none());
  assert_eq!(cache.len(), 1);
}

#[test]
fn test_sync_invalidate_all() {
  for policy in common::ALL_POLICIES {
    let cache = build_cache::<i32>(policy, 10);
    for i in 0..10 {
      cache.put(i, i);
    }
    cache.invalidate_all();
    assert!(cache.is_empty(), "{policy}");
    assert!(cache.get_if_present(&3).is_none());

    cache.invalidate_all();
    assert!(cache.is_empty());

    cache.put(3, 30);
    assert_eq!(*cache.get_if_present(&3).unwrap(), 30);
  }
}

#[test]
fn test_sync_borrowed_key_lookup() {
  let cache: tiered_cache::Cache<String, i32> = CacheBuilder::new().maximum_size(10).build().unwrap();
  cache.put("alpha".to_string(), 1);

  assert_eq!(cache.get_if_present("alpha"), Some(Arc::new(1)));
  assert!(cache.contains_key("alpha"));
  assert!(cache.invalidate("alpha"));
  assert!(!cache.contains_key("alpha"));
}

#[test]
fn test_sync_peek_does_not_count_as_access() {
  let cache = build_cache::<i32>(PolicyKind::Lru, 2);
  cache.put(1, 10);
  cache.put(2, 20);

  // A peek leaves 1 as the least recently used entry.
  assert_eq!(cache.peek(&1), Some(Arc::new(10)));
  cache.put(3, 30);
  assert!(!cache.contains_key(&1));
  assert!(cache.contains_key(&2));

  // A real read protects 2.
  cache.get_if_present(&2);
  cache.put(4, 40);
  assert!(cache.contains_key(&2));
  assert!(!cache.contains_key(&3));
}

#[test]
fn test_sync_metadata_tracks_access_and_update() {
  let cache = build_cache::<i32>(PolicyKind::Slru, 10);
  assert!(cache.metadata(&1).is_none());

  cache.put(1, 10);
  let first = cache.metadata(&1).unwrap();
  assert_eq!(first.last_accessed, first.last_updated);
  assert!(!first.refreshing);

  thread::sleep(Duration::from_millis(5));
  cache.get_if_present(&1);
  let read = cache.metadata(&1).unwrap();
  assert!(read.last_accessed > first.last_accessed);
  assert_eq!(read.last_updated, first.last_updated);

  thread::sleep(Duration::from_millis(5));
  cache.put(1, 11);
  let written = cache.metadata(&1).unwrap();
  assert!(written.last_updated > first.last_updated);
  assert!(written.last_accessed >= written.last_updated);
}

#[test]
fn test_sync_iter_is_a_snapshot() {
  let cache = build_cache::<i32>(PolicyKind::Lru, 10);
  for i in 0..5 {
    cache.put(i, i * 10);
  }

  let iter = cache.iter();
  cache.invalidate_all();

  let mut items: Vec<(i32, i32)> = iter.map(|(k, v)| (k, *v)).collect();
  items.sort();
  assert_eq!(items, vec![(0, 0), (1, 10), (2, 20), (3, 30), (4, 40)]);
  assert_eq!(cache.iter().count(), 0);
}

#[test]
fn test_sync_iter_lists_least_recent_first() {
  let cache = build_cache::<i32>(PolicyKind::Lru, 10);
  cache.put(1, 1);
  cache.put(2, 2);
  cache.put(3, 3);
  cache.get_if_present(&1);

  let keys: Vec<i32> = cache.iter().map(|(k, _)| k).collect();
  assert_eq!(keys, vec![2, 3, 1]);
}

#[test]
fn test_sync_accessors() {
  let cache = build_cache::<i32>(PolicyKind::TinyLfu, 64);
  assert_eq!(cache.maximum_size(), Some(64));
  assert_eq!(cache.policy(), PolicyKind::TinyLfu);

  let unbounded: tiered_cache::Cache<i32, i32> = CacheBuilder::new().build().unwrap();
  assert_eq!(unbounded.maximum_size(), None);
  assert_eq!(unbounded.policy(), PolicyKind::Slru);
}
