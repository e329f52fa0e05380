use tiered_cache::{BuildError, Cache, CacheBuilder, CacheConfig, PolicyKind};

#[test]
fn test_builder_defaults() {
  let cache: Cache<i32, i32> = CacheBuilder::default().build().unwrap();
  assert_eq!(cache.policy(), PolicyKind::Slru);
  assert_eq!(cache.maximum_size(), None);
  assert!(cache.is_empty());
}

#[test]
fn test_policy_names() {
  for (name, kind) in [
    ("lru", PolicyKind::Lru),
    ("slru", PolicyKind::Slru),
    ("tinylfu", PolicyKind::TinyLfu),
    ("", PolicyKind::Slru),
  ] {
    let cache: Cache<i32, i32> = CacheBuilder::new()
      .maximum_size(10)
      .policy_name(name)
      .build()
      .unwrap();
    assert_eq!(cache.policy(), kind, "name {name:?}");
  }
}

#[test]
fn test_unknown_policy_name_fails() {
  let result: Result<Cache<i32, i32>, _> = CacheBuilder::new().policy_name("arc").build();
  let err = result.unwrap_err();
  assert_eq!(err, BuildError::UnknownPolicy("arc".to_string()));
  assert!(err.to_string().contains("arc"));
}

#[test]
fn test_config_from_json() {
  let config: CacheConfig =
    serde_json::from_str(r#"{ "maximum_size": 500, "policy": "tinylfu" }"#).unwrap();
  let cache: Cache<String, String> = CacheBuilder::from_config(&config).build().unwrap();
  assert_eq!(cache.maximum_size(), Some(500));
  assert_eq!(cache.policy(), PolicyKind::TinyLfu);
}

#[test]
fn test_config_missing_fields_use_defaults() {
  let config: CacheConfig = serde_json::from_str("{}").unwrap();
  assert_eq!(config, CacheConfig::default());

  let cache: Cache<i32, i32> = CacheBuilder::from_config(&config).build().unwrap();
  assert_eq!(cache.maximum_size(), None);
  assert_eq!(cache.policy(), PolicyKind::Slru);
}

#[test]
fn test_config_with_unknown_policy_fails_to_build() {
  let config: CacheConfig =
    serde_json::from_str(r#"{ "maximum_size": 10, "policy": "fifo" }"#).unwrap();
  let result: Result<Cache<i32, i32>, BuildError> = CacheBuilder::from_config(&config).build();
  assert!(matches!(result, Err(BuildError::UnknownPolicy(name)) if name == "fifo"));
}

#[test]
fn test_policy_kind_serde() {
  let kind: PolicyKind = serde_json::from_str(r#""tinylfu""#).unwrap();
  assert_eq!(kind, PolicyKind::TinyLfu);
  assert_eq!(serde_json::to_string(&PolicyKind::Lru).unwrap(), r#""lru""#);
}
