use isodep_lib::config::EngineConfig;
use isodep_lib::store::{ConfigStore, StoreError};

use super::common::{labels, parse_store, sorted_view, strings};

#[test]
fn union_then_flatten_keeps_each_side_conditions() -> Result<(), Box<dyn std::error::Error>> {
  let config = EngineConfig::default();
  let first = parse_store(
    r#"{
      'variables': { 'isolate_dependency_tracked': ['a'] },
      'conditions': [
        ['OS=="atari"', { 'variables': { 'isolate_dependency_tracked': ['c'] } }],
      ],
    }"#,
    &config,
  )?;
  let second = parse_store(
    r#"{
      'variables': { 'isolate_dependency_tracked': ['a'] },
      'conditions': [
        ['OS=="atari"', {}, { 'variables': { 'isolate_dependency_tracked': ['e'] } }],
      ],
    }"#,
    &config,
  )?;

  let merged = first.union(&second)?;
  let flat = merged.flatten(&labels(&["atari", "amiga"]));
  assert_eq!(flat["atari"].tracked, strings(&["a", "c"]));
  assert_eq!(flat["amiga"].tracked, strings(&["a", "e"]));

  Ok(())
}

#[test]
fn union_is_associative_for_disjoint_keys() -> Result<(), Box<dyn std::error::Error>> {
  let config = EngineConfig::default();
  let linux = parse_store(
    r#"{'conditions': [['OS=="linux"', {'variables': {'isolate_dependency_tracked': ['l', 'shared']}}]]}"#,
    &config,
  )?;
  let mac = parse_store(
    r#"{'variables': {'isolate_dependency_touched': ['m']}, 'conditions': [['OS=="mac"', {'variables': {'read_only': 1}}]]}"#,
    &config,
  )?;
  let win = parse_store(
    r#"{'conditions': [['OS=="win"', {'variables': {'isolate_dependency_tracked': ['shared', 'w']}}]]}"#,
    &config,
  )?;

  let left = linux.union(&mac)?.union(&win)?;
  let right = linux.union(&mac.union(&win)?)?;
  let all = labels(&["linux", "mac", "win", "bsd"]);
  assert_eq!(sorted_view(&left, &all), sorted_view(&right, &all));

  Ok(())
}

#[test]
fn union_is_commutative_up_to_list_order() -> Result<(), Box<dyn std::error::Error>> {
  let config = EngineConfig::default();
  let linux = parse_store(
    r#"{'variables': {'isolate_dependency_tracked': ['z']}, 'conditions': [['OS=="linux"', {'variables': {'command': ['run'], 'isolate_dependency_tracked': ['l', 'shared']}}]]}"#,
    &config,
  )?;
  let mac = parse_store(
    r#"{'variables': {'isolate_dependency_tracked': ['a']}, 'conditions': [['OS=="mac"', {'variables': {'read_only': 2, 'isolate_dependency_tracked': ['shared']}}]]}"#,
    &config,
  )?;

  let all = labels(&["linux", "mac", "bsd"]);
  let forward = sorted_view(&linux.union(&mac)?, &all);
  let backward = sorted_view(&mac.union(&linux)?, &all);
  assert_eq!(forward, backward);
  assert_eq!(forward["linux"].tracked, strings(&["a", "l", "shared", "z"]));
  assert_eq!(forward["bsd"].tracked, strings(&["a", "z"]));

  Ok(())
}

#[test]
fn union_keeps_left_comment_else_right() -> Result<(), Box<dyn std::error::Error>> {
  let none = ConfigStore::default();
  let first = ConfigStore::new(Vec::<String>::new(), Some("# first\n".to_string()));
  let second = ConfigStore::new(Vec::<String>::new(), Some("# second\n".to_string()));

  assert_eq!(first.union(&second)?.file_comment(), Some("# first\n"));
  assert_eq!(second.union(&first)?.file_comment(), Some("# second\n"));
  assert_eq!(none.union(&first)?.file_comment(), Some("# first\n"));
  assert_eq!(first.union(&none)?.file_comment(), Some("# first\n"));
  assert_eq!(none.union(&none)?.file_comment(), None);

  Ok(())
}

#[test]
fn union_with_empty_store_is_identity() -> Result<(), Box<dyn std::error::Error>> {
  let config = EngineConfig::default();
  let store = parse_store(
    r#"{'variables': {'command': ['run']}, 'conditions': [['OS=="linux"', {'variables': {'relative_cwd': 'x'}}]]}"#,
    &config,
  )?;
  assert_eq!(store.union(&ConfigStore::default())?, store);

  Ok(())
}

#[test]
fn conflicting_commands_name_condition_and_values() -> Result<(), Box<dyn std::error::Error>> {
  let config = EngineConfig::default();
  let first = parse_store(
    r#"{'conditions': [['OS=="linux"', {'variables': {'command': ['rm', '-rf', '/']}}]]}"#,
    &config,
  )?;
  let second = parse_store(r#"{'variables': {'command': ['echo', 'Hello World']}}"#, &config)?;

  let err = first.union(&second).unwrap_err();
  assert!(matches!(err, StoreError::Conflict { .. }));
  let message = err.to_string();
  assert!(message.contains("{linux}"), "{message}");
  assert!(message.contains("rm"), "{message}");
  assert!(message.contains("Hello World"), "{message}");

  Ok(())
}

#[test]
fn identical_commands_merge() -> Result<(), Box<dyn std::error::Error>> {
  let config = EngineConfig::default();
  let first = parse_store(r#"{'variables': {'command': ['run'], 'read_only': 0}}"#, &config)?;
  let second = parse_store(r#"{'variables': {'command': ['run'], 'read_only': 2}}"#, &config)?;

  let merged = first.union(&second)?;
  assert_eq!(merged.universal().command, strings(&["run"]));
  assert_eq!(merged.universal().read_only.map(u8::from), Some(2));

  Ok(())
}
