use isodep_lib::config::EngineConfig;
use isodep_lib::descriptor::Expr;
use isodep_lib::reduce::{Condition, invert_map, reduce_inputs};

use super::common::{canonicalize, labels, parse_store, retro_config, strings};

const RETRO: &str = include_str!("fixtures/retro.isolate");

#[test]
fn directory_and_nested_file_with_different_platforms_are_both_kept() -> Result<(), Box<dyn std::error::Error>> {
  let config = EngineConfig::default();
  let store = parse_store(
    r#"{
      'conditions': [
        ['OS=="linux" or OS=="mac" or OS=="win"', {
          'variables': { 'isolate_dependency_untracked': ['folder/'] },
        }],
        ['OS=="win"', {
          'variables': { 'isolate_dependency_tracked': ['folder/subfolder/x'] },
        }],
      ],
    }"#,
    &config,
  )?;

  let (inverted, platforms) = invert_map(&store.flatten_known());
  assert_eq!(platforms, labels(&["linux", "mac", "win"]));

  let reduced = reduce_inputs(&inverted, &platforms)?;
  assert_eq!(reduced.untracked["folder/"], Condition::Always);
  assert_eq!(reduced.tracked["folder/subfolder/x"], Condition::Only(labels(&["win"])));

  let canonical = canonicalize(&store)?;
  assert_eq!(canonical.variables.untracked, strings(&["folder/"]));
  assert_eq!(canonical.conditions.len(), 1);
  assert_eq!(canonical.conditions[0].condition, Expr::new(["win"]));
  assert_eq!(canonical.conditions[0].then.tracked, strings(&["folder/subfolder/x"]));

  Ok(())
}

#[test]
fn nested_file_with_same_platforms_as_directory_is_dropped() -> Result<(), Box<dyn std::error::Error>> {
  let config = EngineConfig::default().with_platforms(["mac"]);
  let store = parse_store(
    r#"{
      'conditions': [
        ['OS=="linux"', {
          'variables': {
            'isolate_dependency_untracked': ['folder/'],
            'isolate_dependency_tracked': ['folder/1', 'other'],
          },
        }],
      ],
    }"#,
    &config,
  )?;

  let canonical = canonicalize(&store)?;
  assert_eq!(canonical.conditions.len(), 1);
  let linux = &canonical.conditions[0].then;
  assert_eq!(linux.untracked, strings(&["folder/"]));
  assert_eq!(linux.tracked, strings(&["other"]));

  Ok(())
}

#[test]
fn differing_command_becomes_one_then_else_clause() -> Result<(), Box<dyn std::error::Error>> {
  let config = retro_config();
  let canonical = canonicalize(&parse_store(RETRO, &config)?)?;

  assert!(canonical.variables.command.is_empty());

  let with_command: Vec<_> = canonical
    .conditions
    .iter()
    .filter(|clause| {
      !clause.then.command.is_empty() || clause.otherwise.as_ref().is_some_and(|o| !o.command.is_empty())
    })
    .collect();
  assert_eq!(with_command.len(), 1);

  let atari = with_command[0];
  assert_eq!(atari.condition, Expr::new(["atari"]));
  assert_eq!(atari.then.command, strings(&["echo", "Hello World"]));
  assert_eq!(
    atari.otherwise.as_ref().map(|o| o.command.clone()),
    Some(strings(&["echo", "You should get an Atari"]))
  );

  Ok(())
}

#[test]
fn unknown_platform_uses_universal_entry() -> Result<(), Box<dyn std::error::Error>> {
  let config = retro_config();
  let store = parse_store(RETRO, &config)?;

  let nes = store.resolve("nes");
  assert_eq!(nes, store.universal());
  assert_eq!(nes.command, strings(&["echo", "You should get an Atari"]));
  assert!(nes.untracked.contains(&"h".to_string()));

  Ok(())
}

#[test]
fn stronger_kind_narrows_weaker_entry() -> Result<(), Box<dyn std::error::Error>> {
  let config = EngineConfig::default().with_platforms(["amiga", "coleco"]);
  let store = parse_store(
    r#"{
      'variables': { 'isolate_dependency_touched': ['log'] },
      'conditions': [
        ['OS=="atari"', {
          'variables': { 'isolate_dependency_tracked': ['log'] },
        }],
      ],
    }"#,
    &config,
  )?;

  let canonical = canonicalize(&store)?;
  assert!(canonical.variables.touched.is_empty());
  assert_eq!(canonical.conditions.len(), 1);

  let atari = &canonical.conditions[0];
  assert_eq!(atari.condition, Expr::new(["atari"]));
  assert_eq!(atari.then.tracked, strings(&["log"]));
  assert!(atari.then.touched.is_empty());
  assert_eq!(
    atari.otherwise.as_ref().map(|o| o.touched.clone()),
    Some(strings(&["log"]))
  );

  Ok(())
}
