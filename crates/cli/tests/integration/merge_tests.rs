//! Merge and flatten command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

const LINUX: &str = r#"# Linux dependencies.
{
  'conditions': [
    ['OS=="linux"', {
      'variables': {
        'isolate_dependency_tracked': ['b', 'a'],
      },
    }],
  ],
}
"#;

const MAC: &str = r#"{
  'conditions': [
    ['OS=="mac"', {
      'variables': {
        'isolate_dependency_tracked': ['a'],
      },
    }],
  ],
}
"#;

#[test]
fn merge_factors_shared_entries() {
  let env = TestEnv::new();
  let linux = env.write_file("linux.isolate", LINUX);
  let mac = env.write_file("mac.isolate", MAC);

  let expected = "# Linux dependencies.
{
  'variables': {
    'isolate_dependency_tracked': [
      'a',
    ],
  },
  'conditions': [
    ['OS==\"linux\"', {
      'variables': {
        'isolate_dependency_tracked': [
          'b',
        ],
      },
    }],
  ],
}
";

  env
    .isodep_cmd()
    .arg("merge")
    .arg(&linux)
    .arg(&mac)
    .assert()
    .success()
    .stdout(predicate::eq(expected));
}

#[test]
fn merge_writes_file() {
  let env = TestEnv::new();
  let linux = env.write_file("linux.isolate", LINUX);
  let out = env.path("merged.isolate");

  env
    .isodep_cmd()
    .arg("merge")
    .arg(&linux)
    .arg("--write")
    .arg(&out)
    .assert()
    .success()
    .stdout(predicate::str::contains("Wrote"));

  let written = std::fs::read_to_string(&out).unwrap();
  assert!(written.starts_with("# Linux dependencies.\n{\n"));
}

#[test]
fn merge_output_is_stable() {
  let env = TestEnv::new();
  let linux = env.write_file("linux.isolate", LINUX);
  let mac = env.write_file("mac.isolate", MAC);
  let out = env.path("merged.isolate");

  env
    .isodep_cmd()
    .args(["merge", "--write"])
    .arg(&out)
    .arg(&linux)
    .arg(&mac)
    .assert()
    .success();
  let first = std::fs::read_to_string(&out).unwrap();

  // The canonical file only names linux; mac has to be supplied again.
  let assert = env
    .isodep_cmd()
    .arg("merge")
    .arg(&out)
    .args(["--platform", "mac"])
    .assert()
    .success();
  assert_eq!(String::from_utf8_lossy(&assert.get_output().stdout), first);
}

#[test]
fn merge_extra_platform_negates() {
  let env = TestEnv::new();
  let linux = env.write_file("linux.isolate", LINUX);

  env
    .isodep_cmd()
    .arg("merge")
    .arg(&linux)
    .args(["--platform", "mac", "--platform", "win"])
    .assert()
    .success()
    .stdout(predicate::str::contains("['OS==\"linux\"', {"));
}

#[test]
fn merge_conflicting_commands_fails() {
  let env = TestEnv::new();
  let one = env.write_file("one.isolate", "{'variables': {'command': ['a']}}");
  let two = env.write_file("two.isolate", "{'variables': {'command': ['b']}}");

  env
    .isodep_cmd()
    .arg("merge")
    .arg(&one)
    .arg(&two)
    .assert()
    .failure()
    .stderr(predicate::str::contains("conflicting command"));
}

#[test]
fn merge_syntax_error_fails() {
  let env = TestEnv::new();
  let bad = env.write_file("bad.isolate", "{'variables': ");

  env
    .isodep_cmd()
    .arg("merge")
    .arg(&bad)
    .assert()
    .failure()
    .stderr(predicate::str::contains("bad.isolate"));
}

#[test]
fn merge_missing_file_fails() {
  let env = TestEnv::new();

  env
    .isodep_cmd()
    .arg("merge")
    .arg(env.path("missing.isolate"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("missing.isolate"));
}

#[test]
fn merge_custom_condition_variable() {
  let env = TestEnv::new();
  let file = env.write_file(
    "target.isolate",
    "{'conditions': [['TARGET==\"arm\"', {'variables': {'isolate_dependency_touched': ['t']}}]]}",
  );

  env
    .isodep_cmd()
    .arg("merge")
    .arg(&file)
    .env("ISODEP_CONDITION_VAR", "TARGET")
    .args(["--platform", "x86"])
    .assert()
    .success()
    .stdout(predicate::str::contains("['TARGET==\"arm\"', {"));
}

#[test]
fn flatten_lists_every_platform() {
  let env = TestEnv::new();
  let linux = env.write_file("linux.isolate", LINUX);
  let mac = env.write_file("mac.isolate", MAC);

  env
    .isodep_cmd()
    .arg("flatten")
    .arg(&linux)
    .arg(&mac)
    .assert()
    .success()
    .stdout(predicate::str::contains("# linux").and(predicate::str::contains("# mac")));
}

#[test]
fn flatten_json() {
  let env = TestEnv::new();
  let linux = env.write_file("linux.isolate", LINUX);
  let mac = env.write_file("mac.isolate", MAC);

  let assert = env
    .isodep_cmd()
    .args(["--output", "json", "flatten"])
    .arg(&linux)
    .arg(&mac)
    .assert()
    .success();

  let value: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
  assert_eq!(value["linux"]["isolate_dependency_tracked"], serde_json::json!(["b", "a"]));
  assert_eq!(value["mac"]["isolate_dependency_tracked"], serde_json::json!(["a"]));
}
