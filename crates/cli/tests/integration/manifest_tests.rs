//! Manifest and check command integration tests.

use predicates::prelude::*;

use super::common::{TestEnv, read_json};

const DESCRIPTOR: &str = r#"{
  'variables': {
    'isolate_dependency_tracked': ['data.txt'],
    'isolate_dependency_touched': ['log.txt'],
  },
  'conditions': [
    ['OS=="linux"', {
      'variables': {
        'command': ['run', '--fast'],
        'isolate_dependency_untracked': ['assets/'],
      },
    }, {
      'variables': {
        'command': ['run'],
      },
    }],
  ],
}
"#;

fn populated_env() -> TestEnv {
  let env = TestEnv::new();
  env.write_file("task.isolate", DESCRIPTOR);
  env.write_file("data.txt", "hello");
  env.write_file("log.txt", "0123456789");
  env.write_file("assets/one.bin", "1");
  env.write_file("assets/nested/two.bin", "22");
  env
}

#[test]
fn manifest_for_linux() {
  let env = populated_env();
  let isolated = env.path("out.isolated");

  env
    .isodep_cmd()
    .arg("manifest")
    .arg(env.path("task.isolate"))
    .args(["--platform", "linux", "--isolated"])
    .arg(&isolated)
    .assert()
    .success()
    .stdout(predicate::str::contains("Files: 4"));

  let value = read_json(&isolated);
  assert_eq!(value["os"], "linux");
  assert_eq!(value["command"], serde_json::json!(["run", "--fast"]));

  let files = value["files"].as_object().unwrap();
  assert_eq!(files.len(), 4);
  assert_eq!(files["data.txt"]["s"], 5);
  assert!(files["data.txt"]["h"].is_string());
  assert_eq!(files["assets/one.bin"]["s"], 1);
  assert_eq!(files["assets/nested/two.bin"]["s"], 2);

  // Touched files only record their size.
  let touched = files["log.txt"].as_object().unwrap();
  assert_eq!(touched.len(), 1);
  assert_eq!(touched["s"], 10);
}

#[test]
fn manifest_for_other_platform_takes_else_branch() {
  let env = populated_env();
  let isolated = env.path("out.isolated");

  env
    .isodep_cmd()
    .arg("manifest")
    .arg(env.path("task.isolate"))
    .args(["--platform", "win", "--isolated"])
    .arg(&isolated)
    .assert()
    .success();

  let value = read_json(&isolated);
  assert_eq!(value["os"], "win");
  assert_eq!(value["command"], serde_json::json!(["run"]));
  assert_eq!(value["files"].as_object().unwrap().len(), 2);
}

#[test]
fn manifest_writes_state() {
  let env = populated_env();
  let isolated = env.path("out.isolated");
  let state = env.path("out.state");

  env
    .isodep_cmd()
    .arg("manifest")
    .arg(env.path("task.isolate"))
    .args(["--platform", "linux", "--var", "DEPTH=2", "--var", "MODE=fast", "--isolated"])
    .arg(&isolated)
    .arg("--state")
    .arg(&state)
    .assert()
    .success();

  let value = read_json(&state);
  assert!(value["isolate_file"].as_str().unwrap().ends_with("task.isolate"));
  assert_eq!(value["variables"]["OS"], "linux");
  assert_eq!(value["variables"]["DEPTH"], 2);
  assert_eq!(value["variables"]["MODE"], "fast");
}

#[test]
fn manifest_missing_dependency_fails() {
  let env = TestEnv::new();
  env.write_file("task.isolate", "{'variables': {'isolate_dependency_tracked': ['nope.txt']}}");

  env
    .isodep_cmd()
    .arg("manifest")
    .arg(env.path("task.isolate"))
    .arg("--isolated")
    .arg(env.path("out.isolated"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("nope.txt"));
}

#[test]
fn manifest_rejects_malformed_var() {
  let env = populated_env();

  env
    .isodep_cmd()
    .arg("manifest")
    .arg(env.path("task.isolate"))
    .args(["--var", "DEPTH", "--isolated"])
    .arg(env.path("out.isolated"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("NAME=VALUE"));
}

#[test]
fn check_accepts_generated_manifest() {
  let env = populated_env();
  let isolated = env.path("out.isolated");

  env
    .isodep_cmd()
    .arg("manifest")
    .arg(env.path("task.isolate"))
    .args(["--platform", "linux", "--isolated"])
    .arg(&isolated)
    .assert()
    .success();

  env
    .isodep_cmd()
    .arg("check")
    .arg(&isolated)
    .assert()
    .success()
    .stdout(predicate::str::contains("valid"));
}

#[test]
fn check_rejects_unknown_keys() {
  let env = TestEnv::new();
  let file = env.write_file("bad.isolated", r#"{"os": "linux", "foo": 1, "bar": 2}"#);

  env
    .isodep_cmd()
    .arg("check")
    .arg(&file)
    .assert()
    .failure()
    .stderr(predicate::str::contains("unexpected entries").and(predicate::str::contains("foo")));
}

#[test]
fn check_state_kind() {
  let env = TestEnv::new();
  let file = env.write_file("good.state", r#"{"isolate_file": "task.isolate", "variables": {"OS": "mac"}}"#);

  env
    .isodep_cmd()
    .arg("check")
    .arg(&file)
    .args(["--kind", "state"])
    .assert()
    .success()
    .stdout(predicate::str::contains("task.isolate"));
}
