use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn write_schema(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("failed to write schema");
    path
}

fn typed_argv(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_typed-argv"))
        .args(args)
        .output()
        .expect("failed to run typed-argv")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

const ARRAY_SCHEMA: &str = r#"
options:
  - flags: "-a, --array <vals..>"
  - flags: "-n, --numbers"
    type: "array:number"
  - flags: "-N, --nested"
    type: "array:array"
    delimiter: false
"#;

// ---------------------------------------------------------------------------
// parse
// ---------------------------------------------------------------------------

#[test]
fn parse_prints_argv_and_details() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(&dir, "schema.yaml", ARRAY_SCHEMA);

    let output = typed_argv(&[
        "parse",
        "--schema",
        schema.to_str().unwrap(),
        "--",
        "before",
        "-a",
        "one",
        "two",
        "-n=1",
        "2,3",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let json = stdout_json(&output);
    assert_eq!(json["argv"]["_"], serde_json::json!(["before"]));
    assert_eq!(json["argv"]["a"], serde_json::json!(["one", "two"]));
    assert_eq!(json["argv"]["array"], serde_json::json!(["one", "two"]));
    assert_eq!(json["argv"]["numbers"], serde_json::json!([1.0, 2.0, 3.0]));
    assert_eq!(json["code"], 0);
    assert_eq!(json["details"]["types"].as_array().unwrap().len(), 4);
    assert_eq!(
        json["details"]["types"][3]["token_indices"],
        serde_json::json!([4, 5])
    );
}

#[test]
fn parse_line_mode_tokenizes_one_string() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(&dir, "schema.yaml", ARRAY_SCHEMA);

    let output = typed_argv(&[
        "parse",
        "--schema",
        schema.to_str().unwrap(),
        "--line",
        "--",
        "-N a b -N c,d -N=e f",
    ]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(
        json["argv"]["nested"],
        serde_json::json!([["a", "b"], ["c", "d"], ["e", "f"]])
    );
    assert_eq!(json["details"]["args"].as_array().unwrap().len(), 7);
}

#[test]
fn parse_exit_code_counts_strict_failures() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(
        &dir,
        "strict.json",
        r#"{
            "options": [
                {"flags": "n", "type": "array:number", "strict": true},
                {"flags": "e", "type": "array:enum", "choices": ["node", "java", "rust"]},
                {"flags": "p", "type": "array:path", "must_exist": true}
            ]
        }"#,
    );
    let missing = dir.path().join("blerg_dne");

    let output = typed_argv(&[
        "parse",
        "--schema",
        schema.to_str().unwrap(),
        "--",
        "-n",
        "no",
        "-e",
        "ruby",
        "-p",
        missing.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(3));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Value \"NaN\" is invalid for argument n. Please specify a number."));
    assert!(stderr.contains("Choices are: node, java, rust"));
    assert!(stderr.contains("The path does not exist:"));
    assert_eq!(stdout_json(&output)["code"], 3);
}

#[test]
fn parse_exit_status_saturates_at_255() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(
        &dir,
        "strict.json",
        r#"{"options": [{"flags": "-n", "type": "array:number", "strict": true}]}"#,
    );

    let mut args = vec!["parse", "--schema", schema.to_str().unwrap(), "--", "-n"];
    args.extend(std::iter::repeat_n("x", 256));
    let output = typed_argv(&args);

    assert_eq!(output.status.code(), Some(255));
    assert_eq!(stdout_json(&output)["code"], 256);
}

#[test]
fn parse_survives_closed_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(&dir, "schema.yaml", ARRAY_SCHEMA);

    // Enough output to overflow the pipe buffer after the reader is gone.
    let mut child = Command::new(env!("CARGO_BIN_EXE_typed-argv"))
        .args(["parse", "--schema", schema.to_str().unwrap(), "--", "-a"])
        .args(std::iter::repeat_n("value", 20_000))
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run typed-argv");
    drop(child.stdout.take());

    let output = child.wait_with_output().unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("panicked"), "{stderr}");
    assert_eq!(output.status.code(), Some(0), "{stderr}");
}

#[test]
fn parse_missing_required_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(
        &dir,
        "required.yml",
        "options:\n  - flags: \"-a|--array\"\n    type: array\n    required: true\n",
    );

    let output = typed_argv(&["parse", "--schema", schema.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(
        String::from_utf8_lossy(&output.stderr)
            .contains("Missing required argument: a or array")
    );
    let json = stdout_json(&output);
    assert_eq!(json["errors"], serde_json::json!([]));
}

#[test]
fn parse_yaml_output() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(&dir, "schema.yaml", ARRAY_SCHEMA);

    let output = typed_argv(&[
        "parse",
        "--schema",
        schema.to_str().unwrap(),
        "--format",
        "yaml",
        "--",
        "-a",
        "x",
    ]);
    assert!(output.status.success());

    let yaml: serde_yaml::Value = serde_yaml::from_slice(&output.stdout).unwrap();
    assert_eq!(yaml["argv"]["a"][0].as_str(), Some("x"));
    assert_eq!(yaml["details"]["types"][1]["origin"].as_str(), Some("flag"));
    assert_eq!(yaml["code"].as_i64(), Some(0));
}

// ---------------------------------------------------------------------------
// check / tags
// ---------------------------------------------------------------------------

#[test]
fn check_accepts_valid_schema() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(&dir, "schema.yaml", ARRAY_SCHEMA);

    let output = typed_argv(&["check", "--schema", schema.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ok (3 options)"));
    assert!(stdout.contains("  -a, --array <vals..>  [array:string, many values]"));
    assert!(stdout.contains("  -N, --nested  [array:array:string, many values]"));
}

#[test]
fn check_reports_every_schema_error() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(
        &dir,
        "bad.json",
        r#"{
            "options": [
                {"flags": "-a", "type": "array"},
                {"flags": "--a", "type": "array"},
                {"flags": "-e", "type": "enum"},
                {"flags": "-s", "type": "string", "must_exist": true}
            ]
        }"#,
    );

    let output = typed_argv(&["check", "--schema", schema.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("duplicate flag name: a"));
    assert!(stderr.contains("enum type requires at least one choice"));
    assert!(stderr.contains("must_exist is only valid on path, file and dir types"));
    assert!(stderr.contains("error: 3 schema error(s)"));
}

#[test]
fn unknown_type_tag_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let schema = write_schema(
        &dir,
        "schema.json",
        r#"{"options": [{"flags": "-b", "type": "bool"}]}"#,
    );

    let output = typed_argv(&["check", "--schema", schema.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown type tag: bool"));
}

#[test]
fn tags_lists_every_kind() {
    let output = typed_argv(&["tags"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        ["string", "number", "enum", "path", "file", "dir", "array:<element>"]
    );
}
