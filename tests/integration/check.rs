//! Integration tests for the `tinfer check` command

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// `var x = 1;`
const NUMBER_PROGRAM: &str = r#"{
    "type": "Program", "start": 0, "end": 10,
    "body": [{
        "type": "VariableDeclaration", "kind": "var", "start": 0, "end": 10,
        "declarations": [{
            "type": "VariableDeclarator", "start": 4, "end": 9,
            "id": {"type": "Identifier", "name": "x", "start": 4, "end": 5},
            "init": {"type": "Literal", "value": 1, "raw": "1", "start": 8, "end": 9}
        }]
    }]
}"#;

/// `y;`
const UNDEFINED_PROGRAM: &str = r#"{
    "type": "Program", "start": 0, "end": 2,
    "body": [{
        "type": "ExpressionStatement", "start": 0, "end": 2,
        "expression": {"type": "Identifier", "name": "y", "start": 0, "end": 1}
    }]
}"#;

/// ```js
/// // type greet : Function([String], String)
/// function greet(name) { return "hi " + name; }
/// greet(1);
/// ```
const ASCRIBED_PROGRAM: &str = r#"{
    "type": "Program", "start": 0, "end": 100,
    "comments": [
        {"type": "Line", "value": " type greet : Function([String], String)", "start": 0, "end": 42}
    ],
    "body": [
        {
            "type": "FunctionDeclaration", "start": 43, "end": 88,
            "id": {"type": "Identifier", "name": "greet", "start": 52, "end": 57},
            "params": [{"type": "Identifier", "name": "name", "start": 58, "end": 62}],
            "body": {
                "type": "BlockStatement", "start": 64, "end": 88,
                "body": [{
                    "type": "ReturnStatement", "start": 66, "end": 86,
                    "argument": {
                        "type": "BinaryExpression", "operator": "+", "start": 73, "end": 85,
                        "left": {"type": "Literal", "value": "hi ", "start": 73, "end": 78},
                        "right": {"type": "Identifier", "name": "name", "start": 81, "end": 85}
                    }
                }]
            }
        },
        {
            "type": "ExpressionStatement", "start": 89, "end": 98,
            "expression": {
                "type": "CallExpression", "start": 89, "end": 97,
                "callee": {"type": "Identifier", "name": "greet", "start": 89, "end": 94},
                "arguments": [{"type": "Literal", "value": 1, "start": 95, "end": 96}]
            }
        }
    ]
}"#;

/// `module.exports = "lib";`
const LIB_PROGRAM: &str = r#"{
    "type": "Program", "start": 0, "end": 24,
    "body": [{
        "type": "ExpressionStatement", "start": 0, "end": 24,
        "expression": {
            "type": "AssignmentExpression", "operator": "=", "start": 0, "end": 23,
            "left": {
                "type": "MemberExpression", "computed": false, "start": 0, "end": 14,
                "object": {"type": "Identifier", "name": "module", "start": 0, "end": 6},
                "property": {"type": "Identifier", "name": "exports", "start": 7, "end": 14}
            },
            "right": {"type": "Literal", "value": "lib", "start": 17, "end": 22}
        }
    }]
}"#;

/// `var lib = require("./lib");`
const MAIN_PROGRAM: &str = r#"{
    "type": "Program", "start": 0, "end": 27,
    "body": [{
        "type": "VariableDeclaration", "kind": "var", "start": 0, "end": 27,
        "declarations": [{
            "type": "VariableDeclarator", "start": 4, "end": 26,
            "id": {"type": "Identifier", "name": "lib", "start": 4, "end": 7},
            "init": {
                "type": "CallExpression", "start": 10, "end": 26,
                "callee": {"type": "Identifier", "name": "require", "start": 10, "end": 17},
                "arguments": [{"type": "Literal", "value": "./lib", "start": 18, "end": 25}]
            }
        }]
    }]
}"#;

/// Path to the tinfer binary built for this test run
fn tinfer_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_tinfer"))
}

/// Helper function to create a test file
fn create_test_file(
    dir: &Path,
    name: &str,
    content: &str,
) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Run `tinfer check` from inside `dir` (so no outer tinfer.toml is picked up)
fn run_check(
    dir: &Path,
    args: &[&str],
    paths: &[&Path],
) -> Output {
    Command::new(tinfer_bin())
        .current_dir(dir)
        .env_remove("TINFER_FAIL_FAST")
        .env_remove("TINFER_MAX_CALL_DEPTH")
        .env_remove("TINFER_LOG")
        .arg("check")
        .args(args)
        .args(paths)
        .output()
        .unwrap()
}

#[test]
fn test_check_valid_file() {
    let temp_dir = TempDir::new().unwrap();
    let file = create_test_file(temp_dir.path(), "valid.json", NUMBER_PROGRAM);

    let output = run_check(temp_dir.path(), &[], &[&file]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("x: Number"), "{}", stdout);
}

#[test]
fn test_check_invalid_file() {
    let temp_dir = TempDir::new().unwrap();
    let file = create_test_file(temp_dir.path(), "invalid.json", UNDEFINED_PROGRAM);

    let output = run_check(temp_dir.path(), &[], &[&file]);

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("error[UndefinedIdentifier]"), "{}", stdout);
    assert!(stdout.contains("Undefined identifier: y"), "{}", stdout);
}

#[test]
fn test_check_annotation_from_comment() {
    let temp_dir = TempDir::new().unwrap();
    let file = create_test_file(temp_dir.path(), "greet.json", ASCRIBED_PROGRAM);

    let output = run_check(temp_dir.path(), &[], &[&file]);

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("greet: Function([String], String)"), "{}", stdout);
    assert!(stdout.contains("error[TypeMismatch]"), "{}", stdout);
}

#[test]
fn test_check_json_format() {
    let temp_dir = TempDir::new().unwrap();
    let file = create_test_file(temp_dir.path(), "invalid.json", UNDEFINED_PROGRAM);

    let output = run_check(temp_dir.path(), &["--format", "json"], &[&file]);

    assert!(!output.status.success());
    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["errors"][0]["kind"], "UndefinedIdentifier");
    assert_eq!(reports[0]["errors"][0]["span"]["start"]["offset"], 0);
}

#[test]
fn test_check_directory() {
    let temp_dir = TempDir::new().unwrap();
    create_test_file(temp_dir.path(), "a.json", NUMBER_PROGRAM);
    create_test_file(temp_dir.path(), "b.json", NUMBER_PROGRAM);
    create_test_file(temp_dir.path(), "notes.txt", "not a program");

    let output = run_check(temp_dir.path(), &[], &[temp_dir.path()]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("==> ").count(), 2, "{}", stdout);
}

#[test]
fn test_check_resolves_require() {
    let temp_dir = TempDir::new().unwrap();
    create_test_file(temp_dir.path(), "lib.json", LIB_PROGRAM);
    let main = create_test_file(temp_dir.path(), "main.json", MAIN_PROGRAM);

    let output = run_check(temp_dir.path(), &[], &[&main]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stdout));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("lib: String"), "{}", stdout);
}

#[test]
fn test_check_missing_module() {
    let temp_dir = TempDir::new().unwrap();
    let main = create_test_file(temp_dir.path(), "main.json", MAIN_PROGRAM);

    let output = run_check(temp_dir.path(), &[], &[&main]);

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("error[InvalidImport]"), "{}", stdout);
}

#[test]
fn test_check_malformed_json() {
    let temp_dir = TempDir::new().unwrap();
    let file = create_test_file(temp_dir.path(), "broken.json", "{ not json");

    let output = run_check(temp_dir.path(), &[], &[&file]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken.json"), "{}", stderr);
}

#[test]
fn test_check_respects_config_file() {
    let temp_dir = TempDir::new().unwrap();
    create_test_file(temp_dir.path(), "tinfer.toml", "[check]\nfail_fast = true\n");
    let file = create_test_file(temp_dir.path(), "invalid.json", UNDEFINED_PROGRAM);

    let output = run_check(temp_dir.path(), &["--format", "json"], &[&file]);

    assert!(!output.status.success());
    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    // 遇错即停：只有这一个错误，没有绑定
    assert_eq!(reports[0]["errors"].as_array().unwrap().len(), 1);
    assert!(reports[0]["bindings"].as_object().unwrap().is_empty());
}
