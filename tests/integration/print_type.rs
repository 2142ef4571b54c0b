//! Integration tests for `tinfer print-type` and `tinfer version`

use std::path::PathBuf;
use std::process::{Command, Output};

fn tinfer_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_tinfer"))
}

fn run(args: &[&str]) -> Output {
    Command::new(tinfer_bin()).args(args).output().unwrap()
}

#[test]
fn test_print_type_normalizes() {
    let output = run(&["print-type", "Function([number, {'a b': string}], Any([Null, a]))"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        r#"Function([Number, Object({"a b": String})], Any([Null, a]))"#
    );
}

#[test]
fn test_print_type_rejects_invalid_input() {
    let output = run(&["print-type", "Function([Number]"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to parse type"), "{}", stderr);
}

#[test]
fn test_version() {
    let output = run(&["version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("tinfer "), "{}", stdout);
}
