//! Runs the `goir` binary end to end.

use std::fs;
use std::process::{Command, Output};

const GOIR: &str = env!("CARGO_BIN_EXE_goir");

fn goir(args: &[&str]) -> Output {
    Command::new(GOIR)
        .args(args)
        .env_remove("GOIR_LOG")
        .env_remove("RUST_LOG")
        .output()
        .expect("spawn goir")
}

fn source_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("a.go"), "package app\n\ntype A struct{}\n").expect("write");
    dir
}

#[test]
fn plugin_failures_are_listed_after_the_header() {
    let dir = source_tree();
    let input = dir.path().display().to_string();
    let out = goir(&["--input", &input, "--plugin", "goir-no-such-plugin:out=./gen"]);
    assert_eq!(out.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&out.stderr);
    let header = stderr
        .find("[goir] accumulated plugin errors:")
        .expect("header");
    let line = stderr
        .find("[goir:plugin] goir-no-such-plugin: ")
        .expect("failure line");
    assert!(header < line, "{stderr}");
}

#[test]
fn malformed_registration_is_a_config_error() {
    let dir = source_tree();
    let input = dir.path().display().to_string();
    let out = goir(&["--input", &input, "--plugin", "gen-without-output"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("[goir] config error: "), "{stderr}");
}

#[test]
fn debug_mode_prints_the_document() {
    let dir = source_tree();
    let input = dir.path().display().to_string();
    let out = goir(&["--input", &input, "--debug"]);
    assert!(out.status.success());
    let data: goir::Data = serde_json::from_slice(&out.stdout).expect("json on stdout");
    assert_eq!(data.packages[0].name, "app");
}
