/// Integration test suite for the `deadwood` binary.
///
/// Every test writes a small project into a temporary directory and invokes the
/// compiled binary on it. `CARGO_BIN_EXE_deadwood` is set by Cargo during
/// `cargo test` to the binary for the current profile.
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_deadwood"))
}

/// Run a deadwood command and assert it exits successfully.
/// Returns stdout as a String.
fn run_success(args: &[&str]) -> String {
    let out = Command::new(binary())
        .args(args)
        .output()
        .expect("failed to invoke deadwood binary");
    let stdout = String::from_utf8_lossy(&out.stdout).to_string();
    let stderr = String::from_utf8_lossy(&out.stderr).to_string();
    assert!(
        out.status.success(),
        "command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
        args,
        out.status,
        stdout,
        stderr
    );
    stdout
}

/// Run a deadwood command and assert it exits with a non-zero status.
/// Returns (stdout, stderr) as Strings.
fn run_failure(args: &[&str]) -> (String, String) {
    let out = Command::new(binary())
        .args(args)
        .output()
        .expect("failed to invoke deadwood binary");
    let stdout = String::from_utf8_lossy(&out.stdout).to_string();
    let stderr = String::from_utf8_lossy(&out.stderr).to_string();
    assert!(
        !out.status.success(),
        "command {:?} expected to fail but exited successfully\nstdout: {}\nstderr: {}",
        args,
        stdout,
        stderr
    );
    (stdout, stderr)
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// A TypeScript project with one dead export, one orphan file and a default entry.
fn sample_project() -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path();
    write(root, "src/index.ts", "import { usedThing } from './lib';\nconsole.log(usedThing());\n");
    write(
        root,
        "src/lib.ts",
        "export function usedThing() { return 1; }\n\nexport function deadThing() { return 2; }\n",
    );
    write(root, "src/old.ts", "export function legacy() { return 3; }\n");
    write(root, "node_modules/dep/index.js", "module.exports = {};\n");
    write(root, "README.md", "# sample\n");
    dir
}

// ---------------------------------------------------------------------------
// analyze
// ---------------------------------------------------------------------------

#[test]
fn test_analyze_compact_output() {
    let dir = sample_project();
    let stdout = run_success(&["analyze", dir.path().to_str().unwrap()]);

    assert!(
        stdout.contains("export deadThing src/lib.ts:3:"),
        "dead export missing\nstdout: {stdout}"
    );
    assert!(stdout.contains("file src/old.ts medium"), "orphan file missing\nstdout: {stdout}");
    assert!(!stdout.contains("usedThing"), "used export reported\nstdout: {stdout}");
    assert!(!stdout.contains("src/index.ts"), "entry file reported\nstdout: {stdout}");
    assert!(stdout.contains("1 unused files, 2 unused exports"));
}

#[test]
fn test_analyze_json_output() {
    let dir = sample_project();
    let stdout = run_success(&["analyze", "--format", "json", dir.path().to_str().unwrap()]);
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout).expect("analyze --format json output is not valid JSON");

    let exports: Vec<&str> = parsed["unusedExports"]
        .as_array()
        .expect("unusedExports array")
        .iter()
        .filter_map(|e| e["exportName"].as_str())
        .collect();
    assert_eq!(exports, vec!["deadThing", "legacy"]);
    assert_eq!(parsed["summary"]["analyzedFiles"], 3);
    assert_eq!(parsed["summary"]["languages"]["typescript"], 3);
    assert!(parsed["summary"]["timestamp"].is_string());
}

#[test]
fn test_analyze_table_output() {
    let dir = sample_project();
    let stdout = run_success(&["analyze", "--format", "table", dir.path().to_str().unwrap()]);
    assert!(stdout.contains("=== Unused files ==="));
    assert!(stdout.contains("=== Unused exports ==="));
    assert!(stdout.contains("deadThing"));
    // stdout is a pipe here, so no ANSI escapes.
    assert!(!stdout.contains("\x1b["));
}

#[test]
fn test_min_confidence_filters_findings() {
    let dir = sample_project();
    let stdout = run_success(&[
        "analyze",
        "--min-confidence",
        "high",
        dir.path().to_str().unwrap(),
    ]);
    assert!(!stdout.contains("deadThing"));
    assert!(stdout.starts_with("0 unused files, 0 unused exports"));
}

#[test]
fn test_no_default_entries() {
    let dir = sample_project();
    let stdout = run_success(&["analyze", "--no-default-entries", dir.path().to_str().unwrap()]);
    assert!(stdout.contains("file src/index.ts"), "index.ts should be unused\nstdout: {stdout}");
}

#[test]
fn test_explicit_entry_and_ignore_flags() {
    let dir = sample_project();
    let stdout = run_success(&[
        "analyze",
        "--entry",
        "src/old.ts",
        "--ignore",
        "src/lib.ts",
        dir.path().to_str().unwrap(),
    ]);
    assert!(!stdout.contains("src/old.ts"));
    assert!(!stdout.contains("deadThing"));
}

#[test]
fn test_test_files_are_default_entries() {
    let dir = sample_project();
    write(
        dir.path(),
        "src/lib.test.ts",
        "import { deadThing } from './lib';\ndeadThing();\n",
    );
    let stdout = run_success(&["analyze", dir.path().to_str().unwrap()]);
    assert!(!stdout.contains("deadThing"), "test import should count\nstdout: {stdout}");
    assert!(!stdout.contains("lib.test.ts"));
}

#[test]
fn test_config_file_is_applied() {
    let dir = sample_project();
    write(
        dir.path(),
        "deadwood.toml",
        "entry = [\"src/old.ts\"]\nconventional_exports = [\"deadThing\"]\n",
    );
    let stdout = run_success(&["analyze", dir.path().to_str().unwrap()]);
    assert!(!stdout.contains("file src/old.ts"));
    assert!(stdout.contains("export deadThing src/lib.ts:3:16 function low"), "stdout: {stdout}");
}

#[test]
fn test_conventional_flag_lowers_confidence() {
    let dir = sample_project();
    let stdout = run_success(&[
        "analyze",
        "--conventional",
        "deadThing",
        "--min-confidence",
        "medium",
        dir.path().to_str().unwrap(),
    ]);
    assert!(!stdout.contains("deadThing"));
    assert!(stdout.contains("legacy"));
}

#[test]
fn test_mixed_language_project() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "main.py", "from helpers import greet\n\ngreet()\n");
    write(
        root,
        "helpers.py",
        "def greet():\n    print('hi')\n\n\ndef farewell():\n    print('bye')\n",
    );
    write(root, "go.mod", "module example.com/app\n\ngo 1.22\n");
    write(
        root,
        "main.go",
        "package main\n\nfunc main() {\n\tunusedLocal := 1\n}\n",
    );

    let stdout = run_success(&["analyze", "--format", "json", root.to_str().unwrap()]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let exports: Vec<&str> = parsed["unusedExports"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["exportName"].as_str())
        .collect();
    assert_eq!(exports, vec!["farewell"]);
    assert_eq!(parsed["summary"]["languages"]["python"], 2);
    assert_eq!(parsed["summary"]["languages"]["go"], 1);
    assert!(parsed["unusedFiles"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// files
// ---------------------------------------------------------------------------

#[test]
fn test_files_lists_source_files() {
    let dir = sample_project();
    let stdout = run_success(&["files", dir.path().to_str().unwrap()]);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["src/index.ts", "src/lib.ts", "src/old.ts"]);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn test_missing_project_root_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let (_, stderr) = run_failure(&["analyze", missing.to_str().unwrap()]);
    assert!(stderr.contains("cannot open project root"), "stderr: {stderr}");
}

#[test]
fn test_unknown_format_is_rejected() {
    let dir = sample_project();
    run_failure(&["analyze", "--format", "xml", dir.path().to_str().unwrap()]);
}
