//! Integration tests for the sheetcalc CLI binary.

use std::io::Write;
use std::process::{Command, Stdio};

/// Runs the binary with `lines` piped to stdin and returns
/// `(stdout, stderr, exit_code)`.
fn run(lines: &[&str]) -> (String, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_sheetcalc"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn sheetcalc");

    {
        let stdin = child.stdin.as_mut().expect("child stdin");
        for line in lines {
            writeln!(stdin, "{line}").expect("write to child stdin");
        }
    }

    let output = child.wait_with_output().expect("failed to wait on child");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);
    (stdout, stderr, code)
}

fn run_command(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_sheetcalc"))
        .args(args)
        .output()
        .expect("failed to execute sheetcalc");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);
    (stdout, stderr, code)
}

#[test]
fn set_and_get_a_literal_number() {
    let (stdout, _, code) = run(&["SET A1 42", "GET A1"]);
    assert_eq!(stdout.trim(), "42");
    assert_eq!(code, 0);
}

#[test]
fn set_and_get_a_formula() {
    let (stdout, _, code) = run(&["SET B1 5", "SET A1 =B1+1", "GET A1"]);
    assert_eq!(stdout.trim(), "6");
    assert_eq!(code, 0);
}

#[test]
fn clear_removes_content() {
    let (stdout, _, code) = run(&["SET A1 hello", "CLEAR A1", "GET A1"]);
    assert_eq!(stdout.trim(), "");
    assert_eq!(code, 0);
}

#[test]
fn print_values_renders_the_bounding_rectangle() {
    let (stdout, _, code) = run(&["SET A1 1", "SET B2 =A1+1", "PRINT VALUES"]);
    assert_eq!(stdout, "1\t\n\t2\n");
    assert_eq!(code, 0);
}

#[test]
fn print_texts_shows_formula_source_not_its_result() {
    let (stdout, _, code) = run(&["SET A1 1", "SET B2 =A1+1", "PRINT TEXTS"]);
    assert_eq!(stdout, "1\t\n\t=A1+1\n");
    assert_eq!(code, 0);
}

#[test]
fn getting_an_invalid_position_is_an_error_with_nonzero_exit() {
    let (_, stderr, code) = run(&["GET not-a-cell"]);
    assert!(stderr.contains("invalid cell position"));
    assert_eq!(code, 0, "a malformed line inside the REPL keeps running, not exits");
}

#[test]
fn circular_dependency_is_reported_and_leaves_the_cell_unset() {
    let (stdout, stderr, _) = run(&["SET A1 =A1+1", "GET A1"]);
    assert!(stderr.contains("circular"));
    assert_eq!(stdout.trim(), "");
}

#[test]
fn single_command_mode_runs_one_line_and_exits() {
    let (stdout, _, code) = run_command(&["-c", "SET A1 7"]);
    assert_eq!(stdout, "");
    assert_eq!(code, 0);
}

#[test]
fn single_command_mode_reports_errors_with_failure_exit_code() {
    let (_, stderr, code) = run_command(&["-c", "GET Z"]);
    assert!(stderr.contains("Error"));
    assert_eq!(code, 1);
}
