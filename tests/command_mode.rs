//! Integration tests for the command runner (-s/--set and -c/--command)

use std::path::PathBuf;
use std::process::Command;

fn run_command(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_cascade"))
        // Tests must not depend on a user's ~/.config/cascade/config.toml.
        .arg("--no-config")
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn temp_config(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("cascade-{}-{}.toml", name, std::process::id()));
    std::fs::write(&path, content).expect("Failed to write config");
    path
}

#[test]
fn test_basic_arithmetic() {
    let (stdout, _, code) = run_command(&["-c", "5 + 3"]);
    assert_eq!(stdout.trim(), "8");
    assert_eq!(code, 0);
}

#[test]
fn test_float_division() {
    let (stdout, _, code) = run_command(&["-c", "=10/4"]);
    assert_eq!(stdout.trim(), "2.5");
    assert_eq!(code, 0);
}

#[test]
fn test_sum_over_set_cells() {
    let (stdout, _, code) = run_command(&["-s", "A1=2", "-s", "A2=3", "-c", "SUM(A1..A2)"]);
    assert_eq!(stdout.trim(), "5");
    assert_eq!(code, 0);
}

#[test]
fn test_sum_with_many_operands() {
    let (stdout, _, code) = run_command(&["-c", "SUM(1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15)"]);
    assert_eq!(stdout.trim(), "120");
    assert_eq!(code, 0);
}

#[test]
fn test_text_joined_with_number() {
    let (stdout, _, code) = run_command(&["-s", "A1=5", "-c", "\"Total: \" + A1"]);
    assert_eq!(stdout.trim(), "Total: 5");
    assert_eq!(code, 0);
}

#[test]
fn test_reference_to_formula_cell() {
    let (stdout, _, code) = run_command(&["-s", "A1==5+5", "-c", "REF(A1) * 2"]);
    assert_eq!(stdout.trim(), "20");
    assert_eq!(code, 0);
}

#[test]
fn test_error_display_exits_nonzero() {
    let (stdout, _, code) = run_command(&["-c", "SUM(\"a\", 1)"]);
    assert!(stdout.starts_with("Error: "));
    assert_eq!(code, 1);
}

#[test]
fn test_cycle_rejected() {
    let (_, stderr, code) = run_command(&["-s", "A1==B1", "-s", "B1==A1"]);
    assert!(stderr.contains("circular reference"), "stderr: {}", stderr);
    assert_eq!(code, 1);
}

#[test]
fn test_data_range_printed() {
    let (stdout, _, code) = run_command(&["-s", "A1=x", "-s", "B2==1+1"]);
    assert_eq!(stdout.trim_end_matches('\n'), "x\t\n\t2");
    assert_eq!(code, 0);
}

#[test]
fn test_out_of_bounds_set() {
    let (_, stderr, code) = run_command(&["-s", "ZZZ1=1"]);
    assert!(stderr.contains("outside"), "stderr: {}", stderr);
    assert_eq!(code, 1);
}

#[test]
fn test_config_file_sets_sheet_size() {
    let path = temp_config("narrow", "default_sheet_width = 2\ndefault_sheet_height = 2\n");
    let path_str = path.to_string_lossy().to_string();

    let (_, _, code) = run_command(&["--config", &path_str, "-s", "B2=1"]);
    assert_eq!(code, 0);
    let (_, _, code) = run_command(&["--config", &path_str, "-s", "C1=1"]);
    assert_eq!(code, 1);

    let _ = std::fs::remove_file(path);
}

#[test]
fn test_malformed_config() {
    let path = temp_config("broken", "default_sheet_width = \"wide\"\n");
    let path_str = path.to_string_lossy().to_string();
    let (_, stderr, code) = run_command(&["--config", &path_str]);
    assert!(stderr.contains("Failed to parse config"), "stderr: {}", stderr);
    assert_eq!(code, 1);
    let _ = std::fs::remove_file(path);
}

#[test]
fn test_unknown_option() {
    let (_, stderr, code) = run_command(&["--bogus"]);
    assert!(stderr.contains("Unknown argument"));
    assert_eq!(code, 1);
}
