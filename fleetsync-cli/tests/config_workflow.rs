//! Integration tests for the `config` commands.
//!
//! Each test runs the CLI binary with `HOME` pointed at a temporary
//! directory, so the user's real `~/.fleetsync` is never touched.
//!
//! Run with: `cargo test --test config_workflow`

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Path to the CLI binary built by cargo for this test run.
fn cli_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_fleetsync"))
}

/// Run a CLI command with `home` as the home directory.
fn run_cli(home: &Path, args: &[&str]) -> Output {
    Command::new(cli_binary())
        .args(args)
        .env("HOME", home)
        .output()
        .expect("Failed to execute CLI command")
}

/// Assert a command succeeded.
fn assert_success(output: &Output, context: &str) {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        panic!("{} failed:\nstdout: {}\nstderr: {}", context, stdout, stderr);
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn config_path(home: &Path) -> PathBuf {
    home.join(".fleetsync").join("config.ini")
}

#[test]
fn test_config_path_under_home() {
    let home = TempDir::new().expect("Failed to create temp dir");

    let output = run_cli(home.path(), &["config", "path"]);
    assert_success(&output, "config path");

    assert_eq!(
        stdout(&output).trim(),
        config_path(home.path()).display().to_string()
    );
}

#[test]
fn test_config_init_writes_defaults() {
    let home = TempDir::new().expect("Failed to create temp dir");

    let output = run_cli(home.path(), &["config", "init"]);
    assert_success(&output, "config init");

    let content = fs::read_to_string(config_path(home.path())).expect("config file missing");
    assert!(content.contains("[stream]"));
    assert!(content.contains("[reconnect]"));
    assert!(content.contains("[animation]"));
}

#[test]
fn test_config_init_keeps_existing_file() {
    let home = TempDir::new().expect("Failed to create temp dir");
    let path = config_path(home.path());
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "[animation]\npolicy = overlap\n").unwrap();

    let output = run_cli(home.path(), &["config", "init"]);
    assert_success(&output, "config init");
    assert!(stdout(&output).contains("already exists"));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "[animation]\npolicy = overlap\n"
    );

    let output = run_cli(home.path(), &["config", "init", "--force"]);
    assert_success(&output, "config init --force");
    assert!(fs::read_to_string(&path).unwrap().contains("[stream]"));
}

#[test]
fn test_config_show_reflects_file_values() {
    let home = TempDir::new().expect("Failed to create temp dir");
    let path = config_path(home.path());
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        "[stream]\nurl = ws://fleet.example:9000/ws\n\n[animation]\nduration_ms = 500\nframe_rate = 30\npolicy = overlap\n",
    )
    .unwrap();

    let output = run_cli(home.path(), &["config", "show"]);
    assert_success(&output, "config show");

    let text = stdout(&output);
    assert!(text.contains("url = ws://fleet.example:9000/ws"));
    assert!(text.contains("frame_rate = 30 (15 frames per snapshot)"));
    assert!(text.contains("policy = overlap"));
}

#[test]
fn test_config_show_rejects_invalid_value() {
    let home = TempDir::new().expect("Failed to create temp dir");
    let path = config_path(home.path());
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "[animation]\npolicy = queue\n").unwrap();

    let output = run_cli(home.path(), &["config", "show"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Configuration error"), "stderr: {}", stderr);
    assert!(stderr.contains("animation.policy"), "stderr: {}", stderr);
}
