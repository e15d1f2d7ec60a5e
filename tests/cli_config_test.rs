//! Integration tests for configuration resolution via `gvi config show`.

mod common;

use common::TestEnv;
use predicates::prelude::*;
use serde_json::Value;

fn show(env: &TestEnv, args: &[&str]) -> Value {
    let output = env
        .gvi()
        .args(["config", "show"])
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_defaults_without_config_file() {
    let env = TestEnv::new();
    let config = show(&env, &[]);
    assert_eq!(config["config_path"], Value::Null);
    assert_eq!(config["base_url"]["value"], "http://localhost:7070/api/v1");
    assert_eq!(config["base_url"]["source"], "default");
    assert_eq!(config["poll_interval_secs"]["value"], 5);
    assert_eq!(config["request_timeout_secs"]["value"], 10);
    assert_eq!(config["log_level"]["value"], "info");
}

#[test]
fn test_default_config_path_is_read() {
    let env = TestEnv::new();
    let dir = env.config_dir.path().join("gastown-viewer");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.kdl"), "poll-interval-secs 7\n").unwrap();

    let config = show(&env, &[]);
    assert_eq!(config["poll_interval_secs"]["value"], 7);
    assert!(
        config["poll_interval_secs"]["source"]
            .as_str()
            .unwrap()
            .starts_with("file:")
    );
}

#[test]
fn test_explicit_config_file() {
    let env = TestEnv::new();
    let path = env.write_config(
        r#"
base-url "http://gt-host:7070/api/v1"
request-timeout-secs 3
log-level "DEBUG"
"#,
    );

    let config = show(&env, &["--config", path.to_str().unwrap()]);
    assert_eq!(config["base_url"]["value"], "http://gt-host:7070/api/v1");
    assert_eq!(config["request_timeout_secs"]["value"], 3);
    assert_eq!(config["log_level"]["value"], "debug");
    assert_eq!(config["poll_interval_secs"]["source"], "default");
}

#[test]
fn test_config_path_from_environment() {
    let env = TestEnv::new();
    let path = env.write_config("base-url \"http://env-file:7070/api/v1\"\n");
    let output = env
        .gvi()
        .env("GVI_CONFIG", &path)
        .args(["config", "show"])
        .output()
        .unwrap();
    let config: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["base_url"]["value"], "http://env-file:7070/api/v1");
}

#[test]
fn test_precedence_cli_over_env_over_file() {
    let env = TestEnv::new();
    let path = env.write_config("base-url \"http://from-file:7070/api/v1\"\n");
    let path = path.to_str().unwrap();

    let output = env
        .gvi()
        .env("GVI_URL", "http://from-env:7070/api/v1")
        .args(["config", "show", "--config", path])
        .output()
        .unwrap();
    let config: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["base_url"]["value"], "http://from-env:7070/api/v1");
    assert_eq!(config["base_url"]["source"], "env:GVI_URL");

    let output = env
        .gvi()
        .env("GVI_URL", "http://from-env:7070/api/v1")
        .args([
            "config",
            "show",
            "--config",
            path,
            "--url",
            "http://from-cli:7070/api/v1",
        ])
        .output()
        .unwrap();
    let config: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["base_url"]["value"], "http://from-cli:7070/api/v1");
    assert_eq!(config["base_url"]["source"], "cli");
}

#[test]
fn test_human_output_lists_sources() {
    let env = TestEnv::new();
    env.gvi()
        .args(["config", "show", "-H", "--url", "http://gt:7070/api/v1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config file: (none)"))
        .stdout(predicate::str::contains("base-url = http://gt:7070/api/v1 (cli)"))
        .stdout(predicate::str::contains("poll-interval-secs = 5 (default)"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let env = TestEnv::new();
    env.gvi()
        .args(["config", "show", "-H", "--config", "/nonexistent/gvi.kdl"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn test_invalid_url_is_rejected() {
    let env = TestEnv::new();
    let output = env
        .gvi()
        .args(["board", "--url", "not a url"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let err: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert!(err["error"].as_str().unwrap().contains("(from cli)"));
}

#[test]
fn test_zero_interval_is_rejected() {
    let env = TestEnv::new();
    env.gvi()
        .args(["watch", "-H", "--interval", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("at least 1 second"));
}

#[test]
fn test_malformed_config_file_fails() {
    let env = TestEnv::new();
    let path = env.write_config("base-url {{{");
    env.gvi()
        .args(["config", "show", "--config", path.to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("\"error\""));
}
