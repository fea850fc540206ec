use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a test command isolated from the user's environment
fn redisview() -> Command {
    let mut cmd = Command::cargo_bin("redisview").unwrap();
    cmd.env_remove("REDIS_URL")
        .env_remove("REDISVIEW_PROFILE")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .env(
            "REDISVIEW_CONFIG_FILE",
            "/tmp/redisview-test-nonexistent/config.toml",
        );
    cmd
}

#[test]
fn test_help_flag() {
    redisview()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Browse and query"))
        .stdout(predicate::str::contains("EXAMPLES:"));
}

#[test]
fn test_subcommand_help() {
    redisview()
        .args(["exec", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_short_h_needs_a_host() {
    redisview()
        .arg("-h")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--host"));
}

#[test]
fn test_version_flag() {
    redisview()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("redisview"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_no_args_shows_usage() {
    redisview()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_invalid_scheme_is_fatal() {
    redisview()
        .args(["--url", "http://localhost:6379", "ping"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid scheme: http"))
        .stderr(predicate::str::contains("tip"));
}

#[test]
fn test_invalid_database_in_env_url_is_fatal() {
    redisview()
        .env("REDIS_URL", "redis://localhost:6379/abc")
        .arg("ping")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid database number: abc"));
}

#[test]
fn test_unknown_profile_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[profiles.local]\nport = 7000\n").unwrap();

    redisview()
        .args(["--config-file", path.to_str().unwrap(), "--profile", "prod", "ping"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile 'prod' not found"));
}

#[test]
fn test_console_quits_without_connecting() {
    redisview()
        .arg("console")
        .write_stdin(":help\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(":inspect KEY"));
}

#[test]
fn test_unknown_console_command() {
    redisview()
        .arg("console")
        .write_stdin(":flush\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown console command"));
}

#[test]
fn test_tls_cert_without_key_degrades() {
    let dir = TempDir::new().unwrap();
    let cert = dir.path().join("client.pem");
    fs::write(&cert, "not a certificate").unwrap();

    redisview()
        .args(["--tls", "--tls-cert", cert.to_str().unwrap(), "console"])
        .write_stdin("quit\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("TLS configuration error"));
}
