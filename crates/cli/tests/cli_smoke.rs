//! Smoke tests for libraryctl against the in-memory backend

use assert_cmd::Command;
use predicates::prelude::*;

fn libraryctl() -> Command {
    let mut cmd = Command::cargo_bin("libraryctl").unwrap();
    cmd.env("LIBRARY_CONFIG_DIR", "does-not-exist")
        .env_remove("LIBRARY_ENV")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    libraryctl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("setup"))
        .stdout(predicate::str::contains("verify"))
        .stdout(predicate::str::contains("search"));
}

#[test]
fn test_setup_on_memory_backend() {
    libraryctl()
        .args(["--backend", "memory", "setup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Book count:\n3"))
        .stdout(predicate::str::contains("Member count:\n2"))
        .stdout(predicate::str::contains("Loan count:\n2"))
        .stdout(predicate::str::ends_with("Setup completed successfully!\n"));
}

#[test]
fn test_verify_on_empty_memory_backend() {
    libraryctl()
        .args(["--backend", "memory", "verify"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Book count:\n0"));
}

#[test]
fn test_unknown_backend_is_rejected() {
    libraryctl()
        .args(["--backend", "sqlite", "verify"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported backend"));
}
