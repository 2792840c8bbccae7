use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_kinds_lists_all_content() {
    Command::cargo_bin("ytmeta")
        .unwrap()
        .arg("kinds")
        .assert()
        .success()
        .stdout(predicate::str::contains("title"))
        .stdout(predicate::str::contains("hashtags"))
        .stdout(predicate::str::contains("captions"));
}

#[test]
fn test_process_requires_files() {
    Command::cargo_bin("ytmeta")
        .unwrap()
        .arg("process")
        .assert()
        .failure()
        .stderr(predicate::str::contains("FILE"));
}

#[test]
fn test_help_mentions_subcommands() {
    Command::cargo_bin("ytmeta")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("config"));
}
