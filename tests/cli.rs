use std::fs;
use std::path::Path;
use std::process::Command as StdCommand;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{tempdir, TempDir};

fn git(repo: &Path, args: &[&str]) {
    let output = StdCommand::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .output()
        .expect("git should launch");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// A repository with doc output, a publish config and a local bare
/// remote named origin. Returns (repo, remote) tempdir guards.
fn publishable_repo() -> (TempDir, TempDir) {
    let repo = tempdir().unwrap();
    git(repo.path(), &["init", "-q"]);
    git(repo.path(), &["config", "user.name", "Publisher Test"]);
    git(repo.path(), &["config", "user.email", "publisher@example.com"]);

    fs::create_dir_all(repo.path().join("doc/docbook")).unwrap();
    fs::create_dir_all(repo.path().join("doc/doxygen")).unwrap();
    fs::write(repo.path().join("doc/docbook/book.html"), "<p>book</p>").unwrap();
    fs::write(repo.path().join("doc/doxygen/api.html"), "<p>api</p>").unwrap();
    fs::write(repo.path().join("doc/index.html"), "<p>index</p>").unwrap();

    fs::write(
        repo.path().join("publish.yaml"),
        b"sites:\n  - branch: gh-pages\n    remote: origin\n    directories:\n      - source: doc/docbook\n        dest: docbook\n      - source: doc/doxygen\n        dest: doxygen\n    files:\n      - source: doc/index.html\n        dest: index.html\n",
    )
    .unwrap();

    let remote = tempdir().unwrap();
    git(remote.path(), &["init", "-q", "--bare"]);
    git(
        repo.path(),
        &["remote", "add", "origin", remote.path().to_str().unwrap()],
    );
    (repo, remote)
}

#[test]
fn publish_cli_happy_flow_prints_progress_and_succeeds() {
    let (repo, remote) = publishable_repo();

    let mut cmd = Command::cargo_bin("gh-pages-push").expect("Binary exists");
    cmd.arg("publish")
        .arg("--config")
        .arg(repo.path().join("publish.yaml"))
        .arg("--repo")
        .arg(repo.path());

    cmd.assert()
        .success()
        .stdout(
            predicate::str::contains("Committing")
                .and(predicate::str::contains("Pushing"))
                .and(predicate::str::contains("Publish complete")),
        );

    // the remote branch now exists
    let output = StdCommand::new("git")
        .arg("-C")
        .arg(remote.path())
        .args(["rev-parse", "--verify", "refs/heads/gh-pages"])
        .output()
        .unwrap();
    assert!(output.status.success(), "remote gh-pages should exist");
}

/// A missing source exits non-zero and the target branch stays unborn.
#[test]
fn publish_cli_missing_source_fails_without_commit() {
    let (repo, _remote) = publishable_repo();
    fs::remove_dir_all(repo.path().join("doc/docbook")).unwrap();

    let mut cmd = Command::cargo_bin("gh-pages-push").expect("Binary exists");
    cmd.arg("publish")
        .arg("--config")
        .arg(repo.path().join("publish.yaml"))
        .arg("--repo")
        .arg(repo.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    let output = StdCommand::new("git")
        .arg("-C")
        .arg(repo.path())
        .args(["rev-parse", "--verify", "--quiet", "refs/heads/gh-pages"])
        .output()
        .unwrap();
    assert!(
        !output.status.success(),
        "no gh-pages branch may exist after a staging failure"
    );
}

#[test]
fn publish_cli_rejects_unreadable_config() {
    let (repo, _remote) = publishable_repo();

    let mut cmd = Command::cargo_bin("gh-pages-push").expect("Binary exists");
    cmd.arg("publish")
        .arg("--config")
        .arg(repo.path().join("missing.yaml"))
        .arg("--repo")
        .arg(repo.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("config"));
}
