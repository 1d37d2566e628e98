//! Common test utilities for end-to-end tests.
//!
//! Provides a temporary git repository with commits at known dates, and a
//! way to run the `git-retime` binary inside it.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Whether a usable `git` is on PATH.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Skip the current test when git is not installed.
macro_rules! skip_if_no_git {
    () => {
        if !common::git_available() {
            eprintln!("skipping: git not available");
            return;
        }
    };
}

/// A temporary git repository for testing.
///
/// The repository is automatically cleaned up when the TestRepo is dropped.
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create an empty repository with a local identity configured.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let repo = Self { dir };

        repo.git(&["init", "-q"]);
        repo.git(&["config", "user.name", "Retime Test"]);
        repo.git(&["config", "user.email", "retime@example.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo
    }

    /// Get the path to the repository root.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the `.git` directory.
    pub fn git_dir(&self) -> PathBuf {
        self.path().join(".git")
    }

    /// Execute a git command in this repository and return stdout.
    ///
    /// # Panics
    ///
    /// Panics if the command fails to execute or returns a non-zero exit code.
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .expect("Failed to execute git");

        if !output.status.success() {
            panic!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    /// Create a commit touching `file`, with both dates set to `date`
    /// (RFC 3339). Returns the full hash.
    pub fn commit_at(&self, file: &str, subject: &str, date: &str) -> String {
        std::fs::write(self.path().join(file), subject).expect("Failed to write file");
        self.git(&["add", file]);

        let output = Command::new("git")
            .args(["commit", "-q", "-m", subject])
            .env("GIT_AUTHOR_DATE", date)
            .env("GIT_COMMITTER_DATE", date)
            .current_dir(self.path())
            .output()
            .expect("Failed to execute git commit");
        assert!(
            output.status.success(),
            "git commit failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        self.head()
    }

    pub fn head(&self) -> String {
        self.git(&["rev-parse", "HEAD"]).trim().to_string()
    }

    pub fn short(&self, rev: &str) -> String {
        self.git(&["rev-parse", "--short", rev]).trim().to_string()
    }

    /// `(author date, committer date, subject)` oldest first, dates in
    /// strict ISO 8601 with their stored offset.
    pub fn history(&self) -> Vec<(String, String, String)> {
        self.git(&["log", "--reverse", "--format=%aI%x1f%cI%x1f%s"])
            .lines()
            .map(|line| {
                let mut fields = line.split('\x1f').map(str::to_string);
                (
                    fields.next().unwrap_or_default(),
                    fields.next().unwrap_or_default(),
                    fields.next().unwrap_or_default(),
                )
            })
            .collect()
    }

    /// Run `git-retime` with `args` inside the repository.
    pub fn retime(&self, args: &[&str]) -> Output {
        self.retime_with_env(args, &[])
    }

    pub fn retime_with_env(&self, args: &[&str], env: &[(&str, &str)]) -> Output {
        let mut command = Command::new(env!("CARGO_BIN_EXE_git-retime"));
        command
            .args(args)
            .current_dir(self.path())
            .env("GIT_EDITOR", "true")
            .env_remove("GIT_SEQUENCE_EDITOR");
        for (key, value) in env {
            command.env(key, value);
        }
        command.output().expect("Failed to execute git-retime")
    }

    /// Full message of `rev`, trailing newlines removed.
    pub fn message(&self, rev: &str) -> String {
        self.git(&["log", "-1", "--format=%B", rev]).trim_end().to_string()
    }

    /// A root commit at 09:00 followed by three commits an hour apart on
    /// 2026-02-23, all at offset +01:00. The last one has a body.
    pub fn with_base_and_three_commits() -> Self {
        let repo = Self::new();
        repo.commit_at("base.txt", "Base", "2026-02-23T09:00:00+01:00");
        repo.commit_at("a.txt", "First", "2026-02-23T10:00:00+01:00");
        repo.commit_at("b.txt", "Second", "2026-02-23T11:00:00+01:00");
        repo.commit_at(
            "c.txt",
            "Third\n\nExplains the third change.",
            "2026-02-23T12:00:00+01:00",
        );
        repo
    }
}
