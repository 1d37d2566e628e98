//! End-to-end tests: run the binary against throwaway repositories.

#[macro_use]
mod common;

use chrono::{DateTime, Timelike};
use common::TestRepo;

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn instant(iso: &str) -> DateTime<chrono::FixedOffset> {
    DateTime::parse_from_rfc3339(iso).expect("git printed a valid date")
}

#[test]
fn shift_moves_commits_after_base() {
    skip_if_no_git!();
    let repo = TestRepo::with_base_and_three_commits();

    let output = repo.retime(&["HEAD~3", "--shift", "+2h"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let history = repo.history();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].0, "2026-02-23T09:00:00+01:00", "base is untouched");
    assert_eq!(history[1].0, "2026-02-23T12:00:00+01:00");
    assert_eq!(history[1].1, "2026-02-23T12:00:00+01:00");
    assert_eq!(history[3].0, "2026-02-23T14:00:00+01:00");
    assert_eq!(history[3].2, "Third");
    assert_eq!(repo.message("HEAD"), "Third\n\nExplains the third change.");
}

#[test]
fn shift_from_root_includes_it() {
    skip_if_no_git!();
    let repo = TestRepo::with_base_and_three_commits();
    let root = repo.git(&["rev-list", "--max-parents=0", "HEAD"]).trim().to_string();

    let output = repo.retime(&[&root, "--shift", "-1d"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let history = repo.history();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].0, "2026-02-22T09:00:00+01:00");
    assert_eq!(history[3].1, "2026-02-22T12:00:00+01:00");
}

#[test]
fn dry_run_prints_script_and_leaves_history() {
    skip_if_no_git!();
    let repo = TestRepo::with_base_and_three_commits();
    let head = repo.head();
    let second = repo.short("HEAD~1");

    let output = repo.retime(&["HEAD~3", "--shift", "+30m", "--dry-run"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let script = String::from_utf8_lossy(&output.stdout);
    assert!(script.contains(&format!("pick {second} Second")), "{script}");
    assert!(
        script.contains(r#"exec GIT_COMMITTER_DATE="2026-02-23T11:30:00+01:00" git commit --amend --no-edit"#),
        "{script}"
    );
    assert_eq!(script.lines().filter(|l| l.starts_with("pick ")).count(), 3);
    assert_eq!(repo.head(), head);
}

#[test]
fn randomize_stays_in_window_and_in_order() {
    skip_if_no_git!();
    let repo = TestRepo::with_base_and_three_commits();

    let output = repo.retime(&["HEAD~3", "--randomize", "09:00-17:00"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let history = repo.history();
    assert_eq!(history[0].0, "2026-02-23T09:00:00+01:00", "base is untouched");

    let dates: Vec<_> = history[1..].iter().map(|(author, _, _)| instant(author)).collect();
    for date in &dates {
        assert!((9..17).contains(&date.hour()), "{date}");
        assert_eq!(date.date_naive().to_string(), "2026-02-23");
        assert_eq!(date.offset().local_minus_utc(), 3600);
    }
    assert!(dates.windows(2).all(|w| w[0] <= w[1]), "same-day times are sorted");
}

#[test]
fn conflicting_modes_are_rejected() {
    skip_if_no_git!();
    let repo = TestRepo::with_base_and_three_commits();

    let output = repo.retime(&["HEAD~3", "--shift", "+1h", "--randomize", "09:00-17:00"]);
    assert!(!output.status.success());

    let output = repo.retime(&["HEAD~3", "--randomize", "17:00-09:00"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("after start"), "{}", stderr(&output));
}

#[test]
fn unknown_revision_fails_cleanly() {
    skip_if_no_git!();
    let repo = TestRepo::with_base_and_three_commits();

    let output = repo.retime(&["no-such-branch", "--shift", "+1h"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("no-such-branch"), "{}", stderr(&output));
}

#[test]
fn empty_range_is_an_error() {
    skip_if_no_git!();
    let repo = TestRepo::with_base_and_three_commits();

    let output = repo.retime(&["HEAD", "--shift", "+1h"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("no commits"), "{}", stderr(&output));
}

#[cfg(unix)]
mod interactive {
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    use retime::timestamp::{format_local, parse_local};

    use super::*;

    /// How the todo file shows the instant `iso`.
    fn original_display(iso: &str) -> String {
        format_local(&instant(iso))
    }

    /// Write an editor script that replaces the todo with `content`.
    fn editor_writing(repo: &TestRepo, content: &str) -> PathBuf {
        let path = repo.path().join("fake-editor.sh");
        let script = format!("#!/bin/sh\ncat > \"$1\" <<'TODO'\n{content}TODO\n");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn retime_editing(repo: &TestRepo, content: &str) -> std::process::Output {
        let editor = editor_writing(repo, content);
        repo.retime_with_env(&["HEAD~3"], &[("GIT_EDITOR", editor.to_str().unwrap())])
    }

    #[test]
    fn edited_todo_is_applied() {
        skip_if_no_git!();
        let repo = TestRepo::with_base_and_three_commits();
        let first = repo.short("HEAD~2");
        let second = repo.short("HEAD~1");
        let third = repo.short("HEAD");

        let output = retime_editing(
            &repo,
            &format!(
                "{first}  {}  First\n{second}  2026-03-01 08:00:00  Second\n{third}  +90m  Third renamed\n",
                original_display("2026-02-23T10:00:00+01:00")
            ),
        );
        assert!(output.status.success(), "{}", stderr(&output));

        let want = parse_local("2026-03-01 08:00:00").unwrap();
        let history = repo.history();
        assert_eq!(history[1].0, "2026-02-23T10:00:00+01:00", "displayed date is a no-op");
        assert_eq!(instant(&history[2].0), want);
        assert_eq!(instant(&history[2].0).offset().local_minus_utc(), 3600);
        assert_eq!(instant(&history[3].0), want + chrono::TimeDelta::minutes(90));
        assert_eq!(history[3].2, "Third renamed");
        assert_eq!(
            repo.message("HEAD"),
            "Third renamed\n\nExplains the third change."
        );
        assert!(!repo.git_dir().join("git-retime-todo").exists());
    }

    #[test]
    fn renamed_subject_keeps_shell_metacharacters() {
        skip_if_no_git!();
        let repo = TestRepo::with_base_and_three_commits();
        let first = repo.short("HEAD~2");
        let second = repo.short("HEAD~1");
        let third = repo.short("HEAD");
        let subject = "Third, it's\trenamed \\o/ $HOME `date`";

        let output = retime_editing(
            &repo,
            &format!(
                "{first}  {}  First\n{second}  PREV +1h  Second\n{third}  +1h  {subject}\n",
                original_display("2026-02-23T10:00:00+01:00")
            ),
        );
        assert!(output.status.success(), "{}", stderr(&output));

        let history = repo.history();
        assert_eq!(history[3].2, subject);
        assert_eq!(
            repo.message("HEAD"),
            format!("{subject}\n\nExplains the third change.")
        );
        assert_eq!(history[1].2, "First");
        assert_eq!(history[2].0, "2026-02-23T11:00:00+01:00");
        assert_eq!(history[3].0, "2026-02-23T12:00:00+01:00");
        assert_eq!(repo.message("HEAD~1"), "Second");
    }

    #[test]
    fn abort_leaves_history_alone() {
        skip_if_no_git!();
        let repo = TestRepo::with_base_and_three_commits();
        let head = repo.head();

        let output = retime_editing(&repo, "ABORT\n");
        assert!(output.status.success(), "{}", stderr(&output));
        assert!(stderr(&output).contains("aborted"));
        assert_eq!(repo.head(), head);
        assert!(!repo.git_dir().join("git-retime-todo").exists());
    }
}
