//! Compile resolved commits into a rebase todo script.
//!
//! Every commit becomes a `pick` line followed by an `exec` line that amends
//! its dates (and, if edited, its message). `--date` carries the author date
//! because `GIT_AUTHOR_DATE` is ignored by `commit --amend`.

use std::fmt::Write as _;

use crate::commit::ResolvedCommit;
use crate::timestamp::format_git;

/// Render the rebase todo for `commits`, oldest first.
///
/// No validation happens here: the commits must already be resolved.
pub fn compile(commits: &[ResolvedCommit]) -> String {
    let mut script = String::new();

    for commit in commits {
        let subject = if commit.new_subject.is_empty() {
            &commit.subject
        } else {
            &commit.new_subject
        };

        let _ = writeln!(script, "pick {} {}", commit.short_hash, subject);
        let _ = writeln!(script, "{}", exec_line(commit));
    }

    script
}

fn exec_line(commit: &ResolvedCommit) -> String {
    let author_date = format_git(&commit.resolved_author_date);
    let commit_date = format_git(&commit.resolved_commit_date);

    if commit.subject_changed() {
        format!(
            "exec GIT_COMMITTER_DATE=\"{commit_date}\" git commit --amend --allow-empty \
             --date=\"{author_date}\" -m {}",
            shell_quote(&full_message(commit))
        )
    } else {
        format!(
            "exec GIT_COMMITTER_DATE=\"{commit_date}\" git commit --amend --no-edit --allow-empty \
             --date=\"{author_date}\""
        )
    }
}

/// New subject plus the original body.
fn full_message(commit: &ResolvedCommit) -> String {
    if commit.body.is_empty() {
        commit.new_subject.clone()
    } else {
        format!("{}\n\n{}", commit.new_subject, commit.body)
    }
}

/// Quote `s` as a single POSIX shell word.
///
/// Rebase runs `exec` lines through `/bin/sh`, and an `exec` line cannot span
/// lines, so newlines and tabs travel as `printf %b` escapes inside a
/// single-quoted string: `"$(printf '%b' '...')"`.
fn shell_quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 20);
    quoted.push_str("\"$(printf '%b' '");
    for c in s.chars() {
        match c {
            '\\' => quoted.push_str(r"\\"),
            '\'' => quoted.push_str(r"'\''"),
            '\n' => quoted.push_str(r"\n"),
            '\t' => quoted.push_str(r"\t"),
            c => quoted.push(c),
        }
    }
    quoted.push_str("')\"");
    quoted
}
