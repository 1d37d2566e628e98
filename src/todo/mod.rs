//! The editable todo file.
//!
//! One line per commit, columns separated by two or more spaces:
//!
//! ```text
//! abc1234  2026-02-23 10:00:00  Fix navbar
//! ```
//!
//! In split-date mode a committer column follows the author column. Lines
//! starting with `#` and blank lines are ignored.

mod help;
mod validate;

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

pub use help::help_block;
pub use validate::{StructureError, validate_structure};

use crate::commit::{CommitRange, CommitRecord, ResolvedCommit};
use crate::timestamp::format_local;

/// Keyword that aborts the run when it is the first commit line.
pub const ABORT_KEYWORD: &str = "ABORT";

static COLUMN_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(" {2,}").expect("column gap pattern is valid"));

/// One commit line of the edited todo file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoEntry {
    pub short_hash: String,
    pub author_token: String,
    /// Present only in split-date mode.
    pub committer_token: Option<String>,
    pub subject: String,
}

/// Produce the todo file for `range`.
pub fn generate(range: &CommitRange, split_dates: bool) -> String {
    let mut out = String::new();
    let count = range.commits.len();

    match &range.base {
        Some(base) => {
            let short = &base[..base.len().min(7)];
            let _ = writeln!(out, "# Retime {count} commit(s) onto {short}");
        }
        None => {
            let _ = writeln!(out, "# Retime {count} commit(s) (root)");
        }
    }
    out.push_str("#\n");

    for commit in &range.commits {
        let author = format_local(&commit.author_date);
        let line = if split_dates {
            let committer = format_local(&commit.commit_date);
            format!(
                "{}  {author}  {committer}  {}",
                commit.short_hash, commit.subject
            )
        } else {
            format!("{}  {author}  {}", commit.short_hash, commit.subject)
        };
        let _ = writeln!(out, "{}", line.trim_end());
    }

    out.push_str("#\n");
    out.push_str(&help_block(split_dates));
    out
}

/// Whether the edited content asks to abort: no commit lines at all, or
/// `ABORT` (any case) as the first one.
pub fn is_abort(content: &str) -> bool {
    match commit_lines(content).next() {
        None => true,
        Some((_, line)) => line.eq_ignore_ascii_case(ABORT_KEYWORD),
    }
}

/// Parse the edited todo file.
pub fn parse(content: &str, split_dates: bool) -> Result<Vec<TodoEntry>, ParseError> {
    commit_lines(content)
        .map(|(number, line)| parse_line(number, line, split_dates))
        .collect()
}

/// Merge parsed entries with the commits they describe.
///
/// The structure is validated first, so every entry lines up with the
/// original at the same position. A subject that only differs from the
/// original by how wide its internal gaps are counts as untouched, since the
/// todo format cannot show gaps wider than two spaces.
pub fn into_resolved(
    entries: Vec<TodoEntry>,
    originals: &[CommitRecord],
    split_dates: bool,
) -> Result<Vec<ResolvedCommit>, StructureError> {
    validate_structure(&entries, originals)?;

    Ok(entries
        .into_iter()
        .zip(originals)
        .map(|(entry, original)| {
            let mut commit = ResolvedCommit::from_record(original);
            commit.author_token = entry.author_token;
            if split_dates {
                commit.committer_token = entry.committer_token;
            }
            if entry.subject != collapse_gaps(&original.subject) {
                commit.new_subject = entry.subject;
            }
            commit
        })
        .collect())
}

/// `subject` as it reads back from a todo line: runs of two or more spaces
/// become exactly two.
fn collapse_gaps(subject: &str) -> String {
    COLUMN_GAP.replace_all(subject.trim(), "  ").into_owned()
}

/// Non-blank, non-comment lines with their 1-based line numbers.
fn commit_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn parse_line(number: usize, line: &str, split_dates: bool) -> Result<TodoEntry, ParseError> {
    let columns = split_columns(line);
    let expected = if split_dates { 4 } else { 3 };

    // An empty subject leaves no trailing column.
    if columns.len() < expected - 1 {
        return Err(ParseError::Columns {
            expected,
            found: columns.len(),
            line_number: number,
            line: line.to_string(),
        });
    }

    let subject = columns[expected - 1..].join("  ");
    Ok(TodoEntry {
        short_hash: columns[0].to_string(),
        author_token: columns[1].to_string(),
        committer_token: split_dates.then(|| columns[2].to_string()),
        subject,
    })
}

/// Split on runs of two or more spaces; single spaces stay inside a column.
fn split_columns(line: &str) -> Vec<&str> {
    COLUMN_GAP.split(line.trim()).collect()
}

/// Errors from parsing the edited todo file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(
        "expected {expected} columns, got {found} on line {line_number}: '{line}' \
         (separate columns with two or more spaces)"
    )]
    Columns {
        expected: usize,
        found: usize,
        line_number: usize,
        line: String,
    },
}
