//! Commit data flowing through a retime run.

use chrono::{DateTime, FixedOffset};

/// One commit as read from `git log`. Read-only input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub hash: String,
    pub short_hash: String,
    pub author_date: DateTime<FixedOffset>,
    pub commit_date: DateTime<FixedOffset>,
    pub subject: String,
    pub body: String,
}

/// The commits selected for retiming, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRange {
    pub commits: Vec<CommitRecord>,

    /// Full hash of the exclusive base, or `None` when the range starts at
    /// the repository root and the rebase needs `--root`.
    pub base: Option<String>,
}

impl CommitRange {
    pub fn includes_root(&self) -> bool {
        self.base.is_none()
    }
}

/// A commit together with its edits and, once resolved, its new timestamps.
///
/// Unless split-date mode is active, `resolved_commit_date` always equals
/// `resolved_author_date` after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommit {
    pub hash: String,
    pub short_hash: String,
    pub orig_author_date: DateTime<FixedOffset>,
    pub orig_commit_date: DateTime<FixedOffset>,
    pub subject: String,
    pub body: String,

    /// Subject after editing; equal to `subject` when untouched.
    pub new_subject: String,

    /// Raw text of the (author) timestamp column.
    pub author_token: String,

    /// Raw text of the committer column, split-date mode only.
    pub committer_token: Option<String>,

    pub resolved_author_date: DateTime<FixedOffset>,
    pub resolved_commit_date: DateTime<FixedOffset>,
}

impl ResolvedCommit {
    /// Start from `record` with no edits: tokens empty, resolved dates equal
    /// to the originals.
    pub fn from_record(record: &CommitRecord) -> Self {
        Self {
            hash: record.hash.clone(),
            short_hash: record.short_hash.clone(),
            orig_author_date: record.author_date,
            orig_commit_date: record.commit_date,
            subject: record.subject.clone(),
            body: record.body.clone(),
            new_subject: record.subject.clone(),
            author_token: String::new(),
            committer_token: None,
            resolved_author_date: record.author_date,
            resolved_commit_date: record.commit_date,
        }
    }

    /// Whether the edited subject differs from the original.
    pub fn subject_changed(&self) -> bool {
        !self.new_subject.is_empty() && self.new_subject != self.subject
    }
}
