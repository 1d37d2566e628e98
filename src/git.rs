//! Git repository operations.

use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, FixedOffset};

use crate::commit::{CommitRange, CommitRecord};

const FIELD_SEP: char = '\x1f';
const RECORD_SEP: char = '\x1e';

/// `%H %h %aI %cI %s %b`, unit-separated, record-terminated.
const LOG_FORMAT: &str = "--format=%H%x1f%h%x1f%aI%x1f%cI%x1f%s%x1f%b%x1e";

/// A git repository handle that provides common operations.
pub struct Git {
    root: PathBuf,
}

impl Git {
    /// Find the git repository root starting from the given directory.
    pub fn discover(start_dir: &Path) -> Result<Self, Error> {
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(start_dir)
            .output()
            .map_err(|e| Error::Exec(format!("git rev-parse: {e}")))?;

        if !output.status.success() {
            return Err(Error::NotARepo(start_dir.display().to_string()));
        }

        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Self {
            root: PathBuf::from(root),
        })
    }

    /// The `.git` directory (or worktree git dir), absolute.
    pub fn git_dir(&self) -> Result<PathBuf, Error> {
        let dir = self.run_output(&["rev-parse", "--absolute-git-dir"])?;
        Ok(PathBuf::from(dir.trim()))
    }

    /// Resolve an arbitrary revision expression to a full commit hash.
    pub fn resolve_revision(&self, revision: &str) -> Result<String, Error> {
        let commit = format!("{revision}^{{commit}}");
        self.run_output(&["rev-parse", "--verify", "--quiet", &commit])
            .map(|hash| hash.trim().to_string())
            .map_err(|_| Error::BadRevision(revision.to_string()))
    }

    /// Check if a ref or revision exists.
    pub fn ref_exists(&self, refname: &str) -> bool {
        Command::new("git")
            .args(["rev-parse", "--verify", "--quiet", refname])
            .current_dir(&self.root)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    /// Fetch the commits after `revision` up to `HEAD`, oldest first.
    ///
    /// Like `rebase -i`, the revision itself is the exclusive base. When it
    /// is the root commit it has no base of its own, so it is included and
    /// the range is marked as starting at the root.
    pub fn fetch_commits(&self, revision: &str) -> Result<CommitRange, Error> {
        let resolved = self.resolve_revision(revision)?;
        let after = self.log(&[&format!("{resolved}..HEAD")])?;

        if self.ref_exists(&format!("{resolved}^")) {
            tracing::debug!(base = %resolved, count = after.len(), "fetched commits");
            return Ok(CommitRange {
                commits: after,
                base: Some(resolved),
            });
        }

        tracing::debug!(root = %resolved, "revision is the root commit; including it");
        let mut commits = self.log(&["-1", &resolved])?;
        commits.extend(after);
        Ok(CommitRange {
            commits,
            base: None,
        })
    }

    /// The user's editor, as git would pick it.
    pub fn editor(&self) -> Result<String, Error> {
        let editor = self.run_output(&["var", "GIT_EDITOR"])?;
        let editor = editor.trim();
        Ok(if editor.is_empty() { "vi" } else { editor }.to_string())
    }

    /// Run `editor` on `path`, attached to the terminal.
    pub fn open_editor(&self, editor: &str, path: &Path) -> Result<(), Error> {
        let mut parts = editor.split_whitespace();
        let program = parts.next().ok_or(Error::EmptyEditor)?;

        let status = Command::new(program)
            .args(parts)
            .arg(path)
            .current_dir(&self.root)
            .status()
            .map_err(|e| Error::Exec(format!("{program}: {e}")))?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::Failed(format!("editor '{editor}' exited with {status}")))
        }
    }

    /// Run a non-interactive `rebase -i` whose todo is replaced by `script`.
    ///
    /// On failure the rebase is aborted so the repository is back where it
    /// started.
    pub fn execute_rebase(&self, script: &Path, base: Option<&str>) -> Result<(), Error> {
        let mut args = vec!["rebase", "-i", "--rebase-merges"];
        match base {
            Some(base) => args.push(base),
            None => args.push("--root"),
        }

        let sequence_editor = format!("cp {}", sh_single_quote(&script.display().to_string()));
        tracing::debug!(?args, %sequence_editor, "running rebase");

        let status = Command::new("git")
            .args(&args)
            .env("GIT_SEQUENCE_EDITOR", &sequence_editor)
            .current_dir(&self.root)
            .status()
            .map_err(|e| Error::Exec(format!("git rebase: {e}")))?;

        if status.success() {
            return Ok(());
        }

        tracing::warn!(%status, "rebase failed, aborting");
        match self.run(&["rebase", "--abort"]) {
            Ok(()) => Err(Error::RebaseAborted),
            Err(abort) => Err(Error::RebaseAbortFailed(abort.to_string())),
        }
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    fn log(&self, range: &[&str]) -> Result<Vec<CommitRecord>, Error> {
        let mut args = vec!["log", LOG_FORMAT, "--reverse"];
        args.extend_from_slice(range);
        let output = self.run_output(&args)?;
        parse_log_output(&output)
    }

    /// Run a git command that produces no output we care about.
    fn run(&self, args: &[&str]) -> Result<(), Error> {
        let status = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .status()
            .map_err(|e| Error::Exec(format!("git {}: {e}", args.first().unwrap_or(&""))))?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::Failed(format!("git {}", args.join(" "))))
        }
    }

    /// Run a git command and capture its stdout.
    fn run_output(&self, args: &[&str]) -> Result<String, Error> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .map_err(|e| Error::Exec(format!("git {}: {e}", args.first().unwrap_or(&""))))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(Error::Failed(format!(
                "git {}: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}

/// Parse `git log` output produced with `LOG_FORMAT`.
pub fn parse_log_output(output: &str) -> Result<Vec<CommitRecord>, Error> {
    output
        .split(RECORD_SEP)
        .map(str::trim)
        .filter(|record| !record.is_empty())
        .map(parse_log_record)
        .collect()
}

fn parse_log_record(record: &str) -> Result<CommitRecord, Error> {
    let fields: Vec<&str> = record.splitn(6, FIELD_SEP).collect();
    let [hash, short_hash, author, committer, subject, rest @ ..] = fields.as_slice() else {
        return Err(Error::LogFormat(record.to_string()));
    };

    Ok(CommitRecord {
        hash: hash.trim().to_string(),
        short_hash: short_hash.trim().to_string(),
        author_date: parse_iso(author)?,
        commit_date: parse_iso(committer)?,
        subject: subject.trim().to_string(),
        body: rest.first().map(|b| b.trim().to_string()).unwrap_or_default(),
    })
}

fn parse_iso(raw: &str) -> Result<DateTime<FixedOffset>, Error> {
    DateTime::parse_from_rfc3339(raw.trim()).map_err(|e| Error::LogFormat(format!("date '{raw}': {e}")))
}

fn sh_single_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Errors from git operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to execute: {0}")]
    Exec(String),

    #[error("not a git repository (searched from '{0}')")]
    NotARepo(String),

    #[error("cannot resolve revision '{0}'")]
    BadRevision(String),

    #[error("unexpected git log output: {0}")]
    LogFormat(String),

    #[error("empty editor command")]
    EmptyEditor,

    #[error("rebase failed (auto-aborted)\nhint: your repository has been restored to its original state")]
    RebaseAborted,

    #[error("rebase failed, and rebase --abort failed too: {0}")]
    RebaseAbortFailed(String),

    #[error("{0}")]
    Failed(String),
}
