//! Run a retime: pick commits, compute new dates, rewrite history.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, TimeDelta};
use rand::Rng;
use thiserror::Error;

use crate::commit::{CommitRange, ResolvedCommit};
use crate::compile::compile;
use crate::git::{self, Git};
use crate::timestamp::{ResolveError, format_local, resolve_all};
use crate::todo::{self, ParseError, StructureError};

/// Name of the todo file inside the git directory.
pub const TODO_FILE_NAME: &str = "git-retime-todo";

/// What a run should do, assembled from flags and config.
#[derive(Debug, Clone)]
pub struct Options {
    /// Exclusive base revision (`HEAD~3`, a hash, ...).
    pub revision: String,
    pub mode: Mode,
    pub split_dates: bool,
    pub allow_paradox: bool,
    /// Print the rebase script instead of running it.
    pub dry_run: bool,
    /// Overrides git's editor.
    pub editor: Option<String>,
}

/// How new dates are chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Edit a todo file in the user's editor.
    Interactive,
    /// Move every commit by the same amount.
    Shift(TimeDelta),
    /// Random time of day within a window, keeping each commit's date.
    Randomize(TimeWindow),
}

/// Execute a retime of the commits after `options.revision`.
pub fn execute(git: &Git, options: &Options) -> Result<(), Error> {
    let range = git.fetch_commits(&options.revision)?;
    if range.commits.is_empty() {
        return Err(Error::NoCommits);
    }

    let now = Local::now().fixed_offset();
    tracing::info!(
        commits = range.commits.len(),
        root = range.includes_root(),
        mode = ?options.mode,
        "retiming"
    );

    match &options.mode {
        Mode::Interactive => run_interactive(git, &range, options, now),
        Mode::Shift(shift) => {
            let commits = shifted(&range, *shift)?;
            finish(git, &range, &commits, options.dry_run)
        }
        Mode::Randomize(window) => {
            let commits = randomized(
                &range,
                window,
                options.allow_paradox,
                &mut rand::thread_rng(),
            );
            finish(git, &range, &commits, options.dry_run)
        }
    }
}

fn run_interactive(
    git: &Git,
    range: &CommitRange,
    options: &Options,
    now: DateTime<FixedOffset>,
) -> Result<(), Error> {
    let editor = match &options.editor {
        Some(editor) => editor.clone(),
        None => git.editor()?,
    };
    let todo_file = TodoFile(todo_path(&git.git_dir()?));
    let mut content = todo::generate(range, options.split_dates);

    loop {
        todo_file.write(&content)?;
        git.open_editor(&editor, &todo_file.0)?;
        let edited = todo_file.read()?;

        if todo::is_abort(&edited) {
            eprintln!("retime aborted");
            return Ok(());
        }

        let commits = match prepare(&edited, range, options.split_dates, now) {
            Ok(commits) => commits,
            Err(e) if e.is_recoverable() => {
                eprintln!("error: {e}");
                if !prompt_yes_no("Edit the todo file again?")? {
                    return Err(e);
                }
                content = edited;
                continue;
            }
            Err(e) => return Err(e),
        };

        let paradoxes = check_paradoxes(&commits);
        if !paradoxes.is_empty() {
            eprintln!("warning: time paradox detected");
            for paradox in &paradoxes {
                eprintln!("  {paradox}");
            }
            if !prompt_yes_no("Proceed anyway?")? {
                content = edited;
                continue;
            }
        }

        return finish(git, range, &commits, options.dry_run);
    }
}

/// Parse, validate and resolve an edited todo file.
pub fn prepare(
    content: &str,
    range: &CommitRange,
    split_dates: bool,
    now: DateTime<FixedOffset>,
) -> Result<Vec<ResolvedCommit>, Error> {
    let entries = todo::parse(content, split_dates)?;
    let mut commits = todo::into_resolved(entries, &range.commits, split_dates)?;
    resolve_all(&mut commits, now, split_dates)?;
    Ok(commits)
}

/// Compile the script and either print it or hand it to `rebase`.
fn finish(
    git: &Git,
    range: &CommitRange,
    commits: &[ResolvedCommit],
    dry_run: bool,
) -> Result<(), Error> {
    let script = compile(commits);

    if dry_run {
        print!("{script}");
        return Ok(());
    }

    let mut file = tempfile::Builder::new()
        .prefix("git-retime-rebase-")
        .suffix(".todo")
        .tempfile()
        .map_err(|source| Error::Io {
            path: std::env::temp_dir(),
            source,
        })?;
    file.write_all(script.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|source| Error::Io {
            path: file.path().to_path_buf(),
            source,
        })?;

    git.execute_rebase(file.path(), range.base.as_deref())?;
    println!("Retimed {} commit(s).", commits.len());
    Ok(())
}

fn shifted(range: &CommitRange, shift: TimeDelta) -> Result<Vec<ResolvedCommit>, Error> {
    range
        .commits
        .iter()
        .map(|record| {
            let mut commit = ResolvedCommit::from_record(record);
            commit.resolved_author_date = record
                .author_date
                .checked_add_signed(shift)
                .ok_or(Error::OutOfRange)?;
            commit.resolved_commit_date = record
                .commit_date
                .checked_add_signed(shift)
                .ok_or(Error::OutOfRange)?;
            Ok(commit)
        })
        .collect()
}

fn randomized<R: Rng + ?Sized>(
    range: &CommitRange,
    window: &TimeWindow,
    allow_paradox: bool,
    rng: &mut R,
) -> Vec<ResolvedCommit> {
    let mut times: Vec<_> = range
        .commits
        .iter()
        .map(|c| randomize_time(c.author_date, window, rng))
        .collect();

    if !allow_paradox {
        let days: Vec<NaiveDate> = range.commits.iter().map(|c| c.author_date.date_naive()).collect();
        sort_times_within_days(&days, &mut times);
    }

    range
        .commits
        .iter()
        .zip(times)
        .map(|(record, time)| {
            let mut commit = ResolvedCommit::from_record(record);
            commit.resolved_author_date = time;
            commit.resolved_commit_date = time;
            commit
        })
        .collect()
}

/// Keep `original`'s date and offset, with a random time of day in `window`.
pub fn randomize_time<R: Rng + ?Sized>(
    original: DateTime<FixedOffset>,
    window: &TimeWindow,
    rng: &mut R,
) -> DateTime<FixedOffset> {
    let midnight = original - (original.time() - NaiveTime::MIN);
    let secs = rng.gen_range(window.start..window.end);
    midnight + TimeDelta::seconds(i64::from(secs))
}

/// Sort `times` ascending among commits that share a calendar day, leaving
/// each day's set of positions unchanged.
///
/// Commits on different days stay independent; a later commit on an earlier
/// day is allowed.
pub fn sort_times_within_days(days: &[NaiveDate], times: &mut [DateTime<FixedOffset>]) {
    let mut groups: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
    for (i, day) in days.iter().enumerate() {
        groups.entry(*day).or_default().push(i);
    }

    for indices in groups.values() {
        let mut sorted: Vec<_> = indices.iter().map(|&i| times[i]).collect();
        sorted.sort();
        for (&i, time) in indices.iter().zip(sorted) {
            times[i] = time;
        }
    }
}

/// Describe every commit whose new author date is before its predecessor's.
pub fn check_paradoxes(commits: &[ResolvedCommit]) -> Vec<String> {
    commits
        .windows(2)
        .filter(|pair| pair[1].resolved_author_date < pair[0].resolved_author_date)
        .map(|pair| {
            format!(
                "{} ({}) is older than {} ({})",
                pair[1].short_hash,
                format_local(&pair[1].resolved_author_date),
                pair[0].short_hash,
                format_local(&pair[0].resolved_author_date),
            )
        })
        .collect()
}

fn prompt_yes_no(question: &str) -> Result<bool, Error> {
    eprint!("{question} [y/N] ");
    io::stderr().flush().map_err(Error::Prompt)?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(Error::Prompt)?;

    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// The todo file in the git directory, removed when dropped.
struct TodoFile(PathBuf);

impl TodoFile {
    fn write(&self, content: &str) -> Result<(), Error> {
        std::fs::write(&self.0, content).map_err(|source| self.io_error(source))
    }

    fn read(&self) -> Result<String, Error> {
        std::fs::read_to_string(&self.0).map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: io::Error) -> Error {
        Error::Io {
            path: self.0.clone(),
            source,
        }
    }
}

impl Drop for TodoFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.0) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %self.0.display(), error = %e, "could not remove todo file");
            }
        }
    }
}

// =============================================================================
// Randomize window
// =============================================================================

/// A half-open time-of-day window `[start, end)`, in seconds after midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: u32,
    end: u32,
}

impl FromStr for TimeWindow {
    type Err = WindowError;

    /// Parse `HH:MM-HH:MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| WindowError::Layout(s.to_string()))?;
        let start = parse_time_of_day(start)?;
        let end = parse_time_of_day(end)?;
        if end <= start {
            return Err(WindowError::Empty(s.to_string()));
        }
        Ok(Self { start, end })
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start / 3600,
            self.start % 3600 / 60,
            self.end / 3600,
            self.end % 3600 / 60
        )
    }
}

fn parse_time_of_day(s: &str) -> Result<u32, WindowError> {
    let s = s.trim();
    let invalid = || WindowError::TimeOfDay(s.to_string());

    let (h, m) = s.split_once(':').ok_or_else(invalid)?;
    let h: u32 = h.parse().map_err(|_| invalid())?;
    let m: u32 = m.parse().map_err(|_| invalid())?;
    if h > 23 || m > 59 {
        return Err(invalid());
    }
    Ok(h * 3600 + m * 60)
}

/// Errors from parsing a `--randomize` window.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("expected HH:MM-HH:MM, got '{0}'")]
    Layout(String),

    #[error("invalid time of day '{0}' (expected HH:MM)")]
    TimeOfDay(String),

    #[error("randomize end time must be after start time: '{0}'")]
    Empty(String),
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during a retime.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no commits in the specified range")]
    NoCommits,

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("shifted timestamp is out of range")]
    OutOfRange,

    #[error("git error")]
    Git(#[from] git::Error),

    #[error("failed to access '{}'", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read answer")]
    Prompt(#[source] io::Error),
}

impl Error {
    /// Whether the user can fix this by editing the todo file again.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Parse(_) | Error::Structure(_) | Error::Resolve(_)
        )
    }
}

/// Path of the todo file for a repository whose git dir is `git_dir`.
pub fn todo_path(git_dir: &Path) -> PathBuf {
    git_dir.join(TODO_FILE_NAME)
}
