//! Turn edited timestamp columns into concrete instants.
//!
//! Resolution is a single forward pass over the commits, oldest first.
//! `PREV` and bare shifts look at the commit immediately before, so the
//! order matters and the first commit cannot use either.

use std::fmt;

use chrono::{DateTime, FixedOffset, Local, SubsecRound, TimeDelta};
use rand::Rng;
use thiserror::Error;

use super::format::{FormatError, parse_local};
use super::random::{RandomError, contains_rr, resolve_rr};
use super::token::{EditToken, TokenError};
use crate::commit::ResolvedCommit;

/// Resolve every commit's tokens in place.
///
/// `now` is sampled once by the caller so all `NOW` tokens agree. Stops at
/// the first failure; earlier commits may already have been updated, so the
/// caller must discard the slice on error.
pub fn resolve_all(
    commits: &mut [ResolvedCommit],
    now: DateTime<FixedOffset>,
    split_dates: bool,
) -> Result<(), ResolveError> {
    resolve_all_with_rng(commits, now, split_dates, &mut rand::thread_rng())
}

/// [`resolve_all`] with an explicit source of randomness for `RR` markers.
pub fn resolve_all_with_rng<R: Rng + ?Sized>(
    commits: &mut [ResolvedCommit],
    now: DateTime<FixedOffset>,
    split_dates: bool,
    rng: &mut R,
) -> Result<(), ResolveError> {
    let mut previous: Option<Previous> = None;

    for commit in commits.iter_mut() {
        let anchor = previous.map(|p| Anchor {
            original: p.orig_author_date,
            resolved_author: p.resolved_author_date,
        });
        let author = resolve_one(&commit.author_token, commit.orig_author_date, anchor, now, rng)
            .map_err(|fault| ResolveError {
                hash: commit.short_hash.clone(),
                field: DateField::Author,
                fault,
            })?;

        let committer = if split_dates {
            let anchor = previous.map(|p| Anchor {
                original: p.orig_commit_date,
                resolved_author: p.resolved_author_date,
            });
            let token = commit.committer_token.as_deref().unwrap_or_default();
            resolve_one(token, commit.orig_commit_date, anchor, now, rng).map_err(|fault| {
                ResolveError {
                    hash: commit.short_hash.clone(),
                    field: DateField::Committer,
                    fault,
                }
            })?
        } else {
            author
        };

        tracing::debug!(
            commit = %commit.short_hash,
            author = %author,
            committer = %committer,
            "resolved"
        );

        commit.resolved_author_date = author;
        commit.resolved_commit_date = committer;
        previous = Some(Previous {
            orig_author_date: commit.orig_author_date,
            orig_commit_date: commit.orig_commit_date,
            resolved_author_date: author,
        });
    }

    Ok(())
}

#[derive(Clone, Copy)]
struct Previous {
    orig_author_date: DateTime<FixedOffset>,
    orig_commit_date: DateTime<FixedOffset>,
    resolved_author_date: DateTime<FixedOffset>,
}

/// What the preceding commit offers to `PREV` and bare shifts.
#[derive(Clone, Copy)]
struct Anchor {
    /// Original instant of the same column.
    original: DateTime<FixedOffset>,
    /// Resolved author instant.
    resolved_author: DateTime<FixedOffset>,
}

fn resolve_one<R: Rng + ?Sized>(
    raw: &str,
    original: DateTime<FixedOffset>,
    anchor: Option<Anchor>,
    now: DateTime<FixedOffset>,
    rng: &mut R,
) -> Result<DateTime<FixedOffset>, TokenFault> {
    match EditToken::parse(raw)? {
        EditToken::Unchanged => Ok(original),
        EditToken::Now => Ok(now),
        EditToken::Previous { shift } => {
            let anchor = anchor.ok_or(TokenFault::NoPrevious("PREV"))?;
            add(anchor.original, shift.unwrap_or(TimeDelta::zero()))
        }
        EditToken::BareShift(shift) => {
            let anchor = anchor.ok_or(TokenFault::NoPrevious("bare shift"))?;
            add(anchor.resolved_author, shift)
        }
        EditToken::Absolute { timestamp, shift } => {
            resolve_absolute(&timestamp, shift, original, rng)
        }
    }
}

/// Resolve a local wall-clock edit against the commit's true instant.
///
/// The edit is turned into a delta against what the user saw for the
/// original, and the delta is applied to the original. The original offset
/// therefore survives even though the user only edited local time.
fn resolve_absolute<R: Rng + ?Sized>(
    timestamp: &str,
    shift: Option<TimeDelta>,
    original: DateTime<FixedOffset>,
    rng: &mut R,
) -> Result<DateTime<FixedOffset>, TokenFault> {
    let expanded;
    let timestamp = if contains_rr(timestamp) {
        expanded = expand_rr(timestamp, rng)?;
        expanded.as_str()
    } else {
        timestamp
    };

    let mut desired = parse_local(timestamp)?;
    if let Some(shift) = shift {
        desired = desired
            .checked_add_signed(shift)
            .ok_or(TokenFault::OutOfRange)?;
    }

    let displayed = original.with_timezone(&Local).trunc_subsecs(0);
    add(original, desired - displayed)
}

fn expand_rr<R: Rng + ?Sized>(timestamp: &str, rng: &mut R) -> Result<String, RandomError> {
    let Some((date, time)) = timestamp.split_once(' ') else {
        return Err(RandomError::Layout(timestamp.to_string()));
    };
    if contains_rr(date) {
        return Err(RandomError::InDate(date.to_string()));
    }
    Ok(format!("{date} {}", resolve_rr(time.trim(), rng)?))
}

fn add(instant: DateTime<FixedOffset>, delta: TimeDelta) -> Result<DateTime<FixedOffset>, TokenFault> {
    instant
        .checked_add_signed(delta)
        .ok_or(TokenFault::OutOfRange)
}

/// Which timestamp column an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Author,
    Committer,
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateField::Author => f.write_str("author"),
            DateField::Committer => f.write_str("committer"),
        }
    }
}

/// A token that could not be resolved, with the commit it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("commit {hash}: {field} date: {fault}")]
pub struct ResolveError {
    pub hash: String,
    pub field: DateField,
    pub fault: TokenFault,
}

/// Why a single token failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenFault {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Random(#[from] RandomError),

    #[error("{0} on the first commit: no previous commit to refer to")]
    NoPrevious(&'static str),

    #[error("resulting timestamp is out of range")]
    OutOfRange,
}
