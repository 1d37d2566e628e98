//! git-retime: rewrite commit timestamps with a small editing language.
//!
//! The commits after a base revision are listed in a todo file, one line per
//! commit. The user edits the dates (absolute, relative, `NOW`, `PREV`,
//! randomized `RR` fields) and optionally the subjects; the result is compiled
//! into an interactive-rebase script that amends each commit's dates.
//!
//! # Architecture
//!
//! - **Timestamp**: Parse edit tokens and resolve them to instants
//! - **Todo**: Generate, parse and validate the editable file
//! - **Compile**: Turn resolved commits into a rebase script
//! - **Git**: Read commits and run the rebase
//! - **Execute**: Drive interactive, shift and randomize runs

pub mod commit;
pub mod compile;
pub mod config;
pub mod execute;
pub mod git;
pub mod timestamp;
pub mod todo;

pub use commit::{CommitRange, CommitRecord, ResolvedCommit};
pub use config::Config;
pub use execute::{Mode, Options, TimeWindow, execute};
pub use git::Git;
