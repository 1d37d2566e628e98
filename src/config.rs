//! Optional per-repository settings.
//!
//! Read from `--config <path>` or, when that is not given,
//! `<git-dir>/retime.toml` if it exists:
//!
//! ```toml
//! split_dates = true
//! randomize_allow_paradox = false
//! editor = "code --wait"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name looked up inside the git directory.
pub const DEFAULT_FILE_NAME: &str = "retime.toml";

/// Settings that can also be given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Edit author and committer dates independently.
    pub split_dates: bool,

    /// Keep randomized times unsorted within a day.
    pub randomize_allow_paradox: bool,

    /// Editor command; overrides git's own choice.
    pub editor: Option<String>,
}

impl Config {
    /// Parse a config from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load `explicit` if given (it must exist), otherwise the default file
    /// in `git_dir` if present, otherwise defaults.
    pub fn load(explicit: Option<&Path>, git_dir: &Path) -> Result<Self, Error> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = git_dir.join(DEFAULT_FILE_NAME);
                if !path.is_file() {
                    return Ok(Self::default());
                }
                path
            }
        };

        tracing::debug!(path = %path.display(), "loading config");
        let content = std::fs::read_to_string(&path).map_err(|source| Error::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| Error::Parse { path, source })
    }
}

/// Errors from loading the config file.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config file '{}'", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{}'", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
