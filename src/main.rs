use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::TimeDelta;
use clap::Parser;
use retime::{Config, Git, Mode, Options, TimeWindow};
use tracing::Level;

#[derive(Parser)]
#[command(name = "git-retime")]
#[command(about = "Rewrite commit timestamps after a base revision")]
struct Cli {
    /// Base revision; commits after it (up to HEAD) are retimed
    revision: String,

    /// Shift every commit's dates by an offset such as +2h or -1d30m
    #[arg(long, value_name = "OFFSET", allow_hyphen_values = true, value_parser = parse_shift)]
    shift: Option<TimeDelta>,

    /// Give every commit a random time of day within HH:MM-HH:MM
    #[arg(long, value_name = "WINDOW", conflicts_with = "shift")]
    randomize: Option<TimeWindow>,

    /// Do not sort randomized times within a day
    #[arg(long, requires = "randomize")]
    randomize_allow_paradox: bool,

    /// Edit author and committer dates separately
    #[arg(long)]
    split_dates: bool,

    /// Interactive mode (the default; accepted for symmetry with rebase -i)
    #[arg(short = 'i', long, conflicts_with_all = ["shift", "randomize"])]
    interactive: bool,

    /// Print the rebase script instead of running it
    #[arg(long)]
    dry_run: bool,

    /// Config file (default: <git-dir>/retime.toml if present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_shift(s: &str) -> Result<TimeDelta, retime::timestamp::ShiftError> {
    retime::timestamp::parse_shift(s)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let git = Git::discover(Path::new(".")).context("failed to open repository")?;
    let git_dir = git.git_dir()?;
    let config = Config::load(cli.config.as_deref(), &git_dir)?;

    let mode = match (cli.shift, cli.randomize) {
        (Some(shift), _) => Mode::Shift(shift),
        (None, Some(window)) => Mode::Randomize(window),
        (None, None) => {
            tracing::debug!(explicit = cli.interactive, "interactive mode");
            Mode::Interactive
        }
    };

    let options = Options {
        revision: cli.revision,
        mode,
        split_dates: cli.split_dates || config.split_dates,
        allow_paradox: cli.randomize_allow_paradox || config.randomize_allow_paradox,
        dry_run: cli.dry_run,
        editor: config.editor,
    };

    retime::execute(&git, &options)?;
    Ok(())
}
