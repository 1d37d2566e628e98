//! Syntax cheat sheet appended to the todo file.

/// The commented-out help block for the bottom of the todo file.
#[must_use]
pub fn help_block(split_dates: bool) -> String {
    let format = if split_dates {
        "# Format: <hash>  <author-date>  <committer-date>  <message>\n"
    } else {
        "# Format: <hash>  <timestamp>  <message>\n"
    };

    let mut block = String::from("# --- Syntax Reference ---\n#\n");
    block.push_str(format);
    block.push_str(include_str!("help.txt"));
    block
}
