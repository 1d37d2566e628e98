//! Timestamp expressions: shifts, `RR` markers, local time, and resolution.

mod format;
mod random;
mod resolve;
mod shift;
mod token;

pub use format::{DISPLAY_LAYOUT, FormatError, format_git, format_local, parse_local};
pub use random::{RandomError, contains_rr, resolve_rr};
pub use resolve::{DateField, ResolveError, TokenFault, resolve_all, resolve_all_with_rng};
pub use shift::{ShiftError, is_shift, parse_shift};
pub use token::{EditToken, TokenError};
