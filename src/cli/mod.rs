//! Command line interface.
//!
//! Arguments are parsed by hand into a [`Command`]. Parsing only checks
//! shape; dates and window plans are resolved afterwards and fail with
//! [`ConfigError`](crate::error::ConfigError) before any backend call.

mod commands;
mod dates;
mod errors;
mod help;

pub use commands::{AnalyzeArgs, CombineArgs, Command, DEFAULT_COMBINED_OUTPUT, DEFAULT_DAYS};
pub use dates::{parse_labels, parse_start_date, DATE_FORMAT, DATE_TIME_FORMAT};
pub use errors::CommandParseError;
pub use help::help_text;
