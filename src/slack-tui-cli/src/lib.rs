//! slack-tui command-line entry.
//!
//! - `args` - command-line parsing
//! - `logging` - optional log file setup

pub mod args;
pub mod logging;

pub use args::{Cli, LogLevel};
pub use logging::{LogGuard, init_logging};
