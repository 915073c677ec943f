//! CLI module for acadreq
//!
//! One-shot commands over a data directory:
//! - init: create the slots, seeding example data if configured
//! - login / logout / whoami: manage the persisted session principal
//! - list / show / dashboard / stats: read requests through the guard
//! - submit / status / comment / assign / attach: drive the lifecycle engine
//! - notifications: read and manage the principal's inbox
//! - can-access: ask the access guard about a navigation path

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{execute, init, run, Config};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
