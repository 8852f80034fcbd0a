//! CLI layer: argument parsing, script execution and command dispatch

pub mod args;
pub mod commands;
pub mod error;
pub mod output;
pub mod script;

pub use args::Cli;
pub use error::{CliError, CliResult};
