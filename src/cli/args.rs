//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, ValueHint};

use crate::config::Backend;

/// Build and reshape node trees from a line-oriented script
#[derive(Parser, Debug)]
#[command(name = "nodetree")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Turn debugging information on (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Linkage backend, overrides the configured one
    #[arg(short, long, value_enum)]
    pub backend: Option<Backend>,

    /// Local config file layered over the global one
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Print the effective settings as TOML and exit
    #[arg(long)]
    pub show_config: bool,

    /// Script to execute, `-` reads standard input
    #[arg(value_hint = ValueHint::FilePath, required_unless_present = "show_config")]
    pub script: Option<PathBuf>,
}
