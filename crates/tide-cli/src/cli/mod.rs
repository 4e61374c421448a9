use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `tide` binary.
#[derive(Debug, Parser)]
#[command(name = "tide", version, about = "Tide - shared task timeline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw, text (defaults to general.default_format)
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Local database file, overriding database.* configuration
    #[arg(long, global = true)]
    pub db: Option<String>,
}

impl Cli {
    /// Global flags for command handlers, with the configured default format
    /// filled in.
    #[must_use]
    pub fn global_flags(&self, default_format: &str) -> GlobalFlags {
        GlobalFlags {
            format: self
                .format
                .unwrap_or_else(|| OutputFormat::from_config(default_format)),
            db: self.db.clone(),
        }
    }
}
