use clap::ValueEnum;

/// Shared output mode across all commands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Raw,
    Text,
}

impl OutputFormat {
    /// Parse a configured default; unknown names fall back to JSON.
    #[must_use]
    pub fn from_config(name: &str) -> Self {
        Self::from_str(name, true).unwrap_or(Self::Json)
    }
}

/// Global flags available before or after subcommands.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub format: OutputFormat,
    pub db: Option<String>,
}
