use tide_config::TideConfig;

use crate::cli::GlobalFlags;
use crate::output::output;

/// Print the effective configuration. Secrets are masked.
pub fn run(config: &TideConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut shown = config.clone();
    if !shown.database.auth_token.is_empty() {
        shown.database.auth_token = "********".into();
    }
    if let Some(db) = &flags.db {
        shown.database.path.clone_from(db);
    }
    output(&shown, flags.format)
}
