//! Configuration inspection command

use clap::Subcommand;
use reposcore_core::config::{Settings, API_KEY_ENV};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration (credential redacted)
    Show,
}

pub fn handle(action: ConfigAction, settings: &Settings) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", toml::to_string_pretty(settings)?);
            println!(
                "# {}: {}",
                API_KEY_ENV,
                if settings.has_api_key() {
                    "set (live gateway)"
                } else {
                    "not set (disabled gateway)"
                }
            );
            Ok(())
        }
    }
}
