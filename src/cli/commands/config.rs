//! Handlers for `godesk config *` subcommands.

use crate::cli::render::{render, render_settings};
use crate::cli::{ConfigCommands, OutputFormat};
use crate::config::manager::ConfigManager;
use crate::config::settings::SettingKey;
use crate::error::Error;
use crate::fs::FileSystem;

pub fn execute<F: FileSystem>(
    command: &ConfigCommands,
    manager: &ConfigManager<F>,
    format: OutputFormat,
) -> Result<(), Error> {
    match command {
        ConfigCommands::Show => {
            let config = manager.load_global_config()?;
            // Table output of a nested config is unreadable; TOML is what the file holds.
            let rendered = match format {
                OutputFormat::Table => toml::to_string_pretty(&config)
                    .map_err(|e| Error::config(format!("Failed to serialize config: {e}")))?,
                other => render(&config, other)?,
            };
            println!("# {}", manager.config_path().display());
            println!("{}", rendered.trim_end());
        }
        ConfigCommands::Get { key } => {
            let key: SettingKey = key.parse()?;
            println!("{}", manager.get_setting(key)?);
        }
        ConfigCommands::Set { key, value } => {
            let key: SettingKey = key.parse()?;
            let stored = manager.set_setting(key, value)?;
            eprintln!("Set {key} = {stored}");
        }
        ConfigCommands::Settings => {
            println!("{}", render_settings(&manager.list_settings()?, format)?);
        }
    }
    Ok(())
}
