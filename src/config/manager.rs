use crate::config::models::GlobalConfig;
use crate::config::settings::{SettingInfo, SettingKey, SettingValue};
use crate::constants;
use crate::error::Error;
use crate::fs::{FileSystem, OsFileSystem};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ConfigManager<F: FileSystem> {
    fs: F,
    config_dir: PathBuf,
}

impl ConfigManager<OsFileSystem> {
    /// Creates a new `ConfigManager` with the default filesystem and config directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, Error> {
        let config_dir = get_config_dir()?;
        Ok(Self {
            fs: OsFileSystem,
            config_dir,
        })
    }
}

impl<F: FileSystem> ConfigManager<F> {
    pub const fn with_fs(fs: F, config_dir: PathBuf) -> Self {
        Self { fs, config_dir }
    }

    /// Get the configuration directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILENAME)
    }

    /// Loads the global configuration from `config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read or parsed.
    pub fn load_global_config(&self) -> Result<GlobalConfig, Error> {
        let config_path = self.config_path();
        if !self.fs.exists(&config_path) {
            debug!("no config at {}, using defaults", config_path.display());
            return Ok(GlobalConfig::default());
        }
        let content = self.fs.read_to_string(&config_path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Saves the global configuration to `config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized or written.
    pub fn save_global_config(&self, config: &GlobalConfig) -> Result<(), Error> {
        let config_path = self.config_path();

        self.fs.create_dir_all(&self.config_dir)?;

        let content = toml::to_string_pretty(config)
            .map_err(|e| Error::config(format!("Failed to serialize config: {e}")))?;

        self.fs.write_all(&config_path, content.as_bytes())?;
        Ok(())
    }

    /// Reads one setting.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub fn get_setting(&self, key: SettingKey) -> Result<SettingValue, Error> {
        let config = self.load_global_config()?;
        Ok(key.value_from_config(&config))
    }

    /// Validates `value` for `key` and persists it.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is invalid for the key, or the
    /// configuration cannot be loaded or saved.
    pub fn set_setting(&self, key: SettingKey, value: &str) -> Result<SettingValue, Error> {
        let parsed = SettingValue::parse_for_key(key, value)?;
        let mut config = self.load_global_config()?;
        key.apply_to_config(&mut config, parsed.clone())?;
        self.save_global_config(&config)?;
        Ok(parsed)
    }

    /// Every setting with its current value.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub fn list_settings(&self) -> Result<Vec<SettingInfo>, Error> {
        let config = self.load_global_config()?;
        Ok(SettingKey::ALL
            .iter()
            .map(|key| SettingInfo::new(*key, &key.value_from_config(&config)))
            .collect())
    }
}

/// Gets the configuration directory path.
///
/// `GODESK_CONFIG_DIR` wins when set (with `~` and `$VAR` expanded);
/// otherwise `~/.config/godesk`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined or the
/// override cannot be expanded.
pub fn get_config_dir() -> Result<PathBuf, Error> {
    if let Ok(dir) = std::env::var(constants::ENV_GODESK_CONFIG_DIR) {
        let expanded = shellexpand::full(&dir).map_err(|e| {
            Error::config(format!(
                "Cannot expand {}='{dir}': {e}",
                constants::ENV_GODESK_CONFIG_DIR
            ))
        })?;
        return Ok(PathBuf::from(expanded.as_ref()));
    }
    let home_dir =
        dirs::home_dir().ok_or_else(|| Error::config("Could not determine home directory"))?;
    Ok(home_dir.join(".config").join("godesk"))
}
