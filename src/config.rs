//! Configuration file handling for loanbook.
//!
//! The configuration file is stored at `$LOANBOOK_HOME/config.json` and contains the location of
//! the data file, backup settings, the address the HTTP server binds to and the display
//! preferences of the user.

use crate::backup::Backup;
use crate::store::JsonStore;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "loanbook";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";
const DATA_JSON: &str = "data.json";
const DEFAULT_BIND: &str = "127.0.0.1:4000";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$LOANBOOK_HOME` and from there it loads `$LOANBOOK_HOME/config.json`. It provides
/// paths to the other items that are expected in a certain location within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    data_path: PathBuf,
}

impl Config {
    /// Creates the home directory, its backups subdirectory, an initial `config.json` and, unless
    /// one already exists, an empty data file.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the home directory, e.g. `$HOME/loanbook`
    /// - `data_file` - Where transactions are stored. Relative paths are resolved against `dir`.
    ///   Pointing this at an existing `data.json` adopts it. Defaults to `data.json`.
    ///
    /// # Errors
    /// - Returns an error if the directory has already been initialized.
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>, data_file: Option<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the loanbook home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "The home directory has already been initialized, found '{}'",
                config_path.display()
            )
        }

        let backups_dir = root.join(BACKUPS);
        utils::make_dir(&backups_dir).await?;

        let config_file = ConfigFile {
            data_file: data_file.unwrap_or_else(|| PathBuf::from(DATA_JSON)),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        let data_path = resolve(&root, &config_file.data_file);
        if !data_path.exists() {
            utils::write(&data_path, "[]")
                .await
                .context("Unable to create the data file")?;
        }

        Ok(Self {
            root,
            backups: backups_dir,
            config_path,
            config_file,
            data_path,
        })
    }

    /// This will
    /// - validate that `loanbook_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the backups directory exists
    /// - return the loaded configuration object
    pub async fn load(loanbook_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = loanbook_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The loanbook home directory is missing, run 'loanbook init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let data_path = resolve(&root, &config_file.data_file);

        let config = Self {
            backups: root.join(BACKUPS),
            root,
            config_path,
            config_file,
            data_path,
        };
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    /// The resolved, absolute path of the data file.
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// The socket address the HTTP server binds to unless overridden on the command line.
    pub fn bind(&self) -> &str {
        &self.config_file.bind
    }

    pub fn preferences(&self) -> &Preferences {
        &self.config_file.preferences
    }

    /// Replaces the stored preferences and writes them to `config.json`.
    pub async fn set_preferences(&mut self, preferences: Preferences) -> Result<()> {
        let mut updated = self.config_file.clone();
        updated.preferences = preferences;
        updated.save(&self.config_path).await?;
        self.config_file = updated;
        Ok(())
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }

    /// Opens the JSON store described by this configuration.
    pub fn store(&self) -> JsonStore {
        JsonStore::new(&self.data_path).with_backup(self.backup())
    }
}

/// Returns `p` unchanged if it is absolute, otherwise resolves it against `root`.
fn resolve(root: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        return p.to_path_buf();
    }
    root.join(p)
}

/// Color scheme of a presentation layer.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

serde_plain::derive_display_from_serialize!(Theme);
serde_plain::derive_fromstr_from_deserialize!(Theme);

/// Display settings that a presentation layer reads at startup instead of keeping them in ambient
/// storage of its own.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Printed in front of amounts, e.g. `₹1,000.00`.
    pub currency_symbol: String,
    pub theme: Theme,
    /// A language tag such as `en` or `hi`.
    pub language: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
            theme: Theme::default(),
            language: "en".to_string(),
        }
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "loanbook",
///   "config_version": 1,
///   "data_file": "data.json",
///   "backup_copies": 5,
///   "bind": "127.0.0.1:4000",
///   "preferences": {
///     "currency_symbol": "₹",
///     "theme": "dark",
///     "language": "en"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "loanbook"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Path to the data file, relative to the home directory or absolute
    data_file: PathBuf,

    /// Number of backup copies to keep
    backup_copies: u32,

    /// Socket address for `loanbook serve`
    #[serde(default = "default_bind")]
    bind: String,

    #[serde(default)]
    preferences: Preferences,
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            data_file: PathBuf::from(DATA_JSON),
            backup_copies: BACKUP_COPIES,
            bind: default_bind(),
            preferences: Preferences::default(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .await
            .with_context(|| format!("Failed to load config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
