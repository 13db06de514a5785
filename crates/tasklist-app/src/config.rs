use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use tasklist_core::Filter;
use time::format_description;

const APP_DIR: &str = "tasklist";
const CONFIG_FILE: &str = "config.toml";
const DEFAULT_DATE_FORMAT: &str = "[day]/[month]/[year]";

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "TASKLIST_DATA_DIR";

/// Top-level configuration loaded from `config.toml`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Where task data is kept.
    #[serde(default)]
    pub storage: StorageConfig,
    /// How tasks are listed and confirmed.
    #[serde(default)]
    pub view: ViewConfig,
}

impl AppConfig {
    /// Load configuration from `explicit` if given, else from the per-user config
    /// directory, else fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                bail!("config file {} does not exist", path.display());
            }
            return Self::from_path(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a known file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Parse and validate configuration text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.view.ensure_valid_date_format()
    }
}

/// Location of the per-user config file, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// Where task data is kept.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default)]
    data_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Configuration pinned to an explicit directory.
    pub fn with_data_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(dir.into()),
        }
    }

    /// Configured directory, if any.
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Resolve the data directory: `TASKLIST_DATA_DIR`, then the config value,
    /// then the platform data directory.
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        self.resolve_data_dir_with(std::env::var_os(DATA_DIR_ENV))
    }

    fn resolve_data_dir_with(&self, env_override: Option<OsString>) -> Result<PathBuf> {
        if let Some(dir) = env_override.filter(|value| !value.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| anyhow!("failed to resolve a data directory; set {DATA_DIR_ENV}"))
    }
}

/// Presentation options.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewConfig {
    #[serde(default)]
    default_filter: Filter,
    #[serde(default = "default_confirm")]
    confirm_destructive: bool,
    #[serde(default = "default_date_format")]
    date_format: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_filter: Filter::default(),
            confirm_destructive: default_confirm(),
            date_format: default_date_format(),
        }
    }
}

const fn default_confirm() -> bool {
    true
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_owned()
}

impl ViewConfig {
    /// Filter selected when a session starts.
    pub const fn default_filter(&self) -> Filter {
        self.default_filter
    }

    /// Whether deletions ask for confirmation first.
    pub const fn confirm_destructive(&self) -> bool {
        self.confirm_destructive
    }

    /// `time` format description used for creation dates.
    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    fn ensure_valid_date_format(&self) -> Result<()> {
        if self.date_format.trim().is_empty() {
            bail!("view.date_format must not be empty");
        }
        format_description::parse_owned::<2>(&self.date_format)
            .map(|_| ())
            .map_err(|err| anyhow!("view.date_format '{}' is invalid: {err}", self.date_format))
    }
}
