//! Explorer configuration: built-in tables, optionally overridden from YAML.

use color_eyre::eyre::{eyre, Result, WrapErr};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::datasets::{BoundarySource, DatasetUrls, TileSource};
use crate::distributions::Distributions;
use crate::fetch::FetchConfig;
use crate::palette::Palette;
use crate::theme::{loader, Themes};

const FILE_NAME: &str = "config.yml";
const CONFIG_DIR: &str = ".config";
const APP_CONFIG_DIR: &str = "imd-explorer";
const THEMES_DIR: &str = "themes";

pub struct ConfigPaths {
    pub config_file_path: PathBuf,
    pub themes_dir: PathBuf,
}

impl ConfigPaths {
    /// Paths under `~/.config/imd-explorer`. Nothing is created.
    pub fn new() -> Result<ConfigPaths> {
        match dirs::home_dir() {
            Some(home) => Ok(ConfigPaths::in_dir(
                &Path::new(&home).join(CONFIG_DIR).join(APP_CONFIG_DIR),
            )),
            None => Err(eyre!("No $HOME directory found for config")),
        }
    }

    /// Paths under an explicit application config directory.
    pub fn in_dir(app_config_dir: &Path) -> ConfigPaths {
        ConfigPaths {
            config_file_path: app_config_dir.join(FILE_NAME),
            themes_dir: app_config_dir.join(THEMES_DIR),
        }
    }
}

/// Every table the explorer reads at start-up.
///
/// Fields absent from the YAML file keep their built-in values. Themes from
/// the file are merged over the built-in themes rather than replacing them.
#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub themes: Themes,
    pub dataurl: DatasetUrls,
    pub lsoa_bldg: TileSource,
    pub lad_bounds: BoundarySource,
    #[serde(flatten)]
    pub palette: Palette,
    pub distributions: Distributions,
    pub fetch: FetchConfig,
}

impl AppConfig {
    /// Parses a YAML document, merging its themes over the built-ins.
    pub fn from_yaml(content: &str) -> Result<AppConfig> {
        let mut config: AppConfig = serde_yaml::from_str(content)?;
        let mut themes = Themes::default();
        themes.merge(config.themes);
        config.themes = themes;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, or the default config file location when `None`.
    ///
    /// A missing file yields the built-in configuration. Theme files from the
    /// themes directory next to the default config file are merged in too.
    pub fn load(path: Option<&Path>) -> Result<AppConfig> {
        match ConfigPaths::new() {
            Ok(paths) => AppConfig::load_from(&paths, path),
            Err(_) => match path {
                Some(path) => AppConfig::load_file(path),
                None => {
                    debug!("No home directory, using built-in config");
                    Ok(AppConfig::default())
                }
            },
        }
    }

    /// Like [`AppConfig::load`], with the default locations taken from `paths`.
    pub fn load_from(paths: &ConfigPaths, path: Option<&Path>) -> Result<AppConfig> {
        let mut config = match path {
            Some(path) => AppConfig::load_file(path)?,
            None if paths.config_file_path.exists() => {
                AppConfig::load_file(&paths.config_file_path)?
            }
            None => {
                debug!("No config file at {}", paths.config_file_path.display());
                AppConfig::default()
            }
        };

        let extra = loader::load_themes_dir(&paths.themes_dir)?;
        if !extra.is_empty() {
            info!("Loaded {} theme file(s)", extra.len());
            config.themes.merge(extra);
        }

        Ok(config)
    }

    fn load_file(path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            return Err(eyre!("Config file not found: {}", path.display()));
        }
        debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(path)?;
        AppConfig::from_yaml(&content)
            .wrap_err_with(|| format!("invalid config {}", path.display()))
    }

    /// Like [`AppConfig::load`], falling back to the built-in configuration on error.
    pub fn load_or_default(path: Option<&Path>) -> AppConfig {
        match AppConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load config: {e:#}. Using built-in config.");
                AppConfig::default()
            }
        }
    }

    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.distributions.validate()?;
        if self.palette.colors.is_empty() {
            return Err(eyre!("colour scale 'colors' is empty"));
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
