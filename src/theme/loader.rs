//! Theme loading functionality

use super::models::{Theme, Themes};
use color_eyre::Result;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ConfigPaths;

/// Load a theme by name from the user's themes directory, with fallback to the default theme
pub fn load_theme(theme_name: &str) -> Theme {
    let loaded = ConfigPaths::new().and_then(|paths| try_load_theme(&paths.themes_dir, theme_name));
    match loaded {
        Ok(theme) => {
            info!("Successfully loaded theme: {theme_name}");
            theme
        }
        Err(e) => {
            warn!("Failed to load theme '{theme_name}': {e}. Using default theme.");
            Theme::default()
        }
    }
}

/// Attempt to load a theme file, returning errors for handling
pub fn try_load_theme(theme_dir: &Path, theme_name: &str) -> Result<Theme> {
    let theme_path = get_theme_path(theme_dir, theme_name)?;

    debug!("Loading theme from: {}", theme_path.display());

    let content = fs::read_to_string(&theme_path)?;
    let theme: Theme = serde_yaml::from_str(&content)?;
    Ok(theme)
}

/// Get the path to a theme file
fn get_theme_path(theme_dir: &Path, theme_name: &str) -> Result<PathBuf> {
    let theme_file = format!("{theme_name}.yml");
    let theme_path = theme_dir.join(theme_file);

    if !theme_path.exists() {
        return Err(color_eyre::eyre::eyre!(
            "Theme file not found: {}",
            theme_path.display()
        ));
    }

    Ok(theme_path)
}

/// Load every `.yml` theme in `theme_dir`, keyed by file stem.
///
/// Malformed files are skipped with a warning. A missing directory yields an empty set.
pub fn load_themes_dir(theme_dir: &Path) -> Result<Themes> {
    let mut themes = Themes::empty();

    for name in list_available_themes(theme_dir)? {
        match try_load_theme(theme_dir, &name) {
            Ok(theme) => {
                debug!("Loaded theme file: {name}");
                themes.insert(name, theme);
            }
            Err(e) => warn!("Skipping theme '{name}': {e}"),
        }
    }

    Ok(themes)
}

/// List the names of the theme files in `theme_dir`, sorted
pub fn list_available_themes(theme_dir: &Path) -> Result<Vec<String>> {
    if !theme_dir.exists() {
        return Ok(vec![]);
    }

    let mut themes = Vec::new();

    for entry in fs::read_dir(theme_dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                themes.push(stem.to_string());
            }
        }
    }

    themes.sort();
    Ok(themes)
}
