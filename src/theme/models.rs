//! Theme data models

use super::parser::CssColor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Semantic colour roles of a theme.
///
/// Every theme carries exactly these four roles; fields missing from a theme
/// file fall back to the `light` theme's values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_text")]
    pub text: CssColor,
    #[serde(default = "default_muted")]
    pub muted: CssColor,
    #[serde(default = "default_pale")]
    pub pale: CssColor,
    #[serde(default = "default_background")]
    pub background: CssColor,
}

impl Theme {
    /// Role names, in the order they are applied.
    pub const KEYS: [&'static str; 4] = ["text", "muted", "pale", "background"];

    /// Role name and colour pairs, in [`Theme::KEYS`] order.
    pub fn entries(&self) -> [(&'static str, &CssColor); 4] {
        [
            ("text", &self.text),
            ("muted", &self.muted),
            ("pale", &self.pale),
            ("background", &self.background),
        ]
    }

    pub fn light() -> Self {
        Self::default()
    }

    pub fn dark() -> Self {
        Self {
            text: CssColor::builtin("#fff"),
            muted: CssColor::builtin("#bbb"),
            pale: CssColor::builtin("#333"),
            background: CssColor::builtin("#222"),
        }
    }

    pub fn lightblue() -> Self {
        Self {
            text: CssColor::builtin("#206095"),
            muted: CssColor::builtin("#707070"),
            pale: CssColor::builtin("#f0f0f0"),
            background: CssColor::builtin("rgb(188, 207, 222)"),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            text: default_text(),
            muted: default_muted(),
            pale: default_pale(),
            background: default_background(),
        }
    }
}

fn default_text() -> CssColor { CssColor::builtin("#222") }
fn default_muted() -> CssColor { CssColor::builtin("#707070") }
fn default_pale() -> CssColor { CssColor::builtin("#f0f0f0") }
fn default_background() -> CssColor { CssColor::builtin("#fff") }

/// Themes keyed by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Themes(BTreeMap<String, Theme>);

impl Themes {
    /// An empty set, without the built-in themes.
    pub fn empty() -> Self {
        Themes(BTreeMap::new())
    }

    pub fn get(&self, name: &str) -> Option<&Theme> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Adds or replaces a theme, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, theme: Theme) -> Option<Theme> {
        self.0.insert(name.into(), theme)
    }

    /// Overlays `other` on top of `self`: same-named themes are replaced.
    pub fn merge(&mut self, other: Themes) {
        self.0.extend(other.0);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Theme)> {
        self.0.iter().map(|(name, theme)| (name.as_str(), theme))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Themes {
    fn default() -> Self {
        let mut themes = Themes::empty();
        themes.insert("light", Theme::light());
        themes.insert("dark", Theme::dark());
        themes.insert("lightblue", Theme::lightblue());
        themes
    }
}

impl FromIterator<(String, Theme)> for Themes {
    fn from_iter<I: IntoIterator<Item = (String, Theme)>>(iter: I) -> Self {
        Themes(iter.into_iter().collect())
    }
}
