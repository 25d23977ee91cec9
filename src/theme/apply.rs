//! Applying a theme to a presentation layer

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

use log::{debug, warn};

use super::models::Themes;

/// A presentation layer that accepts named style variables.
pub trait StyleSink {
    fn set_property(&mut self, name: &str, value: &str);
}

impl StyleSink for HashMap<String, String> {
    fn set_property(&mut self, name: &str, value: &str) {
        self.insert(name.to_string(), value.to_string());
    }
}

impl StyleSink for BTreeMap<String, String> {
    fn set_property(&mut self, name: &str, value: &str) {
        self.insert(name.to_string(), value.to_string());
    }
}

/// CSS custom properties, kept in the order they were first set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CssVariables {
    vars: Vec<(String, String)>,
}

impl CssVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Renders a rule block declaring every variable as `--name: value;`.
    pub fn to_css(&self, selector: &str) -> String {
        let mut css = format!("{selector} {{\n");
        for (name, value) in self.iter() {
            // writing to a String cannot fail
            let _ = writeln!(css, "  --{name}: {value};");
        }
        css.push('}');
        css
    }
}

impl StyleSink for CssVariables {
    fn set_property(&mut self, name: &str, value: &str) {
        match self.vars.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.vars.push((name.to_string(), value.to_string())),
        }
    }
}

/// Sets one variable per colour role of the named theme.
///
/// An unknown theme name sets nothing.
pub fn set_colors<S: StyleSink + ?Sized>(themes: &Themes, theme: &str, sink: &mut S) {
    let Some(selected) = themes.get(theme) else {
        warn!("Unknown theme '{theme}', no colors applied");
        return;
    };

    debug!("Applying theme '{theme}'");
    for (role, color) in selected.entries() {
        sink.set_property(role, color.as_str());
    }
}
