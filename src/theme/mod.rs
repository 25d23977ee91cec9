//! Colour themes
//!
//! Themes assign colours to the semantic roles `text`, `muted`, `pale` and
//! `background`. Built-in themes can be extended with YAML files in the
//! user's configuration directory and applied to any [`StyleSink`].

pub mod apply;
pub mod loader;
pub mod models;
pub mod parser;

#[cfg(test)]
mod tests;

pub use apply::{set_colors, CssVariables, StyleSink};
pub use loader::load_theme;
pub use models::{Theme, Themes};
pub use parser::{parse_color, ColorParseError, CssColor, Rgba};
