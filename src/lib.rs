//! Configuration tables and data helpers for an income deprivation explorer.
//!
//! The crate carries the explorer's colour themes, dataset locators, colour
//! scales and reference decile profiles, along with helpers to apply a theme,
//! load CSV datasets with type inference, decode TopoJSON boundaries into
//! GeoJSON features and format ordinal labels.

pub mod config;
pub mod datasets;
pub mod distributions;
pub mod fetch;
pub mod format;
pub mod logger;
pub mod palette;
pub mod theme;

pub use config::AppConfig;
pub use fetch::{get_data, get_topo, FetchError, Fetcher};
pub use format::{ordinal, suffixer};
pub use theme::set_colors;
