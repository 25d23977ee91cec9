//! Colour scales used by the charts and maps.

use serde::{Deserialize, Serialize};

use crate::theme::CssColor;

/// An ordered colour scale, indexed by rank or bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorScale(Vec<CssColor>);

impl ColorScale {
    pub fn new(colors: Vec<CssColor>) -> Self {
        ColorScale(colors)
    }

    fn from_builtin(colors: &[&'static str]) -> Self {
        ColorScale(colors.iter().copied().map(CssColor::builtin).collect())
    }

    /// Colour at a zero-based rank.
    pub fn get(&self, rank: usize) -> Option<&CssColor> {
        self.0.get(rank)
    }

    /// Colour of the equal-width bucket of `[min, max]` containing `value`.
    ///
    /// Values outside the range fall in the first or last bucket. Returns
    /// `None` for an empty scale or a NaN value.
    pub fn bucket(&self, value: f64, min: f64, max: f64) -> Option<&CssColor> {
        if self.0.is_empty() || value.is_nan() {
            return None;
        }
        let last = self.0.len() - 1;
        if max <= min {
            return self.0.first();
        }
        let t = (value - min) / (max - min);
        let index = (t * self.0.len() as f64).floor();
        let index = if index < 0.0 { 0 } else { (index as usize).min(last) };
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CssColor> {
        self.0.iter()
    }
}

impl Default for ColorScale {
    /// The ten-step red to blue diverging scale, one colour per decile.
    fn default() -> Self {
        ColorScale::from_builtin(&[
            "#67001f", "#b2182b", "#d6604d", "#f4a582", "#fddbc7", "#d1e5f0", "#92c5de",
            "#4393c3", "#2166ac", "#053061",
        ])
    }
}

/// Point colours for the scatter chart, one scale per highlighting mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterColors {
    pub quintiles: ColorScale,
    pub top20: ColorScale,
    pub bottom20: ColorScale,
    /// Rural/urban classification
    pub ruc: ColorScale,
}

impl Default for ScatterColors {
    fn default() -> Self {
        Self {
            quintiles: ColorScale::from_builtin(&[
                "#0571b0", "#85a0c2", "#d3d3d3", "#dc8175", "#ca0020",
            ]),
            top20: ColorScale::from_builtin(&[
                "#0571b0", "#d3d3d3", "#d3d3d3", "#d3d3d3", "#d3d3d3",
            ]),
            bottom20: ColorScale::from_builtin(&[
                "#d3d3d3", "#d3d3d3", "#d3d3d3", "#d3d3d3", "#ca0020",
            ]),
            ruc: ColorScale::from_builtin(&["#a8bd3a", "#206095", "#d3d3d3"]),
        }
    }
}

/// Every colour table used outside the themes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub colors: ColorScale,
    pub scatter_colors: ScatterColors,
    pub hi_color: CssColor,
    pub fill_color: CssColor,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: ColorScale::default(),
            scatter_colors: ScatterColors::default(),
            hi_color: CssColor::builtin("rgb(32, 96, 149)"),
            fill_color: CssColor::builtin("rgba(255, 192, 0, 0.65)"),
        }
    }
}

impl Palette {
    /// All colours of the palette, for validation.
    pub fn all_colors(&self) -> impl Iterator<Item = &CssColor> {
        let scatter = &self.scatter_colors;
        self.colors
            .iter()
            .chain(scatter.quintiles.iter())
            .chain(scatter.top20.iter())
            .chain(scatter.bottom20.iter())
            .chain(scatter.ruc.iter())
            .chain([&self.hi_color, &self.fill_color])
    }
}
