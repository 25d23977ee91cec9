//! Locations of the datasets read by the explorer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tabular datasets available to the explorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    /// Local authority districts (2019 boundaries)
    Lad,
    /// Lower layer super output areas (2011 boundaries)
    Lsoa,
}

impl Dataset {
    pub fn name(self) -> &'static str {
        match self {
            Dataset::Lad => "lad",
            Dataset::Lsoa => "lsoa",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dataset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lad" => Ok(Dataset::Lad),
            "lsoa" => Ok(Dataset::Lsoa),
            other => Err(format!("unknown dataset '{other}'")),
        }
    }
}

/// Locators of the CSV datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetUrls {
    pub lad: String,
    pub lsoa: String,
}

impl DatasetUrls {
    pub fn get(&self, dataset: Dataset) -> &str {
        match dataset {
            Dataset::Lad => &self.lad,
            Dataset::Lsoa => &self.lsoa,
        }
    }
}

impl Default for DatasetUrls {
    fn default() -> Self {
        Self {
            lad: "./data/imd-lad19.csv".to_string(),
            lsoa: "./data/imd-lsoa11.csv".to_string(),
        }
    }
}

/// A vector tile layer addressed by a `{z}/{x}/{y}` URL template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSource {
    pub url: String,
    pub layer: String,
    /// Feature attribute holding the area code.
    pub code: String,
}

impl TileSource {
    /// The building footprints tiles, keyed by LSOA code.
    pub fn buildings() -> Self {
        Self {
            url: "https://cdn.ons.gov.uk/maptiles/buildings/v1/{z}/{x}/{y}.pbf".to_string(),
            layer: "buildings".to_string(),
            code: "lsoa11cd".to_string(),
        }
    }

    /// URL of a single tile.
    pub fn tile_url(&self, z: u8, x: u32, y: u32) -> String {
        self.url
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

impl Default for TileSource {
    fn default() -> Self {
        TileSource::buildings()
    }
}

/// A boundary topology with the attributes holding area code and name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundarySource {
    pub url: String,
    pub layer: String,
    pub code: String,
    pub name: String,
}

impl BoundarySource {
    /// Local authority district boundaries for England and Wales.
    pub fn local_authorities() -> Self {
        Self {
            url: "./lib/geogLA2019EW.json".to_string(),
            layer: "la2019EW".to_string(),
            code: "AREACD".to_string(),
            name: "AREANM".to_string(),
        }
    }
}

impl Default for BoundarySource {
    fn default() -> Self {
        BoundarySource::local_authorities()
    }
}
