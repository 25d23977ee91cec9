//! Synthetic decile profiles used as reference shapes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Allowed deviation of a profile's total from 100.
pub const TOTAL_TOLERANCE: f64 = 1e-6;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DistributionError {
    #[error("distribution '{name}' sums to {total}, expected 100")]
    BadTotal { name: String, total: f64 },
    #[error("distribution '{name}' has a negative or non-finite share")]
    InvalidShare { name: String },
}

/// A named share of population per decile, from most to least deprived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub name: String,
    pub short: String,
    pub deciles: [f64; 10],
}

impl Distribution {
    fn new(name: &str, short: &str, deciles: [f64; 10]) -> Self {
        Self {
            name: name.to_string(),
            short: short.to_string(),
            deciles,
        }
    }

    pub fn total(&self) -> f64 {
        self.deciles.iter().sum()
    }

    pub fn validate(&self) -> Result<(), DistributionError> {
        if self.deciles.iter().any(|d| !d.is_finite() || *d < 0.0) {
            return Err(DistributionError::InvalidShare {
                name: self.name.clone(),
            });
        }
        let total = self.total();
        if (total - 100.0).abs() > TOTAL_TOLERANCE {
            return Err(DistributionError::BadTotal {
                name: self.name.clone(),
                total,
            });
        }
        Ok(())
    }
}

/// Distribution presets keyed by identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Distributions(BTreeMap<String, Distribution>);

impl Distributions {
    pub fn get(&self, key: &str) -> Option<&Distribution> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Distribution)> {
        self.0.iter().map(|(k, d)| (k.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn validate(&self) -> Result<(), DistributionError> {
        self.0.values().try_for_each(Distribution::validate)
    }
}

impl Default for Distributions {
    fn default() -> Self {
        let presets = [
            (
                "left",
                Distribution::new(
                    "More income deprived profile",
                    "More deprived",
                    [20.0, 17.8, 15.6, 13.3, 11.1, 8.9, 6.7, 4.4, 2.2, 0.0],
                ),
            ),
            (
                "right",
                Distribution::new(
                    "Less income deprived profile",
                    "Less deprived",
                    [0.0, 2.2, 4.4, 6.7, 8.9, 11.1, 13.3, 15.6, 17.8, 20.0],
                ),
            ),
            (
                "flat",
                Distribution::new("Flat income deprivation profile", "Flat", [10.0; 10]),
            ),
            (
                "nshape",
                Distribution::new(
                    "'n'-shaped income deprivation profile",
                    "'n'-shaped",
                    [5.7, 7.1, 10.0, 12.9, 14.3, 14.3, 12.9, 10.0, 7.1, 5.7],
                ),
            ),
        ];
        Distributions(
            presets
                .into_iter()
                .map(|(key, d)| (key.to_string(), d))
                .collect(),
        )
    }
}
