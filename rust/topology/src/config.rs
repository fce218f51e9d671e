// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! World configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::style::StyleSets;

/// Default numeric tolerance for containment and reduction tests.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Settings for seeding a [`World`](crate::World).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// `[min, max]` per axis of the seed cuboid.
    pub bounds: [[f64; 2]; 3],
    /// Tokens attached to the eight seed corners.
    pub seed_style: StyleSets,
    /// Tolerance used by [`World::create_point`](crate::World::create_point).
    pub tolerance: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            bounds: [[0.0, 1.0]; 3],
            seed_style: StyleSets::default(),
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl WorldConfig {
    /// Config for the given bounds with default style and tolerance.
    pub fn with_bounds(bounds: [[f64; 2]; 3]) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    /// Parses a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the config to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Checks that every axis spans a non-empty finite range and the
    /// tolerance is a small non-negative number.
    pub fn validate(&self) -> Result<()> {
        for (axis, [lo, hi]) in ["x", "y", "z"].iter().zip(self.bounds) {
            if !lo.is_finite() || !hi.is_finite() || lo >= hi {
                return Err(Error::Config(format!(
                    "{axis} bounds must satisfy min < max, got [{lo}, {hi}]"
                )));
            }
        }
        if !(0.0..0.5).contains(&self.tolerance) {
            return Err(Error::Config(format!(
                "tolerance must lie in [0, 0.5), got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleToken;

    #[test]
    fn default_is_unit_cube() {
        let config = WorldConfig::default();
        assert_eq!(config.bounds, [[0.0, 1.0]; 3]);
        assert!(config.seed_style.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn from_json_fills_missing_fields() {
        let config = WorldConfig::from_json(r#"{ "bounds": [[-1, 1], [0, 2], [0, 3]] }"#).unwrap();
        assert_eq!(config.bounds, [[-1.0, 1.0], [0.0, 2.0], [0.0, 3.0]]);
        assert_eq!(config.tolerance, DEFAULT_TOLERANCE);
    }

    #[test]
    fn from_json_reads_style() {
        let config =
            WorldConfig::from_json(r#"{ "seed_style": { "point": [1], "face": [2, 3] } }"#)
                .unwrap();
        assert!(config.seed_style.point.contains(&StyleToken(1)));
        assert_eq!(config.seed_style.face.len(), 2);
        assert!(config.seed_style.line.is_empty());
    }

    #[test]
    fn json_roundtrip() {
        let mut config = WorldConfig::with_bounds([[0.0, 2.0], [0.0, 2.0], [0.0, 2.0]]);
        config.seed_style.line.insert(StyleToken(4));
        let parsed = WorldConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let config = WorldConfig::with_bounds([[0.0, 1.0], [1.0, 0.0], [0.0, 1.0]]);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn malformed_json_is_config_error() {
        assert!(matches!(
            WorldConfig::from_json("{ bounds"),
            Err(Error::Config(_))
        ));
    }
}
