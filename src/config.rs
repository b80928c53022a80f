//! Tuning configuration.
//!
//! Every knob has a default matching [`crate::consts`]. Values can be
//! overridden from `FLOORSIGHT_*` environment variables or loaded from JSON
//! alongside a scene.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::{
    ARC_STEP_DEG, COLLISION_DAMPING, DEFAULT_FLOOR_EXTENT, DEFAULT_GRID_SIZE, DEFAULT_UNIT_SIZE, MIN_STEP,
    SHRINK_INSET, TOKEN_HALO_RATIO,
};
use crate::units::UnitScale;

/// Error returned by [`Config::from_env`] and [`Config::validate`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable is not a number.
    #[error("{var} is not a number: {value:?}")]
    Parse { var: String, value: String },
    /// A setting lies outside its accepted range.
    #[error("{name} out of range: {value}")]
    OutOfRange { name: &'static str, value: f64 },
}

/// Movement collision tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Fraction of the distance to a wall a blocked move may cover.
    pub damping: f64,
    /// Resolved moves shorter than this snap to zero.
    pub min_step: f64,
    /// Fraction by which outline points are pulled toward the center when shrinking.
    pub shrink_inset: f64,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self { damping: COLLISION_DAMPING, min_step: MIN_STEP, shrink_inset: SHRINK_INSET }
    }
}

/// Light clipping tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Largest angular step in degrees between arc samples.
    pub arc_step_deg: f64,
    /// Token halo radius as a fraction of the token's width.
    pub token_halo_ratio: f64,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self { arc_step_deg: ARC_STEP_DEG, token_halo_ratio: TOKEN_HALO_RATIO }
    }
}

/// Complete configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub collision: CollisionConfig,
    pub lighting: LightingConfig,
    pub units: UnitScale,
    /// Half-width of floors created without explicit bounds.
    pub floor_extent: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collision: CollisionConfig::default(),
            lighting: LightingConfig::default(),
            units: UnitScale { unit_size: DEFAULT_UNIT_SIZE, grid_size: DEFAULT_GRID_SIZE },
            floor_extent: DEFAULT_FLOOR_EXTENT,
        }
    }
}

impl Config {
    /// Defaults overridden by environment variables.
    ///
    /// - `FLOORSIGHT_COLLISION_DAMPING`
    /// - `FLOORSIGHT_MIN_STEP`
    /// - `FLOORSIGHT_SHRINK_INSET`
    /// - `FLOORSIGHT_ARC_STEP_DEG`
    /// - `FLOORSIGHT_TOKEN_HALO_RATIO`
    /// - `FLOORSIGHT_UNIT_SIZE`
    /// - `FLOORSIGHT_GRID_SIZE`
    /// - `FLOORSIGHT_FLOOR_EXTENT`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for non-numeric values and
    /// [`ConfigError::OutOfRange`] when the result fails [`Config::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| match std::env::var(var) {
            Ok(value) => Some(value),
            Err(_) => None,
        })
    }

    /// Defaults overridden by whatever `lookup` returns for each variable.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let overrides: [(&str, &mut f64); 8] = [
            ("FLOORSIGHT_COLLISION_DAMPING", &mut config.collision.damping),
            ("FLOORSIGHT_MIN_STEP", &mut config.collision.min_step),
            ("FLOORSIGHT_SHRINK_INSET", &mut config.collision.shrink_inset),
            ("FLOORSIGHT_ARC_STEP_DEG", &mut config.lighting.arc_step_deg),
            ("FLOORSIGHT_TOKEN_HALO_RATIO", &mut config.lighting.token_halo_ratio),
            ("FLOORSIGHT_UNIT_SIZE", &mut config.units.unit_size),
            ("FLOORSIGHT_GRID_SIZE", &mut config.units.grid_size),
            ("FLOORSIGHT_FLOOR_EXTENT", &mut config.floor_extent),
        ];
        for (var, slot) in overrides {
            let Some(raw) = lookup(var) else {
                continue;
            };
            *slot = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Parse { var: var.to_string(), value: raw.clone() })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Check every setting is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] naming the first bad setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks: [(&'static str, f64, bool); 8] = [
            ("collision.damping", self.collision.damping, self.collision.damping > 0.0 && self.collision.damping <= 1.0),
            ("collision.min_step", self.collision.min_step, self.collision.min_step >= 0.0),
            (
                "collision.shrink_inset",
                self.collision.shrink_inset,
                (0.0..1.0).contains(&self.collision.shrink_inset),
            ),
            ("lighting.arc_step_deg", self.lighting.arc_step_deg, self.lighting.arc_step_deg > 0.0),
            ("lighting.token_halo_ratio", self.lighting.token_halo_ratio, self.lighting.token_halo_ratio >= 0.0),
            ("units.unit_size", self.units.unit_size, self.units.unit_size > 0.0),
            ("units.grid_size", self.units.grid_size, self.units.grid_size > 0.0),
            ("floor_extent", self.floor_extent, self.floor_extent > 0.0 && self.floor_extent.is_finite()),
        ];
        for (name, value, ok) in checks {
            if !ok {
                return Err(ConfigError::OutOfRange { name, value });
            }
        }
        Ok(())
    }
}
