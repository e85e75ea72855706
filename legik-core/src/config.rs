// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

use std::path::Path;

use serde::Deserialize;

use crate::algorithm::{IterativeSolver, ParallelLeg, EFFORT_CEILING, LERP_STEP};
use crate::chain::{Joint, JointChain};

#[derive(Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    Io(std::io::Error),
    /// Configuration file is not valid.
    Parse(toml::de::Error),
    /// Configuration value out of range.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read configuration: {}", e),
            ConfigError::Parse(e) => write!(f, "invalid configuration: {}", e),
            ConfigError::Invalid(reason) => write!(f, "invalid configuration value: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Read a TOML configuration file.
pub fn from_file<T: serde::de::DeserializeOwned>(
    path: impl AsRef<Path>,
) -> Result<T, ConfigError> {
    let contents = std::fs::read_to_string(path)?;

    from_str(&contents)
}

/// Parse a TOML configuration.
pub fn from_str<T: serde::de::DeserializeOwned>(contents: &str) -> Result<T, ConfigError> {
    Ok(toml::from_str(contents)?)
}

/// Leg linkage configuration.
///
/// Angles are in degrees, lengths in the unit of the grid.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LegConfig {
    /// Upper and lower link radius.
    pub radii: [f32; 2],
    /// Effector offset from the hip.
    pub offset: [f32; 2],
    /// Upper and lower joint bounds.
    pub bounds: [[f32; 2]; 2],
}

impl Default for LegConfig {
    fn default() -> Self {
        Self {
            radii: [30.0, 30.0],
            offset: [-2.747, -24.96],
            bounds: [[-60.0, 25.0], [-55.0, 55.0]],
        }
    }
}

impl LegConfig {
    /// Joint chain of the leg.
    pub fn chain(&self) -> JointChain {
        let [upper, lower] = self.bounds;

        JointChain::new()
            .add_joint(
                Joint::new("upper")
                    .set_bounds(upper[0].to_radians(), upper[1].to_radians())
                    .set_radius(self.radii[0]),
            )
            .add_joint(
                Joint::new("lower")
                    .set_bounds(lower[0].to_radians(), lower[1].to_radians())
                    .set_radius(self.radii[1]),
            )
    }

    /// Forward kinematics of the leg.
    pub fn kinematics(&self) -> ParallelLeg {
        ParallelLeg::new(self.radii[0], self.radii[1]).set_offset(self.offset[0], self.offset[1])
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.radii.iter().any(|radius| *radius == 0.0 || !radius.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "leg radii must be finite and non-zero, got {:?}",
                self.radii
            )));
        }
        if self.offset.iter().any(|value| !value.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "leg offset must be finite, got {:?}",
                self.offset
            )));
        }
        for [lower, upper] in self.bounds {
            if !lower.is_finite() || !upper.is_finite() || lower > upper {
                return Err(ConfigError::Invalid(format!(
                    "leg bounds [{}, {}] are not an angle range",
                    lower, upper
                )));
            }
        }

        Ok(())
    }
}

/// Solver configuration.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SolverConfig {
    /// Required distance between effector and target.
    pub tolerance: f32,
    /// Interpolation step along the path to the target.
    pub lerp_step: f32,
    /// Maximum number of forward kinematic evaluations.
    pub effort_ceiling: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1.0,
            lerp_step: LERP_STEP,
            effort_ceiling: EFFORT_CEILING,
        }
    }
}

impl SolverConfig {
    pub fn solver(&self) -> IterativeSolver {
        IterativeSolver::new(self.tolerance)
            .set_lerp_step(self.lerp_step)
            .set_effort_ceiling(self.effort_ceiling)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.lerp_step.is_nan() || self.lerp_step <= 0.0 || self.lerp_step > 1.0 {
            return Err(ConfigError::Invalid(format!(
                "lerp step must lie in (0, 1], got {}",
                self.lerp_step
            )));
        }
        if self.effort_ceiling == 0 {
            return Err(ConfigError::Invalid("effort ceiling must be non-zero".to_string()));
        }

        Ok(())
    }
}
