// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

use std::path::PathBuf;

use legik_core::config::{ConfigError, LegConfig, SolverConfig};
use legik_core::lut::{Grid, FAILURE_ANGLE};

#[derive(Clone, Debug, serde_derive::Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory to write the generated files to.
    pub directory: PathBuf,
    /// Base name of the C header and source.
    pub name: String,
    /// Name of the table symbol.
    pub table: String,
    /// Angle written for unreachable cells, in radians.
    pub failure_angle: f32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            name: "LegLUT".to_string(),
            table: "legPosLUT".to_string(),
            failure_angle: FAILURE_ANGLE,
        }
    }
}

impl OutputConfig {
    #[inline]
    pub fn header_path(&self) -> PathBuf {
        self.directory.join(format!("{}.h", self.name))
    }

    #[inline]
    pub fn source_path(&self) -> PathBuf {
        self.directory.join(format!("{}.c", self.name))
    }

    #[inline]
    pub fn graph_path(&self) -> PathBuf {
        self.directory.join("graph.txt")
    }
}

#[derive(Clone, Debug, Default, serde_derive::Deserialize, PartialEq)]
#[serde(default)]
pub struct DumpConfig {
    /// Leg linkage.
    pub leg: LegConfig,
    /// Solver parameters.
    pub solver: SolverConfig,
    /// Grid of effector positions.
    pub grid: Grid,
    /// Generated files.
    pub output: OutputConfig,
}

impl DumpConfig {
    /// Check every section before any cell is solved.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.leg.validate()?;
        self.solver.validate()?;
        self.grid.validate()?;

        if self.output.name.is_empty() || self.output.table.is_empty() {
            return Err(ConfigError::Invalid("output names must not be empty".to_string()));
        }
        if !self.output.failure_angle.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "failure angle must be finite, got {}",
                self.output.failure_angle
            )));
        }

        Ok(())
    }
}
