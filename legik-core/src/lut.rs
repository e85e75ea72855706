// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

//! Joint angle lookup tables.
//!
//! A lookup table holds the solved joint angles for every point of a regular
//! grid of effector positions. Tables are exported as a C header and source
//! pair holding `int16_t` degrees, together with a plain text map of the
//! reachable cells.

use std::io::Write;

use nalgebra::Point2;
use serde::Deserialize;

use crate::algorithm::{ForwardKinematics, IterativeSolver};
use crate::chain::JointChain;
use crate::config::ConfigError;

/// Angle stored for cells which could not be solved, in radians.
pub const FAILURE_ANGLE: f32 = 2.215;

/// Largest number of cells accepted in a grid.
pub const MAX_CELLS: usize = 1 << 24;

/// Grid axis description.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Axis {
    /// First value on the axis.
    pub lower: f32,
    /// Upper bound, the last value lies below this bound.
    pub upper: f32,
    /// Distance between two values.
    pub step: f32,
}

impl Axis {
    pub fn new(lower: f32, upper: f32, step: f32) -> Self {
        Self { lower, upper, step }
    }

    /// Number of values on the axis.
    #[inline]
    pub fn steps(&self) -> usize {
        ((self.upper - self.lower) / self.step).abs() as usize
    }

    /// Value at the index.
    #[inline]
    pub fn value(&self, index: usize) -> f32 {
        self.lower + (index as f32 * self.step)
    }

    /// Check the axis describes a finite ascending range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "axis step must be positive, got {}",
                self.step
            )));
        }
        if !self.lower.is_finite() || !self.upper.is_finite() || self.lower > self.upper {
            return Err(ConfigError::Invalid(format!(
                "axis [{}, {}) is not an ascending range",
                self.lower, self.upper
            )));
        }

        Ok(())
    }
}

/// Regular 2D grid of effector positions.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Grid {
    pub x: Axis,
    pub y: Axis,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            x: Axis::new(-15.0, 55.0, 2.0),
            y: Axis::new(-85.0, -25.0, 2.0),
        }
    }
}

impl Grid {
    pub fn new(x: Axis, y: Axis) -> Self {
        Self { x, y }
    }

    /// Total number of grid cells, `None` on overflow.
    #[inline]
    pub fn checked_len(&self) -> Option<usize> {
        self.x.steps().checked_mul(self.y.steps())
    }

    /// Total number of grid cells, saturating on overflow.
    #[inline]
    pub fn len(&self) -> usize {
        self.checked_len().unwrap_or(usize::MAX)
    }

    /// Check both axes and the total number of cells.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.x.validate()?;
        self.y.validate()?;

        match self.checked_len() {
            Some(0) => Err(ConfigError::Invalid("grid has no cells".to_string())),
            Some(len) if len <= MAX_CELLS => Ok(()),
            _ => Err(ConfigError::Invalid(format!("grid exceeds {} cells", MAX_CELLS))),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Effector position of the cell.
    #[inline]
    pub fn point(&self, x_index: usize, y_index: usize) -> Point2<f32> {
        Point2::new(self.x.value(x_index), self.y.value(y_index))
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "X [{:.1}, {:.1}) step {:.1} ({}), Y [{:.1}, {:.1}) step {:.1} ({})",
            self.x.lower,
            self.x.upper,
            self.x.step,
            self.x.steps(),
            self.y.lower,
            self.y.upper,
            self.y.step,
            self.y.steps()
        )
    }
}

/// Solve result of a single grid cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    /// Joint angles in radians.
    Solved(Vec<f32>),
    /// Target not reached.
    Unreachable,
}

impl Cell {
    #[inline]
    pub fn is_solved(&self) -> bool {
        matches!(self, Cell::Solved(_))
    }
}

/// Convert an angle in radians to whole degrees, truncated towards zero.
#[inline]
pub fn to_fixed_degrees(angle: f32) -> i16 {
    angle.to_degrees() as i16
}

/// Include guard for a header name.
///
/// Camel case is split on word boundaries, `LegLUT` becomes `_LEG_LUT_H_`.
pub fn include_guard(name: &str) -> String {
    let mut guard = String::from("_");
    let mut prev_lower = false;

    for c in name.chars() {
        if !c.is_ascii_alphanumeric() {
            guard.push('_');
            prev_lower = false;
            continue;
        }

        if c.is_ascii_uppercase() && prev_lower {
            guard.push('_');
        }

        prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        guard.push(c.to_ascii_uppercase());
    }

    guard.push_str("_H_");
    guard
}

/// Solve every cell in a single grid row.
///
/// Each cell is solved from the zero pose with a row local angle buffer, so
/// rows can be solved independently and in any order.
pub fn sweep_row<K: ForwardKinematics + ?Sized>(
    grid: &Grid,
    y_index: usize,
    solver: &IterativeSolver,
    chain: &JointChain,
    kinematics: &K,
) -> Vec<Cell> {
    let mut angles = vec![0.0; chain.len()];

    (0..grid.x.steps())
        .map(|x_index| {
            let target = grid.point(x_index, y_index);

            match solver.solve(chain, &mut angles, kinematics, &target) {
                Ok(effort) => {
                    log::debug!(
                        "Cell ({:.1}, {:.1}) solved in {} evaluations",
                        target.x,
                        target.y,
                        effort
                    );
                    Cell::Solved(angles.clone())
                }
                Err(e) => {
                    log::debug!("Cell ({:.1}, {:.1}) unreachable: {}", target.x, target.y, e);
                    Cell::Unreachable
                }
            }
        })
        .collect()
}

/// Joint angles for every cell of a grid.
///
/// Cells are stored row major, rows in ascending Y.
#[derive(Clone, Debug, PartialEq)]
pub struct LookupTable {
    grid: Grid,
    joint_count: usize,
    cells: Vec<Cell>,
    failure_angle: f32,
}

impl LookupTable {
    /// Construct an empty table where every cell is unreachable.
    pub fn new(grid: Grid, joint_count: usize) -> Self {
        Self {
            grid,
            joint_count,
            cells: vec![Cell::Unreachable; grid.len()],
            failure_angle: FAILURE_ANGLE,
        }
    }

    /// Solve the entire grid row by row.
    pub fn sweep<K: ForwardKinematics + ?Sized>(
        grid: Grid,
        solver: &IterativeSolver,
        chain: &JointChain,
        kinematics: &K,
    ) -> Self {
        let mut table = Self::new(grid, chain.len());

        for y_index in 0..grid.y.steps() {
            let row = sweep_row(&grid, y_index, solver, chain, kinematics);
            table.set_row(y_index, row);
        }

        table
    }

    /// Set the angle written for unreachable cells, in radians.
    pub fn set_failure_angle(mut self, failure_angle: f32) -> Self {
        self.failure_angle = failure_angle;
        self
    }

    /// Replace a row of cells.
    ///
    /// Cells beyond the row width are ignored.
    pub fn set_row(&mut self, y_index: usize, row: Vec<Cell>) {
        let width = self.grid.x.steps();
        if y_index >= self.grid.y.steps() {
            return;
        }

        let offset = y_index * width;
        for (x_index, cell) in row.into_iter().take(width).enumerate() {
            self.cells[offset + x_index] = cell;
        }
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn joint_count(&self) -> usize {
        self.joint_count
    }

    #[inline]
    pub fn cell(&self, x_index: usize, y_index: usize) -> Option<&Cell> {
        if x_index >= self.grid.x.steps() {
            return None;
        }

        self.cells.get(y_index * self.grid.x.steps() + x_index)
    }

    /// Number of solved cells.
    pub fn solved_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_solved()).count()
    }

    /// Fixed point angles of the cell.
    ///
    /// Unreachable cells hold the failure angle for every joint.
    pub fn fixed_cell(&self, x_index: usize, y_index: usize) -> Vec<i16> {
        match self.cell(x_index, y_index) {
            Some(Cell::Solved(angles)) => angles.iter().map(|a| to_fixed_degrees(*a)).collect(),
            _ => vec![to_fixed_degrees(self.failure_angle); self.joint_count],
        }
    }

    fn dimensions(&self) -> String {
        format!(
            "[{}][{}][{}]",
            self.grid.y.steps(),
            self.grid.x.steps(),
            self.joint_count
        )
    }

    /// Write the C header declaring the table.
    pub fn write_header<W: Write>(
        &self,
        writer: &mut W,
        name: &str,
        table: &str,
    ) -> std::io::Result<()> {
        let guard = include_guard(name);

        writeln!(writer, "#ifndef {}", guard)?;
        writeln!(writer, "#define {}", guard)?;
        writeln!(writer, "#include <stdint.h>")?;
        writeln!(writer, "extern const int16_t {} {};", table, self.dimensions())?;
        writeln!(writer, "#endif")?;

        Ok(())
    }

    /// Write the C source defining the table.
    pub fn write_source<W: Write>(
        &self,
        writer: &mut W,
        name: &str,
        table: &str,
    ) -> std::io::Result<()> {
        let width = self.grid.x.steps();
        let height = self.grid.y.steps();

        writeln!(writer, "#include \"{}.h\"", name)?;
        writeln!(writer, "const int16_t {} {} = {{", table, self.dimensions())?;

        for y_index in 0..height {
            let row: Vec<String> = (0..width)
                .map(|x_index| {
                    let angles: Vec<String> = self
                        .fixed_cell(x_index, y_index)
                        .iter()
                        .map(|angle| angle.to_string())
                        .collect();

                    format!("{{{}}}", angles.join(", "))
                })
                .collect();

            write!(writer, "{{{}}}", row.join(", "))?;
            if y_index != height - 1 {
                write!(writer, ", ")?;
            }
            writeln!(writer)?;
        }

        writeln!(writer, "}};")?;

        Ok(())
    }

    /// Write the reachability map.
    ///
    /// The top line is the highest row. Solved cells are drawn as `XX`.
    pub fn write_graph<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y_index in (0..self.grid.y.steps()).rev() {
            for x_index in 0..self.grid.x.steps() {
                match self.cell(x_index, y_index) {
                    Some(Cell::Solved(_)) => write!(writer, "XX")?,
                    _ => write!(writer, "  ")?,
                }
            }
            writeln!(writer)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::ParallelLeg;
    use crate::chain::Joint;

    fn small_table() -> LookupTable {
        let grid = Grid::new(Axis::new(0.0, 3.0, 1.0), Axis::new(0.0, 2.0, 1.0));

        let mut table = LookupTable::new(grid, 2);
        table.set_row(
            0,
            vec![
                Cell::Solved(vec![0.0, 0.5]),
                Cell::Unreachable,
                Cell::Solved(vec![-0.2, 0.1]),
            ],
        );
        table.set_row(1, vec![Cell::Unreachable, Cell::Solved(vec![0.3, -0.3])]);
        table
    }

    #[test]
    fn test_axis_steps() {
        assert_eq!(Axis::new(-15.0, 55.0, 2.0).steps(), 35);
        assert_eq!(Axis::new(-85.0, -25.0, 2.0).steps(), 30);
        assert_eq!(Axis::new(0.0, 5.0, 2.0).steps(), 2);
        assert_eq!(Axis::new(-85.0, -25.0, 2.0).value(3), -79.0);
    }

    #[test]
    fn test_axis_validate() {
        assert!(Axis::new(-15.0, 55.0, 2.0).validate().is_ok());

        for axis in [
            Axis::new(0.0, 10.0, 0.0),
            Axis::new(0.0, 10.0, -1.0),
            Axis::new(0.0, 10.0, f32::NAN),
            Axis::new(0.0, 10.0, f32::INFINITY),
            Axis::new(10.0, 0.0, 1.0),
            Axis::new(f32::NEG_INFINITY, 0.0, 1.0),
        ] {
            assert!(
                matches!(axis.validate(), Err(ConfigError::Invalid(_))),
                "{:?}",
                axis
            );
        }
    }

    #[test]
    fn test_grid_validate() {
        assert!(Grid::default().validate().is_ok());

        let grid: Grid = crate::config::from_str(
            r#"
            x = { lower = 0.0, upper = 10.0, step = 0.0 }
            y = { lower = 0.0, upper = 10.0, step = 1.0 }
            "#,
        )
        .unwrap();
        assert!(matches!(grid.validate(), Err(ConfigError::Invalid(_))));
        assert_eq!(grid.checked_len(), None);
        assert_eq!(grid.len(), usize::MAX);

        let empty = Grid::new(Axis::new(0.0, 0.5, 1.0), Axis::new(0.0, 10.0, 1.0));
        assert!(empty.is_empty());
        assert!(matches!(empty.validate(), Err(ConfigError::Invalid(_))));

        let huge = Grid::new(Axis::new(0.0, 1.0e6, 0.01), Axis::new(0.0, 1.0e3, 1.0));
        assert!(matches!(huge.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_grid() {
        let grid = Grid::default();

        assert_eq!(grid.len(), 35 * 30);
        assert_eq!(grid.point(0, 0), Point2::new(-15.0, -85.0));
        assert_eq!(grid.point(34, 29), Point2::new(53.0, -27.0));
    }

    #[test]
    fn test_to_fixed_degrees() {
        assert_eq!(to_fixed_degrees(FAILURE_ANGLE), 126);
        assert_eq!(to_fixed_degrees(0.5), 28);
        assert_eq!(to_fixed_degrees(-0.5), -28);
        assert_eq!(to_fixed_degrees(0.0), 0);
    }

    #[test]
    fn test_include_guard() {
        assert_eq!(include_guard("LegLUT"), "_LEG_LUT_H_");
        assert_eq!(include_guard("leg_table2"), "_LEG_TABLE2_H_");
    }

    #[test]
    fn test_cells() {
        let table = small_table();

        assert_eq!(table.solved_count(), 3);
        assert_eq!(table.fixed_cell(0, 0), vec![0, 28]);
        assert_eq!(table.fixed_cell(1, 0), vec![126, 126]);
        assert_eq!(table.fixed_cell(2, 1), vec![126, 126]);
        assert!(table.cell(3, 0).is_none());
        assert!(table.cell(0, 2).is_none());
    }

    #[test]
    fn test_failure_angle() {
        let table = small_table().set_failure_angle(0.0);

        assert_eq!(table.fixed_cell(1, 0), vec![0, 0]);
    }

    #[test]
    fn test_write_header() {
        let mut buffer = Vec::new();
        small_table()
            .write_header(&mut buffer, "LegLUT", "legPosLUT")
            .unwrap();

        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "#ifndef _LEG_LUT_H_\n\
             #define _LEG_LUT_H_\n\
             #include <stdint.h>\n\
             extern const int16_t legPosLUT [2][3][2];\n\
             #endif\n"
        );
    }

    #[test]
    fn test_write_source() {
        let mut buffer = Vec::new();
        small_table()
            .write_source(&mut buffer, "LegLUT", "legPosLUT")
            .unwrap();

        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "#include \"LegLUT.h\"\n\
             const int16_t legPosLUT [2][3][2] = {\n\
             {{0, 28}, {126, 126}, {-11, 5}}, \n\
             {{126, 126}, {17, -17}, {126, 126}}\n\
             };\n"
        );
    }

    #[test]
    fn test_write_graph() {
        let mut buffer = Vec::new();
        small_table().write_graph(&mut buffer).unwrap();

        assert_eq!(String::from_utf8(buffer).unwrap(), "  XX  \nXX  XX\n");
    }

    #[test]
    fn test_sweep() {
        let chain = JointChain::new()
            .add_joint(
                Joint::new("upper")
                    .set_bounds(-60_f32.to_radians(), 25_f32.to_radians())
                    .set_radius(30.0),
            )
            .add_joint(
                Joint::new("lower")
                    .set_bounds(-55_f32.to_radians(), 55_f32.to_radians())
                    .set_radius(30.0),
            );
        let leg = ParallelLeg::new(30.0, 30.0).set_offset(-2.747, -24.96);
        let solver = IterativeSolver::new(1.0);

        // One reachable cell next to one far outside the workspace.
        let grid = Grid::new(Axis::new(10.0, 10_010.0, 5_000.0), Axis::new(-40.0, -39.0, 1.0));
        let table = LookupTable::sweep(grid, &solver, &chain, &leg);

        assert_eq!(table.solved_count(), 1);

        let Some(Cell::Solved(angles)) = table.cell(0, 0) else {
            panic!("reachable cell not solved");
        };
        assert!(chain.is_within_bounds(angles));
        assert_eq!(table.cell(1, 0), Some(&Cell::Unreachable));
    }
}
