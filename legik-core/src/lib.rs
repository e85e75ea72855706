// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

//! Derivative free inverse kinematics for planar leg linkages.
//!
//! The [`algorithm::IterativeSolver`] finds joint angles for a target position
//! using nothing but a forward kinematics function. The [`lut`] module runs
//! the solver over a grid of positions and exports the result as a lookup
//! table for embedded firmware.

pub mod algorithm;
pub mod chain;
pub mod config;
pub mod lut;
pub mod math;

pub use nalgebra;

pub use self::chain::{Joint, JointChain};
pub use self::config::{from_file, ConfigError};
