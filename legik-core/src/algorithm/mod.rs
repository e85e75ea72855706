// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

mod fk;
mod ik;

pub use fk::{ForwardKinematics, ParallelLeg};
pub use ik::{IterativeSolver, SolveError, EFFORT_CEILING, FAILURE, LERP_STEP};
