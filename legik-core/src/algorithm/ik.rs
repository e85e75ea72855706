// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

use nalgebra::Point2;

use super::fk::ForwardKinematics;
use crate::chain::JointChain;
use crate::math::{clamp_angle, distance, lerp_point};

/// Interpolation step along the path from the start position to the target.
pub const LERP_STEP: f32 = 0.001;
/// Maximum number of forward kinematic evaluations per solve.
pub const EFFORT_CEILING: usize = 5_000;

/// Returned by [`IterativeSolver::solve_raw`] when the solve failed.
pub const FAILURE: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveError {
    /// Target not reached within the effort ceiling.
    BudgetExhausted { effort: usize },
    /// Chain and angle buffer cannot be solved.
    InvalidChain(&'static str),
}

impl std::fmt::Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolveError::BudgetExhausted { effort } => {
                write!(f, "target not reached within {} evaluations", effort)
            }
            SolveError::InvalidChain(reason) => write!(f, "invalid chain: {}", reason),
        }
    }
}

impl std::error::Error for SolveError {}

/// Outcome of probing a single joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    /// The joint moved and the effector is strictly closer.
    Improved,
    /// Neither direction improved, the joint is restored.
    Exhausted,
}

/// Counts forward kinematic evaluations against the ceiling.
struct Effort<'a, K: ForwardKinematics + ?Sized> {
    kinematics: &'a K,
    count: usize,
    ceiling: usize,
}

impl<'a, K: ForwardKinematics + ?Sized> Effort<'a, K> {
    fn new(kinematics: &'a K, ceiling: usize) -> Self {
        Self {
            kinematics,
            count: 0,
            ceiling,
        }
    }

    fn distance(&mut self, angles: &[f32], point: &Point2<f32>) -> Result<f32, SolveError> {
        let position = self.kinematics.solve(angles);
        self.count += 1;

        if self.count >= self.ceiling {
            return Err(SolveError::BudgetExhausted { effort: self.count });
        }

        Ok(distance(&position, point))
    }
}

/// Derivative free inverse kinematics solver.
///
/// The solver walks the end effector from the zero pose towards the target
/// along a straight line. The line is divided into small steps and each step
/// is reached by nudging one joint at a time, keeping a move only when it
/// brings the effector closer. When neither direction improves, the next
/// joint in the chain is tried.
///
/// Only forward kinematics are required. The per joint step is the positional
/// error divided by the joint radius, which is a heuristic and not the exact
/// Jacobian.
#[derive(Clone, Debug, PartialEq)]
pub struct IterativeSolver {
    tolerance: f32,
    lerp_step: f32,
    effort_ceiling: usize,
}

impl IterativeSolver {
    /// Construct a solver with the required positional tolerance.
    pub fn new(tolerance: f32) -> Self {
        Self {
            tolerance,
            lerp_step: LERP_STEP,
            effort_ceiling: EFFORT_CEILING,
        }
    }

    pub fn set_lerp_step(mut self, lerp_step: f32) -> Self {
        self.lerp_step = lerp_step;
        self
    }

    pub fn set_effort_ceiling(mut self, effort_ceiling: usize) -> Self {
        self.effort_ceiling = effort_ceiling;
        self
    }

    #[inline]
    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    #[inline]
    pub fn effort_ceiling(&self) -> usize {
        self.effort_ceiling
    }

    /// Number of intermediate targets between the start and the final target.
    #[inline]
    pub fn sub_target_count(&self) -> usize {
        ((1.0 / self.lerp_step).round() as usize).max(1)
    }

    /// Solve the joint angles for the target.
    ///
    /// The angles are always reset to zero before solving. On success the
    /// number of forward kinematic evaluations is returned. On failure the
    /// angles are left as they were when the solver gave up, but always
    /// within the joint bounds.
    pub fn solve<K: ForwardKinematics + ?Sized>(
        &self,
        chain: &JointChain,
        angles: &mut [f32],
        kinematics: &K,
        target: &Point2<f32>,
    ) -> Result<usize, SolveError> {
        chain.validate(angles.len()).map_err(SolveError::InvalidChain)?;

        // TODO: Seed from the caller's pose once the lookup tables are regenerated.
        angles.iter_mut().for_each(|angle| *angle = 0.0);

        let start = kinematics.solve(angles);
        let steps = self.sub_target_count();

        let mut effort = Effort::new(kinematics, self.effort_ceiling);
        let mut joint = 0;

        for k in 1..=steps {
            let sub_target = lerp_point(&start, target, k as f32 / steps as f32);

            // Every pass probes a joint, the exit test uses the error from
            // before the probe.
            loop {
                let error = effort.distance(angles, &sub_target)?;

                if probe_joint(chain, angles, joint, error, &sub_target, &mut effort)?
                    == Probe::Exhausted
                {
                    joint = (joint + 1) % chain.len();
                }

                if error <= self.tolerance {
                    break;
                }
            }
        }

        log::trace!(
            "Solved ({:.2}, {:.2}) in {} evaluations",
            target.x,
            target.y,
            effort.count
        );

        Ok(effort.count)
    }

    /// Solve the joint angles and return the effort count, or [`FAILURE`].
    pub fn solve_raw<K: ForwardKinematics + ?Sized>(
        &self,
        chain: &JointChain,
        angles: &mut [f32],
        kinematics: &K,
        target: &Point2<f32>,
    ) -> i32 {
        match self.solve(chain, angles, kinematics, target) {
            Ok(effort) => i32::try_from(effort).unwrap_or(FAILURE),
            Err(e) => {
                log::trace!("Solve failed: {}", e);
                FAILURE
            }
        }
    }
}

/// Try to move a single joint closer to the point.
///
/// The joint is moved by `error / radius` in the positive direction first,
/// then in the negative direction. Both moves are clamped to the joint bounds.
fn probe_joint<K: ForwardKinematics + ?Sized>(
    chain: &JointChain,
    angles: &mut [f32],
    index: usize,
    error: f32,
    point: &Point2<f32>,
    effort: &mut Effort<'_, K>,
) -> Result<Probe, SolveError> {
    let Some(joint) = chain.joint(index) else {
        return Err(SolveError::InvalidChain("joint index out of range"));
    };

    let d_theta = error / joint.radius();
    let prev_angle = angles[index];

    angles[index] = clamp_angle(prev_angle + d_theta, joint.bounds());
    if effort.distance(angles, point)? < error {
        return Ok(Probe::Improved);
    }

    angles[index] = clamp_angle(prev_angle - d_theta, joint.bounds());
    if effort.distance(angles, point)? < error {
        return Ok(Probe::Improved);
    }

    angles[index] = prev_angle;

    Ok(Probe::Exhausted)
}
