// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

use nalgebra::{Point2, Vector2};

use crate::math::rotate;

/// Forward kinematics of a planar chain.
///
/// Maps the full joint angle array to the end effector position. Implementors
/// must be deterministic and free of side effects.
pub trait ForwardKinematics {
    fn solve(&self, angles: &[f32]) -> Point2<f32>;
}

impl<F> ForwardKinematics for F
where
    F: Fn(&[f32]) -> Point2<f32>,
{
    #[inline]
    fn solve(&self, angles: &[f32]) -> Point2<f32> {
        self(angles)
    }
}

/// Two joint parallel leg linkage.
///
/// The upper link rotates about the hip, the lower link is driven through a
/// parallelogram so its angle is measured against the vertical:
///
/// ```text
/// x = l1 * cos(theta_1) + l2 * sin(theta_2) + offset.x
/// y = l1 * sin(theta_1) - l2 * cos(theta_2) + offset.y
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ParallelLeg {
    l1: f32,
    l2: f32,
    offset: Point2<f32>,
}

impl ParallelLeg {
    pub fn new(l1: f32, l2: f32) -> Self {
        Self {
            l1,
            l2,
            offset: Point2::origin(),
        }
    }

    pub fn set_offset(mut self, x: f32, y: f32) -> Self {
        self.offset = Point2::new(x, y);
        self
    }

    #[inline]
    pub fn lengths(&self) -> (f32, f32) {
        (self.l1, self.l2)
    }
}

impl ForwardKinematics for ParallelLeg {
    fn solve(&self, angles: &[f32]) -> Point2<f32> {
        let theta_1 = angles.first().copied().unwrap_or_default();
        let theta_2 = angles.get(1).copied().unwrap_or_default();

        let upper = rotate(&Vector2::new(self.l1, 0.0), theta_1);
        let lower = rotate(&Vector2::new(0.0, -self.l2), theta_2);

        self.offset + (upper + lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_parallel_leg_zero_pose() {
        let leg = ParallelLeg::new(30.0, 30.0).set_offset(-2.747, -24.96);

        let point = leg.solve(&[0.0, 0.0]);
        assert!((point.x - 27.253).abs() < EPSILON);
        assert!((point.y + 54.96).abs() < EPSILON);
    }

    #[test]
    fn test_parallel_leg_quarter_turn() {
        let leg = ParallelLeg::new(30.0, 20.0);

        let point = leg.solve(&[std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2]);
        assert!((point.x - 20.0).abs() < EPSILON);
        assert!((point.y - 30.0).abs() < EPSILON);
    }

    #[test]
    fn test_parallel_leg_closed_form() {
        let leg = ParallelLeg::new(30.0, 25.0).set_offset(1.5, -2.0);
        let (l1, l2) = leg.lengths();
        assert_eq!((l1, l2), (30.0, 25.0));

        for (theta_1, theta_2) in [(0.3_f32, -0.4_f32), (-1.0, 0.9), (0.4, 0.0)] {
            let point = leg.solve(&[theta_1, theta_2]);

            let x = l1 * theta_1.cos() + l2 * theta_2.sin() + 1.5;
            let y = l1 * theta_1.sin() - l2 * theta_2.cos() - 2.0;
            assert!((point.x - x).abs() < EPSILON);
            assert!((point.y - y).abs() < EPSILON);
        }
    }

    #[test]
    fn test_closure_kinematics() {
        let fk = |angles: &[f32]| Point2::new(10.0 * angles[0].cos(), 10.0 * angles[0].sin());

        let point = ForwardKinematics::solve(&fk, &[0.0]);
        assert_eq!(point, Point2::new(10.0, 0.0));
    }
}
