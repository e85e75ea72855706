// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

use nalgebra::{Point2, Rotation2, Vector2};

/// Linear interpolation between two points.
///
/// Returns `a * (1 - t) + b * t`, so `t = 0` yields `a` and `t = 1` yields `b`.
#[inline]
pub fn lerp_point(a: &Point2<f32>, b: &Point2<f32>, t: f32) -> Point2<f32> {
    Point2::from(a.coords.lerp(&b.coords, t))
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: &Point2<f32>, b: &Point2<f32>) -> f32 {
    (a - b).magnitude()
}

/// Rotate a vector counter-clockwise by an angle in radians.
#[inline]
pub fn rotate(v: &Vector2<f32>, angle: f32) -> Vector2<f32> {
    Rotation2::new(angle) * v
}

/// Clamp an angle to the inclusive bounds `(lower, upper)`.
#[inline]
pub fn clamp_angle(angle: f32, bounds: (f32, f32)) -> f32 {
    let (lower, upper) = bounds;

    if angle > upper {
        upper
    } else if angle < lower {
        lower
    } else {
        angle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_lerp_point() {
        let a = Point2::new(27.253, -54.96);
        let b = Point2::new(10.0, -40.0);

        assert_eq!(lerp_point(&a, &b, 0.0), a);
        assert!(distance(&lerp_point(&a, &b, 1.0), &b) < EPSILON);

        let mid = lerp_point(&a, &b, 0.5);
        assert!((distance(&a, &mid) - distance(&mid, &b)).abs() < EPSILON);
    }

    #[test]
    fn test_vector_algebra() {
        let a = Vector2::new(3.0_f32, 4.0);
        let b = Vector2::new(-4.0_f32, 3.0);

        assert_eq!(a.magnitude(), 5.0);
        assert_eq!(a.dot(&b), 0.0);
        assert_eq!(a + b, Vector2::new(-1.0, 7.0));
        assert_eq!(a * 2.0, Vector2::new(6.0, 8.0));
        assert_eq!(Point2::new(1.0_f32, 1.0) - Point2::new(4.0, 5.0), -a);
    }

    #[test]
    fn test_rotate() {
        let v = rotate(&Vector2::new(1.0, 0.0), std::f32::consts::FRAC_PI_2);

        assert!(v.x.abs() < EPSILON);
        assert!((v.y - 1.0).abs() < EPSILON);
        assert!((rotate(&Vector2::new(3.0, 4.0), 1.234).magnitude() - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_clamp_angle() {
        let bounds = (-60_f32.to_radians(), 25_f32.to_radians());

        assert_eq!(clamp_angle(0.0, bounds), 0.0);
        assert_eq!(clamp_angle(1.0, bounds), bounds.1);
        assert_eq!(clamp_angle(-2.0, bounds), bounds.0);
        assert_eq!(clamp_angle(bounds.1, bounds), bounds.1);
    }
}
